//! Text-backed status enums.
//!
//! Statuses are persisted as `VARCHAR` values (e.g. `'under_review'`), so
//! each enum maps one-to-one onto the stored string. Handlers validate
//! incoming values with `parse` and repositories bind `as_str`.

macro_rules! define_text_status {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The value stored in the database column.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Parse a stored value. Unknown values return `None`.
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_status! {
    /// Lifecycle of a customer's custom-order request.
    RequestStatus {
        Submitted => "submitted",
        UnderReview => "under_review",
        Quoted => "quoted",
        AwaitingPayment => "awaiting_payment",
        Paid => "paid",
        InProduction => "in_production",
        Completed => "completed",
        Cancelled => "cancelled",
        Rejected => "rejected",
    }
}

define_text_status! {
    /// Lifecycle of a single quote version.
    QuoteStatus {
        Sent => "sent",
        Accepted => "accepted",
        Rejected => "rejected",
        Expired => "expired",
        Paid => "paid",
    }
}

define_text_status! {
    /// Fulfillment stage of a paid order. Independent of the order's own status.
    DeliveryStatus {
        Production => "production",
        Sorting => "sorting",
        Dispatch => "dispatch",
        Paused => "paused",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

define_text_status! {
    /// Origin of an order row.
    OrderType {
        Catalog => "catalog",
        Custom => "custom",
    }
}

impl RequestStatus {
    /// Fallback used when a stored value is not recognised.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or(RequestStatus::Submitted)
    }
}

impl QuoteStatus {
    /// Statuses in which a quote can still be paid, reminded or expired.
    pub const ACTIVE: [QuoteStatus; 2] = [QuoteStatus::Sent, QuoteStatus::Accepted];

    /// Whether this quote is still open.
    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    /// Fallback used when a stored value is not recognised.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or(QuoteStatus::Sent)
    }

    /// The request status that follows when an admin moves a quote to `self`.
    ///
    /// `sent` leaves the request untouched.
    pub fn implied_request_status(self) -> Option<RequestStatus> {
        match self {
            QuoteStatus::Accepted => Some(RequestStatus::AwaitingPayment),
            QuoteStatus::Rejected => Some(RequestStatus::UnderReview),
            QuoteStatus::Expired => Some(RequestStatus::Quoted),
            QuoteStatus::Paid => Some(RequestStatus::Paid),
            QuoteStatus::Sent => None,
        }
    }
}
