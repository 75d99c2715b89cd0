//! Estimated-arrival table for order delivery stages.
//!
//! | Stage      | Lagos  | Other states |
//! |------------|--------|--------------|
//! | production | 7 days | 7 days       |
//! | sorting    | 3 days | 5 days       |
//! | dispatch   | 1 day  | 2 days       |
//!
//! Paused, completed and cancelled orders have no estimate. Days are counted
//! from the order's creation time, not from the status change.

use chrono::Duration;

use crate::status::DeliveryStatus;
use crate::types::Timestamp;

/// State name (case-insensitive) that gets the faster delivery schedule.
const EXPRESS_STATE: &str = "lagos";

/// Days from order creation to expected arrival, or `None` when not applicable.
pub fn delivery_days(status: DeliveryStatus, shipping_state: Option<&str>) -> Option<i64> {
    let express = shipping_state
        .map(|s| s.trim().eq_ignore_ascii_case(EXPRESS_STATE))
        .unwrap_or(false);

    match status {
        DeliveryStatus::Production => Some(7),
        DeliveryStatus::Sorting => Some(if express { 3 } else { 5 }),
        DeliveryStatus::Dispatch => Some(if express { 1 } else { 2 }),
        DeliveryStatus::Paused | DeliveryStatus::Completed | DeliveryStatus::Cancelled => None,
    }
}

/// Estimated arrival for an order created at `created_at`.
pub fn estimated_arrival(
    created_at: Timestamp,
    status: DeliveryStatus,
    shipping_state: Option<&str>,
) -> Option<Timestamp> {
    delivery_days(status, shipping_state).map(|days| created_at + Duration::days(days))
}

/// Pull the `state` field out of a JSON shipping address.
pub fn shipping_state(address: &serde_json::Value) -> Option<&str> {
    address.get("state").and_then(|v| v.as_str())
}

/// Customer-facing description used in status emails.
pub fn describe(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Production => "Your order is being prepared in our production house",
        DeliveryStatus::Sorting => "Your order is being sorted and packaged for delivery",
        DeliveryStatus::Dispatch => "Your order is out for delivery",
        DeliveryStatus::Paused => "Your order processing is temporarily paused",
        DeliveryStatus::Completed => "Your order has been delivered",
        DeliveryStatus::Cancelled => "Your order has been cancelled",
    }
}

/// Rough progress percentage for tracking displays.
pub fn progress_percent(status: DeliveryStatus) -> u8 {
    match status {
        DeliveryStatus::Production => 25,
        DeliveryStatus::Sorting => 50,
        DeliveryStatus::Dispatch => 75,
        DeliveryStatus::Completed => 100,
        DeliveryStatus::Paused | DeliveryStatus::Cancelled => 0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn created() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2026, 5, 10, 9, 30, 0).unwrap()
    }

    #[test]
    fn production_is_seven_days_everywhere() {
        assert_eq!(
            estimated_arrival(created(), DeliveryStatus::Production, Some("Lagos")),
            Some(created() + Duration::days(7))
        );
        assert_eq!(
            estimated_arrival(created(), DeliveryStatus::Production, Some("Kano")),
            Some(created() + Duration::days(7))
        );
    }

    #[test]
    fn lagos_is_faster_for_sorting_and_dispatch() {
        assert_eq!(delivery_days(DeliveryStatus::Sorting, Some("LAGOS")), Some(3));
        assert_eq!(delivery_days(DeliveryStatus::Sorting, Some("Abuja")), Some(5));
        assert_eq!(delivery_days(DeliveryStatus::Dispatch, Some(" lagos ")), Some(1));
        assert_eq!(delivery_days(DeliveryStatus::Dispatch, None), Some(2));
    }

    #[test]
    fn terminal_and_paused_have_no_estimate() {
        for status in [
            DeliveryStatus::Paused,
            DeliveryStatus::Completed,
            DeliveryStatus::Cancelled,
        ] {
            assert_eq!(estimated_arrival(created(), status, Some("Lagos")), None);
        }
    }

    #[test]
    fn state_is_read_from_address_json() {
        let address = json!({ "city": "Ikeja", "state": "Lagos" });
        assert_eq!(shipping_state(&address), Some("Lagos"));
        assert_eq!(shipping_state(&json!({})), None);
    }

    #[test]
    fn progress_increases_through_stages() {
        assert!(progress_percent(DeliveryStatus::Production) < progress_percent(DeliveryStatus::Sorting));
        assert!(progress_percent(DeliveryStatus::Sorting) < progress_percent(DeliveryStatus::Dispatch));
        assert_eq!(progress_percent(DeliveryStatus::Completed), 100);
    }
}
