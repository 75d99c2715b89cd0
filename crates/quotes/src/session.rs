//! Checkout session carried in the `custom-quote-session` cookie.
//!
//! Written when checkout starts and read back on the payment callback, where
//! its ids must match the metadata the gateway echoes. The cookie value is the
//! JSON payload encoded as unpadded base64url so it needs no cookie escaping.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use footprint_core::types::DbId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSession {
    pub quote_id: DbId,
    pub request_id: DbId,
    /// Hash of the access token used to start checkout.
    pub token_hash: String,
    pub email: String,
    pub customer_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub amount: Decimal,
    pub currency_code: String,
}

impl QuoteSession {
    /// Cookie-safe encoding of the session.
    pub fn encode(&self) -> String {
        // Serializing plain strings and numbers cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a cookie value. Anything malformed yields `None`.
    pub fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> QuoteSession {
        QuoteSession {
            quote_id: 7,
            request_id: 3,
            token_hash: "ab".repeat(32),
            email: "ada@example.com".to_string(),
            customer_name: "Ada Obi".to_string(),
            phone: None,
            amount: Decimal::new(5_000_050, 2),
            currency_code: "NGN".to_string(),
        }
    }

    #[test]
    fn encoded_value_is_cookie_safe() {
        let encoded = session().encode();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(QuoteSession::decode(&encoded), Some(session()));
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let json = serde_json::to_value(session()).unwrap();
        assert!(json.get("quoteId").is_some());
        assert!(json.get("tokenHash").is_some());
        assert!(json.get("currencyCode").is_some());
    }

    #[test]
    fn garbage_does_not_decode() {
        assert_eq!(QuoteSession::decode("not base64!"), None);
        assert_eq!(QuoteSession::decode(&URL_SAFE_NO_PAD.encode(b"{}")), None);
    }
}
