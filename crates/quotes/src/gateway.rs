//! Payment gateway port and the Paystack client behind it.
//!
//! Paystack wraps every response in `{ "status": bool, "message": str, "data": ... }`.
//! A `false` envelope status is surfaced as [`GatewayError::Rejected`].

use std::time::Duration;

use async_trait::async_trait;
use footprint_core::custom_order::encode_query_component;
use serde::{Deserialize, Serialize};

/// HTTP request timeout for a single gateway call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default API base URL.
pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No secret key configured.
    #[error("Payment gateway not configured")]
    NotConfigured,

    /// The underlying HTTP request failed (network, DNS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered but refused the operation.
    #[error("Payment gateway rejected the request: {0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Input for starting a hosted checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializePayment {
    pub email: String,
    /// Amount in minor units (kobo for NGN).
    pub amount: i64,
    pub currency: String,
    pub callback_url: String,
    pub metadata: serde_json::Value,
}

/// A started checkout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentSession {
    pub authorization_url: String,
    pub reference: String,
}

/// Result of looking up a transaction by reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerifiedTransaction {
    /// `"success"` for a completed payment.
    pub status: String,
    /// Amount charged, in minor units.
    #[serde(default)]
    pub amount: Option<i64>,
    /// Metadata echoed back from [`InitializePayment::metadata`].
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl VerifiedTransaction {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, input: &InitializePayment) -> Result<PaymentSession, GatewayError>;

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError>;
}

// ---------------------------------------------------------------------------
// Paystack
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, GatewayError> {
        match (self.status, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(GatewayError::Rejected(
                self.message.unwrap_or_else(|| "no data returned".to_string()),
            )),
        }
    }
}

/// Paystack REST client.
pub struct PaystackClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: Option<String>,
}

impl PaystackClient {
    /// Build a client. A missing key is allowed; calls then fail with
    /// [`GatewayError::NotConfigured`].
    pub fn new(base_url: &str, secret_key: Option<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn secret_key(&self) -> Result<&str, GatewayError> {
        self.secret_key.as_deref().ok_or(GatewayError::NotConfigured)
    }

    fn verify_url(&self, reference: &str) -> String {
        format!(
            "{}/transaction/verify/{}",
            self.base_url,
            encode_query_component(reference)
        )
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, input: &InitializePayment) -> Result<PaymentSession, GatewayError> {
        let key = self.secret_key()?;
        let envelope: Envelope<PaymentSession> = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(key)
            .json(input)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data()
    }

    async fn verify(&self, reference: &str) -> Result<VerifiedTransaction, GatewayError> {
        let key = self.secret_key()?;
        let envelope: Envelope<VerifiedTransaction> = self
            .client
            .get(self.verify_url(reference))
            .bearer_auth(key)
            .send()
            .await?
            .json()
            .await?;
        envelope.into_data()
    }
}
