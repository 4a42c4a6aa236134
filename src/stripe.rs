//! Stripe client: payment intent creation and webhook event types.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::StripeConfig;
use crate::error::{PaymentError, Result};

/// API version pinned on every request
pub const STRIPE_API_VERSION: &str = "2024-06-20";

/// The only event kind that reconciles a payment
pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";

// ═══════════════════════════════════════════════════════════════════════════════
// PAYMENT INTENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateIntentParams {
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    pub receipt_email: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Anything that can open a payment intent on the processor side.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_intent(&self, params: &CreateIntentParams) -> Result<PaymentIntent>;
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Clone)]
pub struct StripeClient {
    http_client: Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            http_client: Client::new(),
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", self.secret_key)))
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_intent(&self, params: &CreateIntentParams) -> Result<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        let amount = params.amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", params.currency.as_str()),
            ("receipt_email", params.receipt_email.as_str()),
        ];

        let resp = self
            .http_client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Stripe-Version", STRIPE_API_VERSION)
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Processor(format!("Request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = match resp.json::<StripeErrorBody>().await {
                Ok(body) => format!(
                    "{} ({})",
                    body.error.message.unwrap_or_else(|| "no message".into()),
                    body.error.kind.unwrap_or_else(|| "unknown_error".into())
                ),
                Err(_) => "unreadable error body".to_string(),
            };
            return Err(PaymentError::Processor(format!("Stripe returned {status}: {detail}")));
        }

        resp.json::<PaymentIntent>()
            .await
            .map_err(|e| PaymentError::Processor(format!("JSON error: {e}")))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WEBHOOK EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    pub data: StripeEventData,
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Id of the object the event describes (the intent id for intent events)
    pub fn object_id(&self) -> Option<&str> {
        self.data.object.get("id").and_then(|v| v.as_str())
    }
}
