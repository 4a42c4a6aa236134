//! Order-confirmation notifications.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::EmailConfig;
use crate::error::{PaymentError, Result};

/// Sends the order confirmation for a completed purchase.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_order_confirmation(&self, email: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct EmailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
}

/// Posts a JSON message to a transactional email API.
#[derive(Clone)]
pub struct HttpEmailNotifier {
    http_client: Client,
    config: EmailConfig,
    product_name: String,
}

impl HttpEmailNotifier {
    pub fn new(config: EmailConfig, product_name: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            config,
            product_name: product_name.into(),
        }
    }

    fn message<'a>(&'a self, to: &'a str) -> EmailMessage<'a> {
        EmailMessage {
            from: &self.config.from,
            to,
            subject: format!("Your order: {}", self.product_name),
            text: format!(
                "Thanks for your purchase of {}. Your payment has been confirmed.",
                self.product_name
            ),
        }
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send_order_confirmation(&self, email: &str) -> Result<()> {
        let mut request = self
            .http_client
            .post(&self.config.api_url)
            .json(&self.message(email));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| PaymentError::Notification(format!("Request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(PaymentError::Notification(format!(
                "Email API returned {}",
                resp.status()
            )));
        }

        tracing::info!(%email, "Order confirmation sent");
        Ok(())
    }
}

/// Logs instead of sending; used when no email API is configured.
#[derive(Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_order_confirmation(&self, email: &str) -> Result<()> {
        tracing::info!(%email, "Order confirmation (email delivery not configured)");
        Ok(())
    }
}
