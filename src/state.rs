//! Application State

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::notifier::{HttpEmailNotifier, LogNotifier, Notifier};
use crate::redis_store::RedisPaymentStore;
use crate::signature::WebhookVerifier;
use crate::store::{MemoryPaymentStore, PaymentStore};
use crate::stripe::{PaymentProcessor, StripeClient};

/// Collaborators shared by every request. Each is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<dyn PaymentProcessor>,
    pub store: Arc<dyn PaymentStore>,
    pub notifier: Arc<dyn Notifier>,
    pub verifier: Arc<WebhookVerifier>,
}

impl AppState {
    pub fn new(
        processor: Arc<dyn PaymentProcessor>,
        store: Arc<dyn PaymentStore>,
        notifier: Arc<dyn Notifier>,
        verifier: WebhookVerifier,
    ) -> Self {
        Self {
            processor,
            store,
            notifier,
            verifier: Arc::new(verifier),
        }
    }

    /// Production wiring: Stripe, Redis when configured, email API when configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let processor: Arc<dyn PaymentProcessor> = Arc::new(StripeClient::new(&config.stripe));

        let store: Arc<dyn PaymentStore> = match &config.redis_url {
            Some(url) => {
                tracing::info!("Using Redis payment store");
                Arc::new(RedisPaymentStore::open(url)?)
            }
            None => {
                tracing::warn!("REDIS_URL not set - payment records are kept in memory");
                Arc::new(MemoryPaymentStore::new())
            }
        };

        let notifier: Arc<dyn Notifier> = match &config.email {
            Some(email) => Arc::new(HttpEmailNotifier::new(email.clone(), &config.product_name)),
            None => {
                tracing::warn!("EMAIL_API_URL not set - confirmations are only logged");
                Arc::new(LogNotifier)
            }
        };

        let verifier = WebhookVerifier::new(
            config.stripe.webhook_secret.clone(),
            config.stripe.webhook_tolerance_secs,
        );

        Ok(Self::new(processor, store, notifier, verifier))
    }
}
