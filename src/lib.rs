//! # storefront_payment_backend
//!
//! Payment backend for a single-product storefront.
//!
//! ```text
//! client ──POST /api/create-payment-intent──▶ Stripe (create) ──▶ store (pending) ──▶ client_secret
//!
//! Stripe ──POST /api/webhook──▶ verify ──▶ lookup ──▶ confirm ──▶ email
//! ```
//!
//! The processor, store and notifier sit behind traits and are injected
//! through [`AppState`], so tests run the whole router against fakes.

pub mod config;
pub mod error;
pub mod intent_handler;
pub mod notifier;
pub mod record;
pub mod redis_store;
pub mod routes;
pub mod signature;
pub mod state;
pub mod store;
pub mod stripe;
pub mod webhook_handler;

pub use config::AppConfig;
pub use error::{PaymentError, Result};
pub use notifier::{HttpEmailNotifier, LogNotifier, Notifier};
pub use record::{NewPaymentRecord, PaymentRecord, StoredPayment};
pub use redis_store::RedisPaymentStore;
pub use routes::build_router;
pub use signature::{sign_payload, verify_webhook_signature, WebhookVerifier};
pub use state::AppState;
pub use store::{MemoryPaymentStore, PaymentStore};
pub use stripe::{CreateIntentParams, PaymentIntent, PaymentProcessor, StripeClient, StripeEvent};
pub use webhook_handler::WebhookOutcome;
