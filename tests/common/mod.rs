#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use rand::Rng;
use serde_json::Value;
use tower::ServiceExt;

use storefront_payment_backend::{
    build_router, sign_payload, AppState, CreateIntentParams, MemoryPaymentStore, NewPaymentRecord,
    Notifier, PaymentError, PaymentIntent, PaymentProcessor, PaymentStore, Result, StoredPayment,
    WebhookVerifier,
};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const ALLOWED_ORIGIN: &str = "https://shop.example.com";

// ═══════════════════════════════════════════════════════════════════════════════
// FAKES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct FakeProcessor {
    pub fail: bool,
    pub calls: Mutex<Vec<CreateIntentParams>>,
    pub created: Mutex<Vec<String>>,
}

impl FakeProcessor {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_intent_id(&self) -> Option<String> {
        self.created.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn create_intent(&self, params: &CreateIntentParams) -> Result<PaymentIntent> {
        self.calls.lock().unwrap().push(params.clone());
        if self.fail {
            return Err(PaymentError::Processor("card_declined".into()));
        }
        let suffix: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(14)
            .map(char::from)
            .collect();
        let id = format!("pi_{suffix}");
        self.created.lock().unwrap().push(id.clone());
        Ok(PaymentIntent {
            client_secret: Some(format!("{id}_secret_test")),
            id,
            status: Some("requires_payment_method".into()),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_order_confirmation(&self, email: &str) -> Result<()> {
        self.sent.lock().unwrap().push(email.to_string());
        if self.fail {
            return Err(PaymentError::Notification("smtp down".into()));
        }
        Ok(())
    }
}

/// Memory store that can be told to fail writes.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryPaymentStore,
    pub fail_insert: bool,
    pub fail_update: bool,
    pub updates: AtomicUsize,
}

#[async_trait]
impl PaymentStore for FlakyStore {
    async fn insert(&self, record: NewPaymentRecord) -> Result<StoredPayment> {
        if self.fail_insert {
            return Err(PaymentError::Persistence("connection reset".into()));
        }
        self.inner.insert(record).await
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Vec<StoredPayment>> {
        self.inner.find_by_payment_id(payment_id).await
    }

    async fn mark_confirmed(&self, id: &str) -> Result<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_update {
            return Err(PaymentError::Persistence("connection reset".into()));
        }
        self.inner.mark_confirmed(id).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HARNESS
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TestApp {
    pub router: Router,
    pub store: Arc<FlakyStore>,
    pub processor: Arc<FakeProcessor>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(FakeProcessor::default(), FlakyStore::default(), RecordingNotifier::default())
    }

    pub fn with(processor: FakeProcessor, store: FlakyStore, notifier: RecordingNotifier) -> Self {
        let processor = Arc::new(processor);
        let store = Arc::new(store);
        let notifier = Arc::new(notifier);
        let state = AppState::new(
            processor.clone(),
            store.clone(),
            notifier.clone(),
            WebhookVerifier::new(WEBHOOK_SECRET, 300),
        );
        let router = build_router(state, HeaderValue::from_static(ALLOWED_ORIGIN));
        Self {
            router,
            store,
            processor,
            notifier,
        }
    }

    pub async fn records(&self) -> Vec<StoredPayment> {
        self.store.inner.all().await
    }

    pub async fn seed(&self, email: &str, payment_id: &str) -> StoredPayment {
        self.store
            .inner
            .insert(NewPaymentRecord {
                user_email: email.into(),
                payment_id: payment_id.into(),
                amount: 1299,
                currency: "usd".into(),
            })
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn create_intent(&self, body: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/create-payment-intent")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Deliver a body with a valid signature for the test secret.
    pub async fn deliver(&self, payload: &str) -> Response<Body> {
        let header = sign_payload(payload.as_bytes(), WEBHOOK_SECRET, Utc::now().timestamp()).unwrap();
        self.deliver_with_signature(payload, Some(&header)).await
    }

    pub async fn deliver_with_signature(&self, payload: &str, signature: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/webhook")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header("stripe-signature", signature);
        }
        self.send(builder.body(Body::from(payload.to_string())).unwrap())
            .await
    }
}

pub fn event_payload(event_type: &str, intent_id: &str) -> String {
    format!(
        r#"{{"id":"evt_test_1","object":"event","type":"{event_type}","created":1718884800,"livemode":false,"data":{{"object":{{"id":"{intent_id}","object":"payment_intent","amount":1299,"currency":"usd"}}}}}}"#
    )
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
