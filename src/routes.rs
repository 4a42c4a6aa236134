use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::PaymentError;
use crate::intent_handler::create_payment_intent;
use crate::state::AppState;
use crate::webhook_handler::stripe_webhook;

pub const CREATE_INTENT_PATH: &str = "/api/create-payment-intent";
pub const WEBHOOK_PATH: &str = "/api/webhook";

/// Both endpoints accept POST only.
pub async fn method_not_allowed(method: Method) -> Response {
    let err = PaymentError::MethodNotAllowed(method);
    (
        err.status(),
        [(header::ALLOW, "POST")],
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub fn cors_layer(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn build_router(state: AppState, allowed_origin: HeaderValue) -> Router {
    // CORS only applies to the browser-facing endpoint; the webhook is server to server.
    let storefront = Router::new()
        .route(
            CREATE_INTENT_PATH,
            post(create_payment_intent)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .layer(cors_layer(allowed_origin));

    Router::new()
        .merge(storefront)
        .route(WEBHOOK_PATH, post(stripe_webhook).fallback(method_not_allowed))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
