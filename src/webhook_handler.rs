// ═══════════════════════════════════════════════════════════════════════════════
// STRIPE WEBHOOK RECONCILIATION
// ═══════════════════════════════════════════════════════════════════════════════
//
// verify (raw body) -> dispatch on type -> lookup by payment_id -> confirm -> notify
//
// Redeliveries are not deduplicated by event id: the confirmation is re-applied
// and the customer may be notified again. A failed notification leaves the
// record confirmed and answers with an error so the event is redelivered.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{PaymentError, Result};
use crate::signature::SIGNATURE_HEADER;
use crate::state::AppState;
use crate::stripe::PAYMENT_INTENT_SUCCEEDED;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Matching record confirmed
    Confirmed { payment_id: String },
    /// Verified, but not an event kind this endpoint acts on
    Ignored { event_type: String },
}

async fn reconcile(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<WebhookOutcome> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .ok_or_else(|| PaymentError::Signature("Missing stripe-signature header".into()))?
        .to_str()
        .map_err(|_| PaymentError::Signature("Invalid stripe-signature header".into()))?;

    // Nothing may touch the body before this point.
    let event = state.verifier.construct_event(body, signature)?;

    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Webhook received");

    if event.event_type != PAYMENT_INTENT_SUCCEEDED {
        return Ok(WebhookOutcome::Ignored {
            event_type: event.event_type,
        });
    }

    let payment_id = event
        .object_id()
        .ok_or_else(|| PaymentError::Parse("Event object has no id".into()))?
        .to_string();

    let matches = state.store.find_by_payment_id(&payment_id).await?;
    let record = match matches.as_slice() {
        [] => return Err(PaymentError::NotFound(payment_id)),
        [only] => only,
        [first, ..] => {
            tracing::warn!(
                %payment_id,
                count = matches.len(),
                "Several records share a payment id; confirming the oldest"
            );
            first
        }
    };

    state.store.mark_confirmed(&record.id).await?;
    tracing::info!(%payment_id, event_id = %event.id, "Payment confirmed");

    // The confirmation stands even when the email does not go out; the error
    // still reaches the response so the processor redelivers the event.
    if let Err(e) = state
        .notifier
        .send_order_confirmation(&record.record.user_email)
        .await
    {
        tracing::warn!(%payment_id, error = %e, "Order confirmation not sent");
        return Err(e);
    }

    Ok(WebhookOutcome::Confirmed { payment_id })
}

/// Main webhook handler. Takes the body as raw bytes.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match reconcile(&state, &headers, &body).await {
        Ok(WebhookOutcome::Confirmed { .. }) => (
            StatusCode::OK,
            Json(json!({ "message": "Payment confirmed successfully" })),
        )
            .into_response(),
        Ok(WebhookOutcome::Ignored { event_type }) => {
            tracing::info!(%event_type, "Unhandled event type");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Unknown event type" })),
            )
                .into_response()
        }
        Err(PaymentError::NotFound(payment_id)) => {
            tracing::warn!(%payment_id, "No payment record for event");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Payment not found" })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "Webhook rejected");
            webhook_error(&err).into_response()
        }
    }
}

fn webhook_error(err: &PaymentError) -> (StatusCode, Json<serde_json::Value>) {
    let details = err.to_string();
    let body = if details.is_empty() {
        json!({ "error": "Unknown error occurred" })
    } else {
        json!({ "error": "Webhook error", "details": details })
    };
    (StatusCode::BAD_REQUEST, Json(body))
}
