//! `POST /api/create-payment-intent`

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{PaymentError, Result};
use crate::record::NewPaymentRecord;
use crate::state::AppState;
use crate::stripe::CreateIntentParams;

#[derive(Debug, Default, Deserialize)]
pub struct CreatePaymentIntentRequest {
    #[serde(default)]
    pub email: Option<String>,
    /// Minor currency units
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

impl CreatePaymentIntentRequest {
    /// All three fields must be present and non-empty, and the amount positive.
    pub fn validate(self) -> Result<CreateIntentParams> {
        let email = self.email.filter(|e| !e.trim().is_empty());
        let currency = self.currency.filter(|c| !c.trim().is_empty());
        let amount = self.amount.filter(|a| *a > 0);

        match (email, amount, currency) {
            (Some(email), Some(amount), Some(currency)) => Ok(CreateIntentParams {
                amount,
                currency,
                receipt_email: email,
            }),
            _ => Err(PaymentError::Validation("email, amount and currency are required".into())),
        }
    }
}

/// Create the intent, then write the pending record, then answer.
async fn create_intent(state: &AppState, body: &[u8]) -> Result<CreatePaymentIntentResponse> {
    let request: CreatePaymentIntentRequest = serde_json::from_slice(body)
        .map_err(|e| PaymentError::Parse(format!("Invalid request body: {e}")))?;

    tracing::info!(
        email = ?request.email,
        amount = ?request.amount,
        currency = ?request.currency,
        "Received create-payment-intent request"
    );

    let params = request.validate()?;
    let intent = state.processor.create_intent(&params).await?;
    let client_secret = intent
        .client_secret
        .ok_or_else(|| PaymentError::Processor(format!("Intent {} has no client secret", intent.id)))?;

    let record = NewPaymentRecord {
        user_email: params.receipt_email,
        payment_id: intent.id.clone(),
        amount: params.amount,
        currency: params.currency,
    };
    if let Err(e) = state.store.insert(record).await {
        tracing::error!(
            payment_id = %intent.id,
            error = %e,
            "Pending record not written; processor intent is orphaned"
        );
        return Err(e);
    }

    tracing::info!(payment_id = %intent.id, "Pending payment recorded");
    Ok(CreatePaymentIntentResponse { client_secret })
}

pub async fn create_payment_intent(State(state): State<AppState>, body: Bytes) -> Response {
    match create_intent(&state, &body).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(err @ PaymentError::Validation(_)) => {
            tracing::warn!(error = %err, "Rejected create-payment-intent request");
            (
                err.status(),
                Json(json!({ "error": "Missing required parameters" })),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "Error creating payment intent");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create payment intent" })),
            )
                .into_response()
        }
    }
}
