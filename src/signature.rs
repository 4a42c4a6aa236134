// ═══════════════════════════════════════════════════════════════════════════════
// WEBHOOK SIGNATURE VERIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{PaymentError, Result};
use crate::stripe::StripeEvent;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

fn signer(webhook_secret: &str, timestamp: &str, payload: &[u8]) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())
        .map_err(|_| PaymentError::Signature("Invalid webhook secret".into()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verify a `t=<unix>,v1=<hex>[,v1=<hex>...]` header against the raw body.
/// Timestamps older than `tolerance_secs` are rejected; ones ahead of `now` are not.
/// A `tolerance_secs` of zero or less disables the timestamp check.
/// Big O: O(n) where n is payload size
pub fn verify_webhook_signature(
    payload: &[u8],
    signature_header: &str,
    webhook_secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<()> {
    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in signature_header.split(',') {
        let mut split = part.trim().splitn(2, '=');
        match (split.next(), split.next()) {
            (Some("t"), Some(value)) => timestamp = Some(value),
            (Some("v1"), Some(value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| PaymentError::Signature("Unable to extract timestamp from header".into()))?;
    if candidates.is_empty() {
        return Err(PaymentError::Signature(
            "No signatures found with expected scheme".into(),
        ));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| PaymentError::Signature("Invalid timestamp".into()))?;
    // ts comes from an unauthenticated header, so the age may not fit in an i64
    let too_old = now.checked_sub(ts).map_or(true, |age| age > tolerance_secs);
    if tolerance_secs > 0 && too_old {
        return Err(PaymentError::Signature(
            "Timestamp outside the tolerance zone".into(),
        ));
    }

    let mac = signer(webhook_secret, timestamp, payload)?;
    let matched = candidates.iter().any(|candidate| match hex::decode(candidate) {
        // verify_slice compares in constant time
        Ok(expected) => mac.clone().verify_slice(&expected).is_ok(),
        Err(_) => false,
    });

    if matched {
        Ok(())
    } else {
        Err(PaymentError::Signature(
            "No signatures found matching the expected signature for payload".into(),
        ))
    }
}

/// Produce a header value in the processor's format, for local tooling and tests.
pub fn sign_payload(payload: &[u8], webhook_secret: &str, timestamp: i64) -> Result<String> {
    let ts = timestamp.to_string();
    let sig = hex::encode(signer(webhook_secret, &ts, payload)?.finalize().into_bytes());
    Ok(format!("t={ts},v1={sig}"))
}

/// Authenticates inbound webhook deliveries with the endpoint's signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Check the signature over the untouched body, then parse it.
    pub fn construct_event(&self, payload: &[u8], signature_header: &str) -> Result<StripeEvent> {
        verify_webhook_signature(
            payload,
            signature_header,
            &self.secret,
            self.tolerance_secs,
            Utc::now().timestamp(),
        )?;

        serde_json::from_slice(payload)
            .map_err(|e| PaymentError::Parse(format!("Invalid event payload: {e}")))
    }
}
