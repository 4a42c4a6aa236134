// ═══════════════════════════════════════════════════════════════════════════════
// APPLICATION CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

use axum::http::HeaderValue;

use crate::error::{PaymentError, Result};

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_PRODUCT_NAME: &str = "Complete Web Development Bundle";
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;

const SECRET_KEY_PLACEHOLDER: &str = "sk_test_placeholder";
const WEBHOOK_SECRET_PLACEHOLDER: &str = "whsec_placeholder";

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub api_base: String,
    /// Maximum age of a signed webhook timestamp, in seconds
    pub webhook_tolerance_secs: i64,
}

/// Outbound email API. Absent means confirmations are only logged.
#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub stripe: StripeConfig,
    pub email: Option<EmailConfig>,
    pub allowed_origin: String,
    pub redis_url: Option<String>,
    pub product_name: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret_key = get("STRIPE_SECRET_KEY").unwrap_or_else(|| {
            tracing::warn!("STRIPE_SECRET_KEY not set, using placeholder");
            SECRET_KEY_PLACEHOLDER.to_string()
        });
        let webhook_secret = get("STRIPE_WEBHOOK_SECRET").unwrap_or_else(|| {
            tracing::warn!("STRIPE_WEBHOOK_SECRET not set, using placeholder");
            WEBHOOK_SECRET_PLACEHOLDER.to_string()
        });
        let webhook_tolerance_secs = match get("STRIPE_WEBHOOK_TOLERANCE_SECS") {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                PaymentError::Config(format!("STRIPE_WEBHOOK_TOLERANCE_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_WEBHOOK_TOLERANCE_SECS,
        };

        let email = get("EMAIL_API_URL").map(|api_url| EmailConfig {
            api_url,
            api_key: get("EMAIL_API_KEY"),
            from: get("EMAIL_FROM").unwrap_or_else(|| "orders@localhost".to_string()),
        });

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| PaymentError::Config(format!("PORT is not a valid port: {raw}")))?,
            None => 3000,
        };

        let allowed_origin =
            get("ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());
        HeaderValue::from_str(&allowed_origin).map_err(|_| {
            PaymentError::Config(format!("ALLOWED_ORIGIN is not a valid header value: {allowed_origin}"))
        })?;

        Ok(Self {
            stripe: StripeConfig {
                secret_key,
                webhook_secret,
                api_base: get("STRIPE_API_BASE")
                    .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
                webhook_tolerance_secs,
            },
            email,
            allowed_origin,
            redis_url: get("REDIS_URL"),
            product_name: get("PRODUCT_NAME").unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string()),
            port,
        })
    }

    pub fn allowed_origin_header(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.allowed_origin)
            .map_err(|e| PaymentError::Config(format!("ALLOWED_ORIGIN: {e}")))
    }
}
