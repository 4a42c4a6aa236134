//! Payment records as held by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields supplied when a pending payment is first written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPaymentRecord {
    pub user_email: String,
    pub payment_id: String,
    pub amount: i64,
    pub currency: String,
}

/// One purchase. `is_confirmed` is the only field that ever changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub user_email: String,
    pub payment_id: String,
    pub amount: i64,
    pub currency: String,
    pub is_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Pending record stamped with the given creation time
    pub fn pending(new: NewPaymentRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            user_email: new.user_email,
            payment_id: new.payment_id,
            amount: new.amount,
            currency: new.currency,
            is_confirmed: false,
            created_at,
        }
    }
}

/// A record together with the document id the store filed it under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredPayment {
    pub id: String,
    pub record: PaymentRecord,
}
