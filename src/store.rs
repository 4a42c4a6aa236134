// ═══════════════════════════════════════════════════════════════════════════════
// PAYMENT RECORD STORE
// ═══════════════════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{PaymentError, Result};
use crate::record::{NewPaymentRecord, PaymentRecord, StoredPayment};

/// Document store for payment records, queryable by processor payment id.
///
/// Lookup and update are separate calls; nothing here is transactional.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Write a pending record. The store assigns the document id and `created_at`.
    async fn insert(&self, record: NewPaymentRecord) -> Result<StoredPayment>;

    /// All records whose `payment_id` equals the given id, oldest first.
    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Vec<StoredPayment>>;

    /// Set `is_confirmed = true` on the document. Re-applying is a no-op.
    async fn mark_confirmed(&self, id: &str) -> Result<()>;
}

/// In-process store, the default when no Redis URL is configured.
#[derive(Clone, Default)]
pub struct MemoryPaymentStore {
    records: Arc<RwLock<HashMap<String, PaymentRecord>>>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record
    pub async fn all(&self) -> Vec<StoredPayment> {
        let store = self.records.read().await;
        let mut all: Vec<StoredPayment> = store
            .iter()
            .map(|(id, record)| StoredPayment {
                id: id.clone(),
                record: record.clone(),
            })
            .collect();
        all.sort_by_key(|p| p.record.created_at);
        all
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn insert(&self, record: NewPaymentRecord) -> Result<StoredPayment> {
        let id = Uuid::new_v4().to_string();
        let record = PaymentRecord::pending(record, Utc::now());

        let mut store = self.records.write().await;
        store.insert(id.clone(), record.clone());

        Ok(StoredPayment { id, record })
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Vec<StoredPayment>> {
        let store = self.records.read().await;
        let mut matches: Vec<StoredPayment> = store
            .iter()
            .filter(|(_, record)| record.payment_id == payment_id)
            .map(|(id, record)| StoredPayment {
                id: id.clone(),
                record: record.clone(),
            })
            .collect();
        matches.sort_by_key(|p| p.record.created_at);
        Ok(matches)
    }

    async fn mark_confirmed(&self, id: &str) -> Result<()> {
        let mut store = self.records.write().await;
        match store.get_mut(id) {
            Some(record) => {
                record.is_confirmed = true;
                Ok(())
            }
            None => Err(PaymentError::Persistence(format!(
                "no document with id {id}"
            ))),
        }
    }
}
