// ═══════════════════════════════════════════════════════════════════════════════
// REDIS-BACKED PAYMENT STORE
// ═══════════════════════════════════════════════════════════════════════════════
//
// Layout:
//   payments:{doc_id}                      -> PaymentRecord as JSON
//   payments:by_payment_id:{payment_id}    -> SET of doc ids

use async_trait::async_trait;
use chrono::Utc;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::error::{PaymentError, Result};
use crate::record::{NewPaymentRecord, PaymentRecord, StoredPayment};
use crate::store::PaymentStore;

const KEY_PREFIX: &str = "payments";

fn document_key(id: &str) -> String {
    format!("{KEY_PREFIX}:{id}")
}

fn payment_id_index_key(payment_id: &str) -> String {
    format!("{KEY_PREFIX}:by_payment_id:{payment_id}")
}

#[derive(Clone)]
pub struct RedisPaymentStore {
    client: redis::Client,
}

impl RedisPaymentStore {
    /// Validates the URL only; connections are opened per call.
    pub fn open(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// Round-trip a PING, used at startup to fail fast.
    pub async fn ping(&self) -> Result<()> {
        let mut con = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut con).await?;
        Ok(())
    }

    fn decode(id: &str, json: &str) -> Result<PaymentRecord> {
        serde_json::from_str(json)
            .map_err(|e| PaymentError::Persistence(format!("corrupt document {id}: {e}")))
    }
}

#[async_trait]
impl PaymentStore for RedisPaymentStore {
    async fn insert(&self, record: NewPaymentRecord) -> Result<StoredPayment> {
        let id = Uuid::new_v4().to_string();
        let record = PaymentRecord::pending(record, Utc::now());
        let json = serde_json::to_string(&record)
            .map_err(|e| PaymentError::Persistence(e.to_string()))?;

        let mut con = self.connection().await?;
        redis::pipe()
            .atomic()
            .set(document_key(&id), json)
            .ignore()
            .sadd(payment_id_index_key(&record.payment_id), &id)
            .ignore()
            .query_async::<_, ()>(&mut con)
            .await?;

        Ok(StoredPayment { id, record })
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Vec<StoredPayment>> {
        let mut con = self.connection().await?;
        let ids: Vec<String> = con.smembers(payment_id_index_key(payment_id)).await?;

        let mut matches = Vec::with_capacity(ids.len());
        for id in ids {
            let json: Option<String> = con.get(document_key(&id)).await?;
            match json {
                Some(json) => {
                    let record = Self::decode(&id, &json)?;
                    matches.push(StoredPayment { id, record });
                }
                None => tracing::warn!(doc_id = %id, payment_id, "Index points at missing document"),
            }
        }
        matches.sort_by_key(|p| p.record.created_at);
        Ok(matches)
    }

    async fn mark_confirmed(&self, id: &str) -> Result<()> {
        let mut con = self.connection().await?;
        let key = document_key(id);

        let json: Option<String> = con.get(&key).await?;
        let json = json.ok_or_else(|| PaymentError::Persistence(format!("no document with id {id}")))?;

        let mut record = Self::decode(id, &json)?;
        record.is_confirmed = true;
        let json = serde_json::to_string(&record)
            .map_err(|e| PaymentError::Persistence(e.to_string()))?;

        let _: () = con.set(&key, json).await?;
        Ok(())
    }
}
