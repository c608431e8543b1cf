use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::{DateTime, Utc};

use crate::{
    domain::{TransactionKind, TransactionRecord},
    ports::history::{Error, HistoryStorePort},
};

use super::latency::{Latency, NoLatency};

/// In-memory, append-only transaction history
///
/// Records are kept in insertion order in a single shared vector. Sequence
/// ids come from a process-wide counter starting at 1; they are unique and
/// strictly increasing across all users, and are never reused.
#[derive(Clone)]
pub struct MemoryHistoryStore {
    records: Arc<Mutex<Vec<TransactionRecord>>>,
    cursor: Arc<AtomicU64>,
    latency: Arc<dyn Latency>,
}

impl MemoryHistoryStore {
    /// Store with a simulated latency on every append
    pub fn with_latency(latency: impl Latency + 'static) -> Self {
        Self {
            records: Arc::default(),
            cursor: Arc::new(AtomicU64::new(1)),
            latency: Arc::new(latency),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::with_latency(NoLatency)
    }
}

#[async_trait::async_trait]
impl HistoryStorePort for MemoryHistoryStore {
    async fn append(
        &self,
        user_id: u64,
        amount: u64,
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
    ) -> Result<TransactionRecord, Error> {
        self.latency.wait().await;

        let mut records = self.records.lock()?;
        // Assigning the id under the lock keeps sequence order and insertion
        // order consistent.
        let record = TransactionRecord {
            sequence_id: self.cursor.fetch_add(1, Ordering::SeqCst),
            user_id,
            amount,
            kind,
            occurred_at,
        };
        records.push(record.clone());

        Ok(record)
    }

    async fn list_by_user(&self, user_id: u64) -> Result<Vec<TransactionRecord>, Error> {
        let records = self
            .records
            .lock()?
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::latency::RandomLatency;
    use speculoos::prelude::*;

    #[tokio::test]
    async fn test_append_retrieve() {
        let store = MemoryHistoryStore::default();
        let res = store
            .append(1, 1000, TransactionKind::Charge, Utc::now())
            .await;
        assert_that!(res).is_ok().matches(|record| {
            record.sequence_id == 1
                && record.user_id == 1
                && record.amount == 1000
                && record.kind == TransactionKind::Charge
        });

        let res = store.list_by_user(1).await;
        assert_that!(res).is_ok().has_length(1);
    }

    #[tokio::test]
    async fn test_sequence_ids_increase_across_users() {
        let store = MemoryHistoryStore::default();
        let first = store
            .append(1, 1000, TransactionKind::Charge, Utc::now())
            .await
            .unwrap();
        let second = store
            .append(2, 2000, TransactionKind::Charge, Utc::now())
            .await
            .unwrap();
        let third = store
            .append(1, 1000, TransactionKind::Use, Utc::now())
            .await
            .unwrap();

        assert_that!(first.sequence_id).is_equal_to(1);
        assert_that!(second.sequence_id).is_equal_to(2);
        assert_that!(third.sequence_id).is_equal_to(3);
    }

    #[tokio::test]
    async fn test_list_by_user_filters_in_insertion_order() {
        let store = MemoryHistoryStore::default();
        store
            .append(1, 1000, TransactionKind::Charge, Utc::now())
            .await
            .unwrap();
        store
            .append(2, 9000, TransactionKind::Charge, Utc::now())
            .await
            .unwrap();
        store
            .append(1, 500, TransactionKind::Use, Utc::now())
            .await
            .unwrap();

        let records = store.list_by_user(1).await.unwrap();
        assert_that!(records).has_length(2);
        assert_that!(records[0].kind).is_equal_to(TransactionKind::Charge);
        assert_that!(records[0].amount).is_equal_to(1000);
        assert_that!(records[1].kind).is_equal_to(TransactionKind::Use);
        assert_that!(records[1].amount).is_equal_to(500);
    }

    #[tokio::test]
    async fn test_list_by_user_empty() {
        let store = MemoryHistoryStore::default();
        let res = store.list_by_user(7).await;
        assert_that!(res).is_ok().is_empty();
    }

    #[tokio::test]
    async fn test_list_does_not_advance_cursor() {
        let store = MemoryHistoryStore::default();
        store.list_by_user(1).await.unwrap();
        store.list_by_user(1).await.unwrap();
        let record = store
            .append(1, 1000, TransactionKind::Charge, Utc::now())
            .await
            .unwrap();
        assert_that!(record.sequence_id).is_equal_to(1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_with_random_latency() {
        let store = MemoryHistoryStore::with_latency(RandomLatency::default());
        let res = store
            .append(1, 1000, TransactionKind::Charge, Utc::now())
            .await;
        assert_that!(res).is_ok().matches(|record| record.sequence_id == 1);
    }
}
