use chrono::{DateTime, Utc};

use crate::domain::{TransactionKind, TransactionRecord};

#[mockall::automock]
#[async_trait::async_trait]
pub trait HistoryStorePort {
    /// Append one transaction to the history
    ///
    /// The store assigns the sequence id: process-wide, starting at 1,
    /// strictly increasing, never reused.
    async fn append(
        &self,
        user_id: u64,
        amount: u64,
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
    ) -> Result<TransactionRecord, Error>;

    /// All transactions for a user, in insertion order
    ///
    /// Read-only; does not advance the sequence counter.
    async fn list_by_user(&self, user_id: u64) -> Result<Vec<TransactionRecord>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
