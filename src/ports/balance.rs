use crate::domain::Balance;

#[mockall::automock]
#[async_trait::async_trait]
pub trait BalanceStorePort {
    /// Current balance for a user
    ///
    /// A user with no stored balance resolves to a zero-point snapshot; this
    /// never fails for a lookup of an unknown id.
    async fn get(&self, user_id: u64) -> Result<Balance, Error>;

    /// Replace (or create) the stored balance for a user
    ///
    /// Last write wins unconditionally; there is no concurrency token. The
    /// returned snapshot carries the new `updated_at` stamp.
    async fn upsert(&self, user_id: u64, points: u64) -> Result<Balance, Error>;
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
