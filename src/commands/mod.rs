use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

pub mod balance_of;
pub mod charge;
pub mod use_points;

/// Amounts below this are rejected, for charge and use alike
///
/// Applying the same floor to `use` rejects small withdrawals from an
/// otherwise sufficient balance. That is the upstream policy, kept as-is
/// rather than special-cased.
pub const MINIMUM_CHARGE_AMOUNT: u64 = 1000;

/// Whether ledger operations serialize per user
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Serialization {
    /// Plain read-modify-write
    ///
    /// Concurrent operations for the same user can interleave between the
    /// balance read and the write, losing one of the updates. Matches the
    /// behavior of the stores taken alone.
    None,
    /// Hold a per-user lock across the read-compute-write-append sequence
    PerUser,
}

#[derive(Clone, Copy, Debug)]
pub struct LedgerConfig {
    pub minimum_amount: u64,
    pub serialization: Serialization,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            minimum_amount: MINIMUM_CHARGE_AMOUNT,
            serialization: Serialization::PerUser,
        }
    }
}

/// Ledger service over a balance store and a history store
///
/// Each operation (charge, use, balance lookup) is a [`tower::Service`]
/// implementation on this struct; see the submodules for the request types.
pub struct Ledger<B, H> {
    balances: Arc<B>,
    history: Arc<H>,
    config: LedgerConfig,
    user_locks: UserLocks,
}

impl<B, H> Ledger<B, H> {
    pub fn new(balances: Arc<B>, history: Arc<H>, config: LedgerConfig) -> Self {
        Self {
            balances,
            history,
            config,
            user_locks: UserLocks::default(),
        }
    }
}

impl<B, H> Clone for Ledger<B, H> {
    fn clone(&self) -> Self {
        Self {
            balances: self.balances.clone(),
            history: self.history.clone(),
            config: self.config,
            user_locks: self.user_locks.clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// User ids below 1 are never valid
    #[error("invalid user id: {user_id}")]
    InvalidUser { user_id: i64 },

    /// Amount below the configured minimum, negative amounts included
    #[error("amount {amount} is below the minimum of {minimum}")]
    InvalidAmount { amount: i64, minimum: u64 },

    /// The user's balance does not cover the requested use
    #[error("insufficient balance: {current} available, {requested} requested")]
    InsufficientBalance { current: u64, requested: u64 },

    #[error("balance store error: {0:?}")]
    BalanceStore(#[from] crate::ports::balance::Error),
    #[error("history store error: {0:?}")]
    HistoryStore(#[from] crate::ports::history::Error),
}

/// Lazily created per-user locks
///
/// Used when [`Serialization::PerUser`] is configured, so the read-then-write
/// sequence of a charge or use cannot interleave with another operation for
/// the same user. Locks for different users are independent. Locks that no
/// task holds anymore are evicted on the next acquisition, so the map does
/// not grow with every user id ever seen.
#[derive(Clone, Default)]
pub(crate) struct UserLocks(Arc<Mutex<HashMap<u64, Arc<Mutex<()>>>>>);

impl UserLocks {
    pub(crate) async fn acquire(&self, user_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.0.lock().await;
            // A lock with no other strong reference has no holder and no
            // waiter; waiters keep their own clone of the Arc.
            locks.retain(|_, entry| Arc::strong_count(entry) > 1);
            locks.entry(user_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Lock guard when per-user serialization is enabled, `None` otherwise
    pub(crate) async fn acquire_if(
        &self,
        serialization: Serialization,
        user_id: u64,
    ) -> Option<OwnedMutexGuard<()>> {
        match serialization {
            Serialization::PerUser => Some(self.acquire(user_id).await),
            Serialization::None => None,
        }
    }
}

/// Shared id check: user ids start at 1
pub(crate) fn validate_user_id(user_id: i64) -> Result<u64, Error> {
    if user_id < 1 {
        return Err(Error::InvalidUser { user_id });
    }
    Ok(user_id as u64)
}

/// Shared amount check, applied to charge and use alike
pub(crate) fn validate_amount(amount: i64, minimum: u64) -> Result<u64, Error> {
    if amount < 0 || (amount as u64) < minimum {
        return Err(Error::InvalidAmount { amount, minimum });
    }
    Ok(amount as u64)
}
