use chrono::{DateTime, Utc};

/// Point balance for a single user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    /// Unique identifier for the user
    ///
    /// Identifiers are assigned by an upstream service; anything below 1 is
    /// rejected before it reaches a store.
    pub user_id: u64,

    /// Current amount of points
    ///
    /// Stored unsigned so a balance can never go negative.
    pub points: u64,

    /// When the balance was last written
    pub updated_at: DateTime<Utc>,
}

impl Balance {
    /// Zero-point snapshot for a user with no stored balance yet
    pub fn empty(user_id: u64) -> Self {
        Self {
            user_id,
            points: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Direction of a ledger transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionKind {
    /// Points added to the balance
    Charge,
    /// Points removed from the balance
    Use,
}

/// One entry in the append-only transaction history
///
/// Records are never updated or deleted once written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Process-wide sequence number, starting at 1 and strictly increasing
    pub sequence_id: u64,
    pub user_id: u64,
    /// The amount charged or used, not the resulting total
    pub amount: u64,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
}
