use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;

use crate::{
    domain::Balance,
    ports::balance::{BalanceStorePort, Error},
};

use super::latency::{Latency, NoLatency};

/// In-memory balance store
///
/// A single shared map from user id to balance, kept only for the lifetime of
/// the process. Writes are last-write-wins; callers that need the
/// read-modify-write sequence to be atomic must serialize it themselves.
#[derive(Clone)]
pub struct MemoryBalanceStore {
    balances: Arc<Mutex<HashMap<u64, Balance>>>,
    latency: Arc<dyn Latency>,
}

impl MemoryBalanceStore {
    /// Store with a simulated latency on every upsert
    pub fn with_latency(latency: impl Latency + 'static) -> Self {
        Self {
            balances: Arc::default(),
            latency: Arc::new(latency),
        }
    }
}

impl Default for MemoryBalanceStore {
    fn default() -> Self {
        Self::with_latency(NoLatency)
    }
}

#[async_trait::async_trait]
impl BalanceStorePort for MemoryBalanceStore {
    async fn get(&self, user_id: u64) -> Result<Balance, Error> {
        let balance = self
            .balances
            .lock()?
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Balance::empty(user_id));

        Ok(balance)
    }

    async fn upsert(&self, user_id: u64, points: u64) -> Result<Balance, Error> {
        self.latency.wait().await;

        let balance = Balance {
            user_id,
            points,
            updated_at: Utc::now(),
        };
        self.balances.lock()?.insert(user_id, balance.clone());

        Ok(balance)
    }
}
