use std::time::Duration;

use rand::Rng;

/// Simulated storage latency
///
/// In-memory stores respond instantly, which makes timing-sensitive bugs
/// invisible in tests. Adapters call this hook before completing a write so
/// integration tests can run against a backend with realistic response times.
#[async_trait::async_trait]
pub trait Latency: Send + Sync {
    async fn wait(&self);
}

/// No delay; the default for unit tests
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLatency;

#[async_trait::async_trait]
impl Latency for NoLatency {
    async fn wait(&self) {}
}

/// Uniformly random delay in `[0, max)`
#[derive(Clone, Copy, Debug)]
pub struct RandomLatency {
    pub max: Duration,
}

impl Default for RandomLatency {
    fn default() -> Self {
        Self {
            max: Duration::from_millis(300),
        }
    }
}

#[async_trait::async_trait]
impl Latency for RandomLatency {
    async fn wait(&self) {
        let max_millis = self.max.as_millis().max(1) as u64;
        let millis = rand::thread_rng().gen_range(0..max_millis);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}
