//! Counter store trait definition.

use async_trait::async_trait;
use thiserror::Error;

/// Counter store error types
#[derive(Error, Debug)]
pub enum CounterError {
    /// The backend could not be reached or rejected the command
    #[error("Counter backend error: {0}")]
    Backend(String),

    /// Redis client error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type CounterResult<T> = Result<T, CounterError>;

/// Counter store trait for pluggable counter backends.
///
/// Every single-key operation must be atomic at the store level; no locking is
/// done by callers. Missing keys behave as zero / empty.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment an integer counter, returning the value after the increment
    async fn incr(&self, key: &str, delta: i64) -> CounterResult<i64>;

    /// Read an integer counter
    async fn get(&self, key: &str) -> CounterResult<Option<i64>>;

    /// Increment a member's score in a sorted set, returning the new score
    async fn zincr(&self, key: &str, member: &str, delta: f64) -> CounterResult<f64>;

    /// Read a member's score in a sorted set
    async fn zscore(&self, key: &str, member: &str) -> CounterResult<Option<f64>>;

    /// Top `limit` members by descending score.
    ///
    /// Members with equal scores come out in descending member order, like
    /// Redis `ZREVRANGE`. Callers must not depend on tie order.
    async fn zrange_desc(&self, key: &str, limit: usize) -> CounterResult<Vec<(String, f64)>>;

    /// Increment a counter and the same member's score in a sorted set.
    ///
    /// The default issues the two operations in sequence; a failure of the
    /// second leaves the first applied. Backends that support transactions
    /// override this to make the pair atomic.
    async fn incr_with_score(
        &self,
        counter_key: &str,
        ranking_key: &str,
        member: &str,
        delta: i64,
    ) -> CounterResult<i64> {
        let total = self.incr(counter_key, delta).await?;
        self.zincr(ranking_key, member, delta as f64).await?;
        Ok(total)
    }

    /// Check the backend is reachable
    async fn ping(&self) -> CounterResult<()>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
