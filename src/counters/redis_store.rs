//! Redis counter store backend.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::backend::{CounterResult, CounterStore};

/// Redis-backed counter store.
///
/// Holds a single [`ConnectionManager`]; clones share one multiplexed
/// connection that reconnects on failure.
#[derive(Clone)]
pub struct RedisCounterStore {
    connection: ConnectionManager,
}

impl RedisCounterStore {
    /// Connect to Redis at `redis_url` (e.g. `redis://127.0.0.1:6379/0`)
    pub async fn connect(redis_url: &str) -> CounterResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Connected to Redis counter store at {}", redis_url);
        Ok(Self { connection })
    }

    fn conn(&self) -> ConnectionManager {
        self.connection.clone()
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr(&self, key: &str, delta: i64) -> CounterResult<i64> {
        let mut conn = self.conn();
        let value: i64 = conn.incr(key, delta).await?;
        Ok(value)
    }

    async fn get(&self, key: &str) -> CounterResult<Option<i64>> {
        let mut conn = self.conn();
        let value: Option<i64> = conn.get(key).await?;
        Ok(value)
    }

    async fn zincr(&self, key: &str, member: &str, delta: f64) -> CounterResult<f64> {
        let mut conn = self.conn();
        let score: f64 = conn.zincr(key, member, delta).await?;
        Ok(score)
    }

    async fn zscore(&self, key: &str, member: &str) -> CounterResult<Option<f64>> {
        let mut conn = self.conn();
        let score: Option<f64> = conn.zscore(key, member).await?;
        Ok(score)
    }

    async fn zrange_desc(&self, key: &str, limit: usize) -> CounterResult<Vec<(String, f64)>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn();
        let stop = isize::try_from(limit - 1).unwrap_or(isize::MAX);
        let entries: Vec<(String, f64)> = conn.zrevrange_withscores(key, 0, stop).await?;
        Ok(entries)
    }

    async fn incr_with_score(
        &self,
        counter_key: &str,
        ranking_key: &str,
        member: &str,
        delta: i64,
    ) -> CounterResult<i64> {
        let mut conn = self.conn();
        // MULTI/EXEC so both values move together
        let (total, _score): (i64, f64) = redis::pipe()
            .atomic()
            .incr(counter_key, delta)
            .zincr(ranking_key, member, delta)
            .query_async(&mut conn)
            .await?;
        Ok(total)
    }

    async fn ping(&self) -> CounterResult<()> {
        let mut conn = self.conn();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
