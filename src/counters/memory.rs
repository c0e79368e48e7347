//! In-process counter store.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::backend::{CounterResult, CounterStore};

#[derive(Default)]
struct Inner {
    counters: HashMap<String, i64>,
    sorted_sets: HashMap<String, HashMap<String, f64>>,
}

/// Memory-backed counter store.
///
/// All state sits behind one mutex, so every operation (including the paired
/// `incr_with_score`) is atomic. Values are lost on restart.
#[derive(Default)]
pub struct MemoryCounterStore {
    inner: Mutex<Inner>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn bump_score(inner: &mut Inner, key: &str, member: &str, delta: f64) -> f64 {
    let score = inner
        .sorted_sets
        .entry(key.to_string())
        .or_default()
        .entry(member.to_string())
        .or_insert(0.0);
    *score += delta;
    *score
}

fn bump_counter(inner: &mut Inner, key: &str, delta: i64) -> i64 {
    let value = inner.counters.entry(key.to_string()).or_insert(0);
    *value += delta;
    *value
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr(&self, key: &str, delta: i64) -> CounterResult<i64> {
        let mut inner = self.inner.lock();
        Ok(bump_counter(&mut inner, key, delta))
    }

    async fn get(&self, key: &str) -> CounterResult<Option<i64>> {
        Ok(self.inner.lock().counters.get(key).copied())
    }

    async fn zincr(&self, key: &str, member: &str, delta: f64) -> CounterResult<f64> {
        let mut inner = self.inner.lock();
        Ok(bump_score(&mut inner, key, member, delta))
    }

    async fn zscore(&self, key: &str, member: &str) -> CounterResult<Option<f64>> {
        let inner = self.inner.lock();
        Ok(inner
            .sorted_sets
            .get(key)
            .and_then(|set| set.get(member))
            .copied())
    }

    async fn zrange_desc(&self, key: &str, limit: usize) -> CounterResult<Vec<(String, f64)>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let inner = self.inner.lock();
        let Some(set) = inner.sorted_sets.get(key) else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<(String, f64)> =
            set.iter().map(|(m, s)| (m.clone(), *s)).collect();
        drop(inner);

        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.0.cmp(&a.0))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    async fn incr_with_score(
        &self,
        counter_key: &str,
        ranking_key: &str,
        member: &str,
        delta: i64,
    ) -> CounterResult<i64> {
        let mut inner = self.inner.lock();
        let total = bump_counter(&mut inner, counter_key, delta);
        bump_score(&mut inner, ranking_key, member, delta as f64);
        Ok(total)
    }

    async fn ping(&self) -> CounterResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_incr_starts_at_zero() {
        let store = MemoryCounterStore::new();
        assert_eq!(store.get("views").await.unwrap(), None);
        assert_eq!(store.incr("views", 1).await.unwrap(), 1);
        assert_eq!(store.incr("views", 4).await.unwrap(), 5);
        assert_eq!(store.get("views").await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_zrange_desc_orders_by_score() {
        let store = MemoryCounterStore::new();
        store.zincr("rank", "a", 1.0).await.unwrap();
        store.zincr("rank", "b", 7.0).await.unwrap();
        store.zincr("rank", "c", 3.0).await.unwrap();

        let top = store.zrange_desc("rank", 2).await.unwrap();
        assert_eq!(top, vec![("b".to_string(), 7.0), ("c".to_string(), 3.0)]);

        assert!(store.zrange_desc("rank", 0).await.unwrap().is_empty());
        assert!(store.zrange_desc("missing", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zrange_desc_tie_order_is_stable() {
        let store = MemoryCounterStore::new();
        store.zincr("rank", "10", 2.0).await.unwrap();
        store.zincr("rank", "11", 2.0).await.unwrap();

        let first = store.zrange_desc("rank", 2).await.unwrap();
        let second = store.zrange_desc("rank", 2).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_incr_with_score_updates_both() {
        let store = MemoryCounterStore::new();
        for _ in 0..3 {
            store
                .incr_with_score("image:1:views", "image_ranking", "1", 1)
                .await
                .unwrap();
        }
        assert_eq!(store.get("image:1:views").await.unwrap(), Some(3));
        assert_eq!(store.zscore("image_ranking", "1").await.unwrap(), Some(3.0));
    }
}
