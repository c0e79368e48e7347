//! Counter store configuration.

use std::sync::Arc;

use super::{CounterResult, CounterStore, MemoryCounterStore, RedisCounterStore};

/// Counter store backend type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CounterBackend {
    /// In-process memory store (lost on restart)
    #[default]
    Memory,
    /// Redis server
    Redis { url: String },
}

/// Counter store configuration
#[derive(Debug, Clone, Default)]
pub struct CounterStoreConfig {
    pub backend: CounterBackend,
}

impl CounterStoreConfig {
    /// Config for the in-process store
    pub fn memory() -> Self {
        Self {
            backend: CounterBackend::Memory,
        }
    }

    /// Config for a Redis store at `url`
    pub fn redis(url: String) -> Self {
        Self {
            backend: CounterBackend::Redis { url },
        }
    }

    /// Redis when a URL is given, memory otherwise
    pub fn from_redis_url(url: Option<String>) -> Self {
        match url.filter(|u| !u.trim().is_empty()) {
            Some(url) => Self::redis(url),
            None => Self::memory(),
        }
    }

    /// Build the counter store this config describes
    pub async fn build(&self) -> CounterResult<Arc<dyn CounterStore>> {
        match &self.backend {
            CounterBackend::Memory => Ok(Arc::new(MemoryCounterStore::new())),
            CounterBackend::Redis { url } => Ok(Arc::new(RedisCounterStore::connect(url).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_redis_url() {
        assert_eq!(CounterStoreConfig::from_redis_url(None).backend, CounterBackend::Memory);
        assert_eq!(
            CounterStoreConfig::from_redis_url(Some("  ".into())).backend,
            CounterBackend::Memory
        );
        assert_eq!(
            CounterStoreConfig::from_redis_url(Some("redis://localhost/1".into())).backend,
            CounterBackend::Redis {
                url: "redis://localhost/1".into()
            }
        );
    }

    #[tokio::test]
    async fn test_build_memory() {
        let store = CounterStoreConfig::memory().build().await.unwrap();
        assert_eq!(store.name(), "memory");
        store.ping().await.unwrap();
    }
}
