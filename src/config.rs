//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::counters::CounterStoreConfig;

pub const DEFAULT_PAGE_SIZE: u64 = 8;
pub const DEFAULT_RANKING_SIZE: usize = 10;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
    /// Counter store backend
    pub counters: CounterStoreConfig,
    /// Images per list page
    pub page_size: u64,
    /// Entries on the ranking page
    pub ranking_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_dir: std::env::temp_dir().join("imagemarks"),
            counters: CounterStoreConfig::memory(),
            page_size: DEFAULT_PAGE_SIZE,
            ranking_size: DEFAULT_RANKING_SIZE,
        }
    }
}

impl ServerConfig {
    /// Build config from `IMAGEMARKS_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build config from an arbitrary variable lookup; unset or unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = lookup("IMAGEMARKS_BIND_ADDR")
            .and_then(|v| match v.parse() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    tracing::warn!("Ignoring invalid IMAGEMARKS_BIND_ADDR: {}", v);
                    None
                }
            })
            .unwrap_or(defaults.bind_addr);

        let data_dir = lookup("IMAGEMARKS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let page_size = lookup("IMAGEMARKS_PAGE_SIZE")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.page_size);

        let ranking_size = lookup("IMAGEMARKS_RANKING_SIZE")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.ranking_size);

        Self {
            bind_addr,
            data_dir,
            counters: CounterStoreConfig::from_redis_url(lookup("IMAGEMARKS_REDIS_URL")),
            page_size,
            ranking_size,
        }
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("imagemarks.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::CounterBackend;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.page_size, 8);
        assert_eq!(config.ranking_size, 10);
        assert_eq!(config.counters.backend, CounterBackend::Memory);
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("IMAGEMARKS_BIND_ADDR", "0.0.0.0:9000"),
            ("IMAGEMARKS_DATA_DIR", "/srv/imagemarks"),
            ("IMAGEMARKS_REDIS_URL", "redis://cache:6379/0"),
            ("IMAGEMARKS_PAGE_SIZE", "20"),
        ]));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.database_path(), PathBuf::from("/srv/imagemarks/imagemarks.db"));
        assert_eq!(
            config.counters.backend,
            CounterBackend::Redis {
                url: "redis://cache:6379/0".into()
            }
        );
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("IMAGEMARKS_BIND_ADDR", "not-an-addr"),
            ("IMAGEMARKS_PAGE_SIZE", "0"),
            ("IMAGEMARKS_RANKING_SIZE", "ten"),
        ]));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.page_size, 8);
        assert_eq!(config.ranking_size, 10);
    }
}
