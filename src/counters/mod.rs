//! Counter store abstraction.
//!
//! A small key-value layer used only for counters:
//! - Plain integer counters (`INCRBY`-style)
//! - Sorted sets scored by cumulative increments (`ZINCRBY`/`ZREVRANGE`-style)
//!
//! Two backends are provided: an in-process memory store (default) and Redis.
//! The backend is built once at startup from [`CounterStoreConfig`] and shared
//! behind an `Arc<dyn CounterStore>`.

mod backend;
mod config;
mod memory;
mod redis_store;

pub use backend::{CounterError, CounterResult, CounterStore};
pub use config::{CounterBackend, CounterStoreConfig};
pub use memory::MemoryCounterStore;
pub use redis_store::RedisCounterStore;
