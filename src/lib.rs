//! KCache - A distributed in-process key-value cache node
//!
//! Each node keeps a bounded TTL-aware LRU store per named group and
//! routes misses for keys owned by other nodes over HTTP, using a
//! consistent-hash ring to pick the owner.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;

pub use api::{create_router, AppState};
pub use cache::{ByteView, ConcurrentCache, LruCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Getter, GetterFn, Group, GroupRegistry};
pub use peers::{HashRing, HttpGetter, HttpPool, PeerGetter, PeerPicker, PoolOptions};
