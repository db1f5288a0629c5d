//! Cache Module
//!
//! Local storage for one node: a TTL-aware LRU store and the thread-safe
//! wrapper each named group owns.

mod byteview;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use byteview::ByteView;
pub use entry::CacheEntry;
pub use lru::{LruCache, OnEvict};
pub use stats::CacheStats;
pub use store::ConcurrentCache;
