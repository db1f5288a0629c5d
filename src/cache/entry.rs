//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with deadline support.

use std::time::{Duration, Instant};

use crate::cache::ByteView;

// == Cache Entry ==
/// A single stored value together with its key and optional deadline.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The key this entry is indexed under
    pub key: String,
    /// The stored value
    pub value: ByteView,
    /// Absolute expiration instant, None = never expires via TTL
    pub deadline: Option<Instant>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now, or never if `ttl` is None.
    pub fn new(key: String, value: ByteView, ttl: Option<Duration>) -> Self {
        Self {
            key,
            value,
            deadline: deadline_after(ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current instant is strictly after its
    /// deadline. Entries without a deadline never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) => now > deadline,
            None => false,
        }
    }

}

// == Utility Functions ==
/// Converts a relative TTL into an absolute deadline.
///
/// A TTL too large to represent as an instant yields no deadline.
pub fn deadline_after(ttl: Option<Duration>) -> Option<Instant> {
    ttl.and_then(|ttl| Instant::now().checked_add(ttl))
}
