//! Group Module
//!
//! Named caches tying a local [`ConcurrentCache`], a user-supplied loader,
//! and the peer picker together, plus the registry the peer server uses to
//! resolve group names.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, ConcurrentCache};
use crate::error::{CacheError, Result};
use crate::models::Request;
use crate::peers::{PeerGetter, PeerPicker};

// == Getter ==
/// Loads a value from the source of truth when no node has it cached.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// Adapts a plain function or closure into a [`Getter`].
pub struct GetterFn<F>(pub F);

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> Result<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        (self.0)(key)
    }
}

// == Group ==
/// A named cache namespace.
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: ConcurrentCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
}

impl Group {
    // == Constructor ==
    /// Creates a group holding at most `capacity` entries locally, each
    /// expiring after `ttl` (zero = no expiry).
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        ttl: Duration,
        getter: Arc<dyn Getter>,
    ) -> Self {
        let main_cache = ConcurrentCache::new(capacity);
        if !ttl.is_zero() {
            main_cache.set_default_ttl(ttl);
        }

        Self {
            name: name.into(),
            getter,
            main_cache,
            peers: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Attaches the picker used to route misses to owning nodes.
    ///
    /// Can only be done once per group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::Internal(format!("peers already registered for group {}", self.name))
        })
    }

    // == Get ==
    /// Returns the value for `key`.
    ///
    /// Order: local cache, then the owning peer (if another node owns the
    /// key), then the local loader. A failed peer fetch falls back to the
    /// loader. Only locally loaded values are cached here.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::Internal("key is required".to_string()));
        }

        if let Some(value) = self.main_cache.get(key) {
            debug!("[KCache] hit {}/{}", self.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => return Ok(value),
                Err(err) => warn!("Failed to get {} from peer {}: {}", key, peer.addr(), err),
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let response = peer.get(&Request::new(self.name.as_str(), key)).await?;
        Ok(ByteView::from(response.value))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.getter.get(key).await?;
        let value = ByteView::from(bytes);
        self.main_cache.add(key, value.clone());
        Ok(value)
    }

    /// Counters of the local cache.
    pub fn stats(&self) -> CacheStats {
        self.main_cache.stats()
    }
}

// == Group Registry ==
/// All groups of one node, addressable by name.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a group, replacing any group of the same name.
    pub fn new_group<G>(
        &self,
        name: impl Into<String>,
        capacity: usize,
        ttl: Duration,
        getter: G,
    ) -> Arc<Group>
    where
        G: Getter + 'static,
    {
        let group = Arc::new(Group::new(name, capacity, ttl, Arc::new(getter)));
        self.groups
            .write()
            .insert(group.name().to_string(), Arc::clone(&group));
        group
    }

    /// Looks up a group by name.
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }
}
