//! Peer Pool
//!
//! Registry of known peers: one consistent-hash ring plus one HTTP client
//! per peer address, guarded by a single lock. The lock covers membership
//! changes and the ring lookup in [`PeerPicker::pick_peer`], never the
//! network call itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::Result;
use crate::peers::{HashRing, HttpGetter, PeerGetter, PeerPicker};

/// Path prefix under which nodes serve each other.
pub const DEFAULT_BASE_PATH: &str = "/_kcache/";

/// Virtual points per peer.
pub const DEFAULT_REPLICAS: usize = 50;

// == Pool Options ==
/// Tuning for an [`HttpPool`].
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Path prefix, normalized to start and end with `/`
    pub base_path: String,
    /// Virtual points per peer on the ring
    pub replicas: usize,
    /// Upper bound on a whole peer fetch
    pub timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Default)]
struct Membership {
    ring: Option<HashRing>,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// Peer registry and picker for one node.
///
/// After every membership call the set of peers on the ring equals the
/// set of peers with a client.
#[derive(Debug)]
pub struct HttpPool {
    /// This node's own address, e.g. `http://10.0.0.1:8001`
    self_addr: String,
    base_path: String,
    replicas: usize,
    client: Client,
    membership: Mutex<Membership>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for `self_addr` with default options.
    pub fn new(self_addr: impl Into<String>) -> Result<Self> {
        Self::with_options(self_addr, PoolOptions::default())
    }

    pub fn with_options(self_addr: impl Into<String>, options: PoolOptions) -> Result<Self> {
        let client = Client::builder().timeout(options.timeout).build()?;

        Ok(Self {
            self_addr: self_addr.into(),
            base_path: normalize_base_path(&options.base_path),
            replicas: options.replicas,
            client,
            membership: Mutex::new(Membership::default()),
        })
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn getter_for(&self, peer: &str) -> Arc<HttpGetter> {
        Arc::new(HttpGetter::new(peer, &self.base_path, self.client.clone()))
    }

    // == Reset Peers ==
    /// Replaces the whole peer set.
    pub fn reset_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();

        let mut ring = HashRing::new(self.replicas, None);
        ring.add(&peers);
        let getters = peers
            .iter()
            .map(|peer| (peer.clone(), self.getter_for(peer)))
            .collect();

        let mut membership = self.membership.lock();
        membership.ring = Some(ring);
        membership.getters = getters;
        info!("Peer set reset to {:?}", peers);
    }

    // == Add Peers ==
    /// Adds peers, replacing the client of any peer already known.
    pub fn add_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();

        let mut membership = self.membership.lock();
        membership
            .ring
            .get_or_insert_with(|| HashRing::new(self.replicas, None))
            .add(&peers);
        for peer in &peers {
            membership
                .getters
                .insert(peer.clone(), self.getter_for(peer));
        }
        info!("Added peers {:?}", peers);
    }

    // == Remove Peers ==
    /// Drops peers from the ring and forgets their clients.
    ///
    /// Does nothing if no peers were ever registered.
    pub fn remove_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();

        let mut membership = self.membership.lock();
        let Some(ring) = membership.ring.as_mut() else {
            return;
        };
        ring.delete(&peers);
        for peer in &peers {
            membership.getters.remove(peer);
        }
        info!("Removed peers {:?}", peers);
    }

    /// Number of peers with a client, this node included if registered.
    pub fn peer_count(&self) -> usize {
        self.membership.lock().getters.len()
    }
}

impl PeerPicker for HttpPool {
    // == Pick Peer ==
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let membership = self.membership.lock();
        let owner = membership.ring.as_ref()?.get(key)?;

        if owner == self.self_addr {
            return None;
        }

        let getter = membership.getters.get(owner)?;
        debug!("[Server {}] Pick peer {} for key {}", self.self_addr, owner, key);
        Some(Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}

/// Ensures the prefix starts and ends with `/`.
fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}
