//! Peer Module
//!
//! Routing keys to owning nodes and fetching from them over HTTP.
//!
//! - [`HashRing`] decides which node owns a key
//! - [`HttpPool`] tracks the peer set and picks the owner's client
//! - [`HttpGetter`] fetches one key from one remote node

mod client;
mod consistent_hash;
mod pool;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Request, Response};

pub use client::HttpGetter;
pub use consistent_hash::{HashFn, HashRing};
pub use pool::{HttpPool, PoolOptions, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

// == Peer Getter ==
/// Fetches values from one remote node.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Address of the node this getter talks to.
    fn addr(&self) -> &str;

    /// Fetches `request.key` of `request.group` from the remote node.
    async fn get(&self, request: &Request) -> Result<Response>;
}

// == Peer Picker ==
/// Chooses the node that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owner's getter, or None when this node should serve
    /// the key itself (it owns the key, or no peers are known).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
