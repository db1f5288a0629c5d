//! Configuration Module
//!
//! Handles loading node configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::peers::{DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// This node's address as peers reach it, e.g. `http://10.0.0.1:8001`
    pub self_addr: String,
    /// Every node in the cluster, this one included
    pub peers: Vec<String>,
    /// Path prefix for peer requests
    pub base_path: String,
    /// Virtual points per peer on the hash ring
    pub replicas: usize,
    /// Maximum entries held by the local group cache
    pub max_entries: usize,
    /// TTL for locally loaded entries (zero = no expiry)
    pub default_ttl: Duration,
    /// Upper bound on a single peer fetch
    pub peer_timeout: Duration,
    /// Name of the group this node serves
    pub group_name: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SELF_ADDR` - Own address (default: http://127.0.0.1:8001)
    /// - `PEERS` - Comma-separated node addresses (default: SELF_ADDR)
    /// - `BASE_PATH` - Peer path prefix (default: /_kcache/)
    /// - `REPLICAS` - Virtual points per peer (default: 50)
    /// - `MAX_ENTRIES` - Local cache capacity (default: 1000)
    /// - `DEFAULT_TTL_MS` - Entry TTL in milliseconds (default: 5000)
    /// - `PEER_TIMEOUT_MS` - Peer fetch timeout in milliseconds (default: 3000)
    /// - `GROUP_NAME` - Served group (default: scores)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let self_addr = env::var("SELF_ADDR").unwrap_or(defaults.self_addr);
        let peers = env::var("PEERS")
            .ok()
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_addr.clone()]);

        Self {
            self_addr,
            peers,
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            replicas: parse_var("REPLICAS").unwrap_or(defaults.replicas),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_ttl: parse_var("DEFAULT_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_ttl),
            peer_timeout: parse_var("PEER_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.peer_timeout),
            group_name: env::var("GROUP_NAME").unwrap_or(defaults.group_name),
        }
    }

    /// Address to bind the peer server to: `self_addr` without its scheme.
    pub fn listen_addr(&self) -> &str {
        self.self_addr
            .strip_prefix("http://")
            .or_else(|| self.self_addr.strip_prefix("https://"))
            .unwrap_or(&self.self_addr)
            .trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        let self_addr = "http://127.0.0.1:8001".to_string();
        Self {
            peers: vec![self_addr.clone()],
            self_addr,
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            max_entries: 1000,
            default_ttl: Duration::from_secs(5),
            peer_timeout: Duration::from_secs(3),
            group_name: "scores".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_peers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}
