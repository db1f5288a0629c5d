//! API Handlers
//!
//! Server half of the peer protocol: answers
//! `GET {base_path}{group}/{key}` with a protobuf-encoded value.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Uri},
    response::IntoResponse,
};
use prost::Message;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::Response;
use crate::peers::HttpPool;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Peer registry; also supplies this node's address and base path
    pub pool: Arc<HttpPool>,
    /// Groups this node can serve
    pub groups: Arc<GroupRegistry>,
}

impl AppState {
    pub fn new(pool: Arc<HttpPool>, groups: Arc<GroupRegistry>) -> Self {
        Self { pool, groups }
    }
}

/// Handler for every path under the base path.
///
/// - wrong prefix or segment count: 400
/// - unknown group: 404 `no such group: <name>`
/// - load failure: 500 with the error message
pub async fn peer_handler(State(state): State<AppState>, uri: Uri) -> Result<impl IntoResponse> {
    let path = uri.path();
    debug!("[Server {}] GET {}", state.pool.self_addr(), path);

    let rest = path
        .strip_prefix(state.pool.base_path())
        .ok_or_else(|| CacheError::MalformedRequest(format!("unexpected path: {}", path)))?;
    let (group_name, key) = split_group_key(rest)?;

    let group = state
        .groups
        .get(&group_name)
        .ok_or_else(|| CacheError::NotFound(format!("no such group: {}", group_name)))?;

    let view = group.get(&key).await?;
    let body = Response {
        value: view.into_bytes(),
    }
    .encode_to_vec();

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], body))
}

/// Splits `<group>/<key>` at the first `/` and percent-decodes both parts.
/// The key may itself contain `/`.
fn split_group_key(rest: &str) -> Result<(String, String)> {
    let mut parts = rest.splitn(2, '/');
    let (Some(group), Some(key)) = (parts.next(), parts.next()) else {
        return Err(CacheError::MalformedRequest(
            "expected <group>/<key>".to_string(),
        ));
    };

    Ok((decode_segment(group)?, decode_segment(key)?))
}

fn decode_segment(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| CacheError::MalformedRequest(format!("invalid escape in {}", segment)))
}
