//! Peer HTTP client
//!
//! Client half of the peer protocol: `GET {base}{group}/{key}` against a
//! remote node, decoding the protobuf body.

use async_trait::async_trait;
use bytes::Bytes;
use prost::Message;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::models::{Request, Response};
use crate::peers::PeerGetter;

// == HTTP Getter ==
/// Fetches keys from a single remote node.
///
/// Timeouts come from the shared [`Client`]; an elapsed timeout is a
/// transport failure like any other.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    addr: String,
    /// Remote node address joined with the base path, e.g. `http://10.0.0.2:8001/_kcache/`
    base_url: String,
    client: Client,
}

impl HttpGetter {
    pub fn new(addr: impl Into<String>, base_path: &str, client: Client) -> Self {
        let addr = addr.into();
        let base_url = format!("{}{}", addr.trim_end_matches('/'), base_path);
        Self {
            addr,
            base_url,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL, percent-escaping both path segments.
    pub fn request_url(&self, request: &Request) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(&request.group),
            urlencoding::encode(&request.key)
        )
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    fn addr(&self) -> &str {
        &self.addr
    }

    async fn get(&self, request: &Request) -> Result<Response> {
        let url = self.request_url(request);
        debug!("Fetching {} from peer", url);

        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(CacheError::RemoteStatus(response.status().to_string()));
        }

        let body: Bytes = response.bytes().await?;
        Ok(Response::decode(body)?)
    }
}
