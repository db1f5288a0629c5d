//! Peer wire messages
//!
//! Protobuf messages exchanged between cache nodes:
//!
//! ```text
//! message Request  { string group = 1; string key = 2; }
//! message Response { bytes value = 1; }
//! ```
//!
//! Group and key travel in the URL path; `Request` carries them on the
//! client side.

use bytes::Bytes;
use prost::Message;

/// Logical peer request for one key of one group.
#[derive(Clone, PartialEq, Message)]
pub struct Request {
    #[prost(string, tag = "1")]
    pub group: String,
    #[prost(string, tag = "2")]
    pub key: String,
}

impl Request {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

/// Peer response body carrying the cached bytes.
#[derive(Clone, PartialEq, Message)]
pub struct Response {
    #[prost(bytes = "bytes", tag = "1")]
    pub value: Bytes,
}
