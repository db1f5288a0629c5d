//! Error types for the cache node
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache node.
///
/// The three peer-fetch failures (`Transport`, `RemoteStatus`, `Decode`)
/// stay distinct so the caller can choose between another peer and a
/// local load.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Named group is not registered on this node
    #[error("{0}")]
    NotFound(String),

    /// Request path does not have the `<base><group>/<key>` shape
    #[error("bad request: {0}")]
    MalformedRequest(String),

    /// Peer could not be reached, timed out, or the body could not be read
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Peer answered with a non-success status
    #[error("server returned {0}")]
    RemoteStatus(String),

    /// Peer body is not a valid response message
    #[error("decoding response body: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Local lookup, load, or encoding failure
    #[error("{0}")]
    Internal(String),
}

impl CacheError {
    // == Status Mapping ==
    /// HTTP status the peer server answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        // `String` bodies are served as text/plain; charset=utf-8
        (self.status_code(), self.to_string()).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (
                CacheError::MalformedRequest("path".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CacheError::NotFound("no such group: g".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                CacheError::RemoteStatus("502 Bad Gateway".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CacheError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[tokio::test]
    async fn test_error_body_is_plain_text_message() {
        let response = CacheError::NotFound("no such group: scores".to_string()).into_response();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/plain"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"no such group: scores");
    }

    #[test]
    fn test_decode_error_converts() {
        use prost::Message;

        // A lone tag byte with no payload is a truncated message
        let decode_err = crate::models::Response::decode(&[0x0a_u8][..]).unwrap_err();
        let err: CacheError = decode_err.into();
        assert!(matches!(err, CacheError::Decode(_)));
        assert!(err.to_string().starts_with("decoding response body"));
    }
}
