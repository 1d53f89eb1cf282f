//! Error types for the cache server
//!
//! Provides unified error handling using thiserror. Every cache operation
//! returns a typed error; the `IntoResponse` impl maps the taxonomy to HTTP
//! status codes for the API layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No entry exists for the key, or it expired.
    #[error("entry not found")]
    NotFound,

    /// A shard cannot be built with a zero byte budget.
    #[error("shard size in bytes cannot be zero")]
    ZeroBytesShardSize,

    /// Header, key and value together do not fit one memory block.
    #[error("key, value and entry headers exceed the block size")]
    EntryTooBig,

    /// Key at or above the storage-layer key size limit.
    #[error("entry key too big")]
    EntryKeyTooBig,

    /// Value at or above the storage-layer value size limit.
    #[error("entry value too big")]
    EntryValueTooBig,

    /// A fragment of a large value is gone; the value is unreadable.
    #[error("fragment of the value could not be found")]
    FragmentMissing,

    /// Reassembled value length differs from the recorded total.
    #[error("invalid fragmented value length, want {want} got {got}")]
    BadLength { want: u64, got: u64 },

    /// Reassembled value hash differs from the recorded hash.
    #[error("invalid fragmented value hash, want {want} got {got}")]
    BadChecksum { want: u64, got: u64 },

    /// Rejected construction parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request data at the API layer.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound => StatusCode::NOT_FOUND,
            CacheError::EntryTooBig
            | CacheError::EntryKeyTooBig
            | CacheError::EntryValueTooBig
            | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::ZeroBytesShardSize
            | CacheError::FragmentMissing
            | CacheError::BadLength { .. }
            | CacheError::BadChecksum { .. }
            | CacheError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            CacheError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CacheError::EntryValueTooBig.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CacheError::InvalidRequest("empty key".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CacheError::FragmentMissing.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
