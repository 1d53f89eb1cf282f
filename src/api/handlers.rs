//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Cache values are
//! opaque bytes: PUT bodies are stored verbatim and GET responses return
//! the raw value bytes.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::debug;

use crate::api::validate::{validate_key, validate_value};
use crate::cache::{CacheOptions, CacheStats, CacheStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::HealthResponse;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The sharded cache; internally synchronised, so no outer lock is needed.
    pub cache: Arc<CacheStore>,
}

impl AppState {
    /// Creates a new AppState wrapping the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = CacheStore::new(CacheOptions {
            max_bytes: config.max_bytes,
            shards: config.shards,
            ttl_seconds: config.ttl_seconds,
            max_key_size: config.max_key_size,
            max_value_size: config.max_value_size,
            stats_enabled: config.stats_enabled,
            ..CacheOptions::default()
        })?;

        Ok(Self::new(cache))
    }
}

/// Handler for PUT /v1/kv/:key
///
/// Stores the raw request body under the key. Responds 201 with a Location
/// header pointing at the stored entry.
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    if let Some(msg) = validate_key(&key, state.cache.max_key_size()) {
        debug!(%msg, "rejected put");
        return Err(CacheError::InvalidRequest(msg));
    }

    if let Some(msg) = validate_value(&body, state.cache.max_value_size()) {
        debug!(%msg, "rejected put");
        return Err(CacheError::InvalidRequest(msg));
    }

    state.cache.set(key.as_bytes(), &body)?;
    debug!(%key, bytes = body.len(), "stored entry");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/v1/kv/{key}"))],
    ))
}

/// Handler for GET /v1/kv/:key
///
/// Returns the stored value bytes, or 404 when the key is missing or expired.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Vec<u8>> {
    if let Some(msg) = validate_key(&key, state.cache.max_key_size()) {
        debug!(%msg, "rejected get");
        return Err(CacheError::InvalidRequest(msg));
    }

    state.cache.get(key.as_bytes())
}

/// Handler for DELETE /v1/kv/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    if let Some(msg) = validate_key(&key, state.cache.max_key_size()) {
        debug!(%msg, "rejected delete");
        return Err(CacheError::InvalidRequest(msg));
    }

    state.cache.delete(key.as_bytes())?;

    Ok(StatusCode::OK)
}

/// Handler for GET /v1/stats
///
/// Returns an aggregated counter snapshot across all shards.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
