//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /v1/kv/:key` - Store the raw request body under the key
//! - `GET /v1/kv/:key` - Retrieve the value bytes
//! - `DELETE /v1/kv/:key` - Delete a key
//! - `GET /v1/stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

mod validate;

pub use handlers::*;
pub use routes::create_router;
