//! Response models for the cache server API
//!
//! Values travel as raw bytes; only stats, health and errors are JSON.

pub mod responses;

// Re-export commonly used types
pub use responses::{ErrorResponse, HealthResponse};
