//! Request Validation
//!
//! Soft caps applied to request keys and values before they reach the
//! cache core. The core enforces its own hard limits; these checks exist
//! to reject bad requests with a 400 instead of a storage error.

/// Validates a request key against the configured cap.
///
/// Returns an error message if validation fails, None if valid.
pub(crate) fn validate_key(key: &str, max: usize) -> Option<String> {
    if key.is_empty() {
        return Some("empty key".to_string());
    }

    if key.len() >= max {
        return Some(format!(
            "entry key size {} is bigger than max key size in bytes {}",
            key.len(),
            max
        ));
    }

    None
}

/// Validates a request value against the configured cap.
pub(crate) fn validate_value(value: &[u8], max: usize) -> Option<String> {
    if value.is_empty() {
        return Some("value is empty".to_string());
    }

    if value.len() >= max {
        return Some(format!(
            "entry value size {} is bigger than max value size in bytes {}",
            value.len(),
            max
        ));
    }

    None
}
