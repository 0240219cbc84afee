//! # Validation Module
//!
//! Caller argument validation. Runs before anything is queued to the network.
//!
//! ## Usage
//! ```rust
//! use subkit_core::validation::{validate_api_key, validate_customer_user_id};
//!
//! assert!(validate_customer_user_id("user-42").is_ok());
//! assert!(validate_customer_user_id("   ").is_err());
//! assert!(validate_api_key("public_live_abc").is_ok());
//! ```

use crate::error::ValidationError;
use crate::MAX_CUSTOMER_USER_ID_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a caller-assigned customer user id.
///
/// ## Rules
/// - Must not be blank
/// - At most 255 characters
pub fn validate_customer_user_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("customer_user_id"));
    }

    if id.chars().count() > MAX_CUSTOMER_USER_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "customer_user_id".to_string(),
            max: MAX_CUSTOMER_USER_ID_LEN,
        });
    }

    Ok(())
}

/// Validates the public SDK key passed to `activate`.
pub fn validate_api_key(key: &str) -> ValidationResult<()> {
    if key.trim().is_empty() {
        return Err(ValidationError::required("api_key"));
    }

    if key.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "api_key".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a push token before it is handed to the gateway.
pub fn validate_push_token(token: &str) -> ValidationResult<()> {
    if token.trim().is_empty() {
        return Err(ValidationError::required("push_token"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
