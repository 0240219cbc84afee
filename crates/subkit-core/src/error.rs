//! # Error Types
//!
//! Domain-specific error types for subkit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  subkit-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - Caller argument failures                       │
//! │                                                                         │
//! │  subkit-store errors (separate crate)                                  │
//! │  └── StoreError       - Persistence failures                           │
//! │                                                                         │
//! │  subkit-sync errors                                                    │
//! │  └── SdkError         - What the host application sees                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SdkError → caller result          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No paywall carries the requested variation.
    ///
    /// ## When This Occurs
    /// - A promo targets a variation that is absent from the cached catalog
    ///   AND from the freshly synced catalog
    #[error("Paywall not found for variation {variation_id}")]
    PaywallNotFound { variation_id: String },

    /// A cached or remote payload could not be interpreted.
    #[error("Malformed {entity}: {reason}")]
    Malformed { entity: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Caller argument validation errors.
///
/// Detected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} should not be empty")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. a bad URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
