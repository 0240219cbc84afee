//! # SDK Error Types
//!
//! What the host application sees when an operation fails.
//!
//! ## Error Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SdkError Categories                              │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Validation    │  │ NotInitialized  │  │       NotFound          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  blank id       │  │  call before    │  │  PaywallNotFound        │ │
//! │  │  blank api key  │  │  activation     │  │  (promo variation)      │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │     Remote      │  │                 Internal                    │  │
//! │  │                 │  │                                             │  │
//! │  │  RemoteError    │  │  Store • Config • ChannelError •            │  │
//! │  │  (verbatim)     │  │  ShuttingDown • CommandTimedOut             │  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remote errors are delivered as the collaborator produced them. The SDK
//! never retries; [`SdkError::is_retryable`] only tells the caller whether a
//! retry could help.

use std::fmt;

use subkit_core::{CoreError, ValidationError};
use subkit_store::StoreError;
use thiserror::Error;

/// Result type alias for SDK operations.
pub type SdkResult<T> = Result<T, SdkError>;

// =============================================================================
// Remote Error
// =============================================================================

/// Failure category reported by a gateway or billing adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorCode {
    /// Transport failure (no response).
    Network,
    /// The backend answered with a non-success status.
    Server(u16),
    /// The platform billing library failed.
    Billing,
    /// The user cancelled the purchase flow.
    PurchaseCancelled,
    Unknown,
}

impl fmt::Display for RemoteErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErrorCode::Network => write!(f, "network"),
            RemoteErrorCode::Server(status) => write!(f, "server({})", status),
            RemoteErrorCode::Billing => write!(f, "billing"),
            RemoteErrorCode::PurchaseCancelled => write!(f, "purchase_cancelled"),
            RemoteErrorCode::Unknown => write!(f, "unknown"),
        }
    }
}

/// Opaque collaborator failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct RemoteError {
    pub code: RemoteErrorCode,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: RemoteErrorCode, message: impl Into<String>) -> Self {
        RemoteError {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::Network, message)
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::Server(status), message)
    }

    pub fn billing(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::Billing, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorCode::Unknown, message)
    }
}

// =============================================================================
// SDK Error
// =============================================================================

/// Coarse error category for host-side handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotInitialized,
    NotFound,
    Remote,
    Internal,
}

/// SDK error type covering all operation failures.
#[derive(Debug, Error)]
pub enum SdkError {
    /// A caller argument is invalid. Detected before any network call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The operation needs an activated SDK.
    #[error("Subkit is not activated. Call activate() first.")]
    NotInitialized,

    /// A promo targets a variation no paywall carries, even after a sync.
    #[error("Paywall not found for variation {variation_id}")]
    PaywallNotFound { variation_id: String },

    /// Gateway or billing failure, delivered verbatim.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// The command queue has been shut down.
    #[error("Subkit is shutting down")]
    ShuttingDown,

    /// A queued command exceeded the watchdog limit and was aborted.
    #[error("Command timed out after {secs} seconds")]
    CommandTimedOut { secs: u64 },
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for SdkError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::PaywallNotFound { variation_id } => SdkError::PaywallNotFound { variation_id },
            CoreError::Validation(e) => SdkError::Validation(e),
            CoreError::Malformed { .. } => SdkError::Remote(RemoteError::unknown(err.to_string())),
        }
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for SdkError {
    fn from(err: toml::de::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SdkError {
    fn from(err: toml::ser::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

impl From<url::ParseError> for SdkError {
    fn from(err: url::ParseError) -> Self {
        SdkError::Config(format!("Invalid base URL: {}", err))
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SdkError {
    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::Validation(_) => ErrorKind::Validation,
            SdkError::NotInitialized => ErrorKind::NotInitialized,
            SdkError::PaywallNotFound { .. } => ErrorKind::NotFound,
            SdkError::Remote(_) => ErrorKind::Remote,
            SdkError::Store(_)
            | SdkError::Config(_)
            | SdkError::ChannelError(_)
            | SdkError::ShuttingDown
            | SdkError::CommandTimedOut { .. } => ErrorKind::Internal,
        }
    }

    /// Returns true if the caller may reasonably retry the operation.
    ///
    /// ## Retryable Errors
    /// - Network failures
    /// - 5xx and 429 server responses
    /// - Watchdog timeouts
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Remote(remote) => match remote.code {
                RemoteErrorCode::Network => true,
                RemoteErrorCode::Server(status) => status >= 500 || status == 429,
                _ => false,
            },
            SdkError::CommandTimedOut { .. } => true,
            _ => false,
        }
    }

    /// Returns the remote error, if this is one.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            SdkError::Remote(remote) => Some(remote),
            _ => None,
        }
    }
}
