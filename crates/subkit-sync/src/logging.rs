//! # Logging
//!
//! Installs the `tracing` subscriber for the SDK and lets the host change the
//! verbosity at runtime.
//!
//! ```text
//!   RUST_LOG set?  ── yes ──► EnvFilter from RUST_LOG
//!        │ no
//!        ▼
//!   LogLevel::filter()   e.g. Info → "subkit=info,sqlx=warn"
//!        │
//!        ▼
//!   registry ─► reload::Layer<EnvFilter> ─► fmt::layer()
//!                      ▲
//!                      └── set_log_level() swaps the filter in place
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as fmt_layer, reload, EnvFilter, Registry};

/// Verbosity of SDK log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No output at all.
    None,
    #[default]
    Error,
    Warn,
    Info,
    /// Everything, including per-command tracing.
    Verbose,
}

impl LogLevel {
    /// Filter directive for this level.
    pub fn filter(&self) -> String {
        match self {
            LogLevel::None => "off".to_string(),
            LogLevel::Error => "subkit=error,sqlx=warn".to_string(),
            LogLevel::Warn => "subkit=warn,sqlx=warn".to_string(),
            LogLevel::Info => "subkit=info,sqlx=warn".to_string(),
            LogLevel::Verbose => "subkit=trace,sqlx=warn".to_string(),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::None => write!(f, "none"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Verbose => write!(f, "verbose"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(LogLevel::None),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "verbose" | "debug" | "trace" => Ok(LogLevel::Verbose),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `level` when set. Returns false if a global
/// subscriber was already installed (by the host or an earlier call).
pub fn init_logging(level: LogLevel) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.filter()));
    let (filter_layer, handle) = reload::Layer::new(filter);

    let installed = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer::layer())
        .try_init()
        .is_ok();

    if installed {
        let _ = FILTER_HANDLE.set(handle);
    }
    installed
}

/// Changes the verbosity of the SDK subscriber.
///
/// Installs the subscriber first if [`init_logging`] was never called.
pub fn set_log_level(level: LogLevel) {
    match FILTER_HANDLE.get() {
        Some(handle) => {
            if let Err(e) = handle.reload(EnvFilter::new(level.filter())) {
                warn!(error = %e, "Failed to change log level");
            }
        }
        None => {
            init_logging(level);
        }
    }
}
