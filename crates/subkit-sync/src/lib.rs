//! # subkit-sync: Command Queue and Sync Engine for Subkit
//!
//! This crate is the client SDK core: it orders every operation through a
//! single FIFO queue and reconciles locally cached state with the backend.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Subkit SDK Core                                │
//! │                                                                         │
//! │  Host application                                                       │
//! │       │  activate • identify • get_paywalls • make_purchase • ...       │
//! │       ▼                                                                 │
//! │  ┌──────────────┐   enqueue    ┌──────────────┐                         │
//! │  │   Subkit     │ ───────────► │ CommandQueue │  one command at a time  │
//! │  │  (client)    │              │   (actor)    │  optional watchdog      │
//! │  └──────┬───────┘              └──────┬───────┘                         │
//! │         │ Pending / Updates           │                                 │
//! │         ◄─────────────────────────────┤                                 │
//! │                                       ▼                                 │
//! │                               ┌──────────────┐                          │
//! │                               │  SyncEngine  │  cached → synced,        │
//! │                               │              │  change detection,       │
//! │                               │              │  catalog merge, promo    │
//! │                               └──┬───┬───┬───┘                          │
//! │                                  │   │   │                              │
//! │              ┌───────────────────┘   │   └──────────────────┐           │
//! │              ▼                       ▼                      ▼           │
//! │      ┌──────────────┐       ┌────────────────┐      ┌──────────────┐    │
//! │      │ ProfileStore │       │ RemoteGateway  │      │   Notifier   │    │
//! │      │ (subkit-     │       │ PurchaseAdapter│      │  listeners   │    │
//! │      │  store)      │       │ AnalyticsSink  │      │              │    │
//! │      └──────────────┘       └────────────────┘      └──────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`client`] - `Subkit` instance and builder
//! - [`queue`] - FIFO command queue actor
//! - [`delivery`] - `Pending` and `Updates` result channels
//! - [`gateway`] - Collaborator traits (backend, billing, analytics)
//! - [`notifier`] - Single-subscriber listeners
//! - [`purchase`] - Purchase and restore outcomes
//! - [`config`] - SDK configuration (TOML + env)
//! - [`logging`] - `tracing` subscriber setup
//! - [`error`] - SDK error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use subkit_sync::{SdkConfig, Subkit};
//!
//! let config = SdkConfig::load_or_default(None);
//! subkit_sync::init_logging(config.log_level());
//!
//! let subkit = Subkit::builder(config)
//!     .with_gateway(gateway)
//!     .with_purchase_adapter(billing)
//!     .build()
//!     .await?;
//! subkit.start();
//!
//! subkit.activate_from_config(None).await?;
//! let mut updates = subkit.get_purchaser_info();
//! while let Some(update) = updates.next().await {
//!     println!("{:?}: {:?}", update.state, update.value);
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod delivery;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod notifier;
pub mod purchase;
pub mod queue;

mod engine;
mod identity;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{Subkit, SubkitBuilder, PROMO_PUSH_OPENED_EVENT};
pub use config::{QueueSettings, SdkConfig, SdkSettings, StorageSettings};
pub use delivery::{Pending, Update, Updates};
pub use engine::ActivationState;
pub use error::{ErrorKind, RemoteError, RemoteErrorCode, SdkError, SdkResult};
pub use gateway::{
    AnalyticsSink, CreateProfileResponse, NoOpAnalytics, PaywallsResponse, PurchaseAdapter,
    PurchaseResponse, RemoteGateway, RemoteResult, RestoreResponse, SyncMetaInstallResponse,
    UpdateProfileResponse, ValidationResponse,
};
pub use logging::{init_logging, set_log_level, LogLevel};
pub use notifier::{PromoListener, PurchaserInfoListener};
pub use purchase::{PurchaseOutcome, RestoreOutcome};
