//! # subkit-core: Pure Domain Logic for Subkit
//!
//! This crate holds the value types the SDK synchronizes and the pure rules
//! that operate on them. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Subkit Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host application                                │   │
//! │  │    activate ─► identify ─► get_paywalls ─► make_purchase        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      subkit-sync (CommandQueue, SyncEngine, Notifier)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ subkit-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  catalog  │  │   promo   │  │ validation│  │   │
//! │  │   │ Purchaser │  │  Paywall  │  │PromoOffer │  │   rules   │  │   │
//! │  │   │   Info    │  │  Product  │  │ matching  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                subkit-store (ProfileStore)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Purchaser info snapshot, data state, credentials, attribution
//! - [`catalog`] - Paywalls, products and the catalog merge
//! - [`promo`] - Promotional offers and variation matching
//! - [`profile`] - Profile attribute builder for `update_profile`
//! - [`error`] - Domain error types
//! - [`validation`] - Caller argument validation
//!
//! ## Example Usage
//!
//! ```rust
//! use subkit_core::catalog::{merge_containers, Paywall};
//!
//! let fresh = vec![Paywall::new("a", "va"), Paywall::new("b", "vb")];
//! let cached = vec![Paywall::new("b", "vb-old"), Paywall::new("c", "vc")];
//!
//! let merged = merge_containers(fresh, &cached);
//! let ids: Vec<_> = merged.iter().map(|p| p.developer_id.as_str()).collect();
//! assert_eq!(ids, ["a", "b", "c"]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod profile;
pub mod promo;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{BillingDetails, Paywall, PaywallCatalog, Product};
pub use error::{CoreError, CoreResult, ValidationError};
pub use profile::{Gender, ProfileAttributes, ProfileAttributesBuilder};
pub use promo::{PromoOffer, PromoType};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Value of the `source` key that marks a push payload as a promo notification.
pub const PROMO_NOTIFICATION_SOURCE: &str = "subkit";

/// Maximum length of a caller-assigned customer user id.
pub const MAX_CUSTOMER_USER_ID_LEN: usize = 255;
