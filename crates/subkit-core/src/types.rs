//! # Domain Types
//!
//! Core domain types synchronized by the SDK.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   PurchaserInfo (snapshot)                       │  │
//! │  │  profile_id • customer_user_id                                   │  │
//! │  │                                                                  │  │
//! │  │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────┐ │  │
//! │  │  │  AccessLevel   │  │  Subscription  │  │  NonSubscription   │ │  │
//! │  │  │  "premium"     │  │  "monthly.9"   │  │  "coins.100"       │ │  │
//! │  │  │  is_active     │  │  expires_at    │  │  purchased_at      │ │  │
//! │  │  └────────────────┘  └────────────────┘  └────────────────────┘ │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    DataState    │   │ IamCredentials  │   │AttributionSource│       │
//! │  │  Cached         │   │  access_key_id  │   │  Adjust         │       │
//! │  │  Synced         │   │  secret_key     │   │  AppsFlyer      │       │
//! │  └─────────────────┘   │  session_token  │   │  Branch, Custom │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Equality
//! Listener notification is driven by `PartialEq` on [`PurchaserInfo`]. Every
//! field of every nested type participates in the derived comparison, and all
//! collections are `BTreeMap`s so that equality never depends on the order in
//! which the backend listed entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Data State
// =============================================================================

/// Tags a delivered value as coming from local cache or from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataState {
    /// Locally stored value, delivered before the remote call completes.
    Cached,
    /// Freshly server-confirmed value (or the failure of that attempt).
    Synced,
}

impl std::fmt::Display for DataState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataState::Cached => write!(f, "cached"),
            DataState::Synced => write!(f, "synced"),
        }
    }
}

// =============================================================================
// Access Level
// =============================================================================

/// A named entitlement ("premium", "pro") granted by one or more products.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessLevel {
    pub id: String,
    pub is_active: bool,
    pub vendor_product_id: String,
    /// Store the purchase was made in ("play_store", "app_store", ...).
    pub store: String,
    pub activated_at: Option<DateTime<Utc>>,
    pub renewed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_lifetime: bool,
    pub active_introductory_offer_type: Option<String>,
    pub active_promotional_offer_type: Option<String>,
    pub will_renew: bool,
    pub is_in_grace_period: bool,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub billing_issue_detected_at: Option<DateTime<Utc>>,
    pub vendor_transaction_id: Option<String>,
    pub cancellation_reason: Option<String>,
    pub is_refund: bool,
}

// =============================================================================
// Subscription
// =============================================================================

/// State of one auto-renewable subscription product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subscription {
    pub is_active: bool,
    pub vendor_product_id: String,
    pub store: String,
    pub activated_at: Option<DateTime<Utc>>,
    pub renewed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub is_lifetime: bool,
    pub active_introductory_offer_type: Option<String>,
    pub active_promotional_offer_type: Option<String>,
    pub will_renew: bool,
    pub is_in_grace_period: bool,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub billing_issue_detected_at: Option<DateTime<Utc>>,
    pub is_sandbox: bool,
    pub vendor_transaction_id: Option<String>,
    pub vendor_original_transaction_id: Option<String>,
    pub cancellation_reason: Option<String>,
    pub is_refund: bool,
}

// =============================================================================
// Non-Subscription
// =============================================================================

/// A one-time or consumable purchase.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NonSubscription {
    pub purchase_id: String,
    pub vendor_product_id: String,
    pub store: String,
    pub purchased_at: Option<DateTime<Utc>>,
    pub is_one_time: bool,
    pub is_sandbox: bool,
    pub vendor_transaction_id: Option<String>,
    pub is_refund: bool,
}

// =============================================================================
// Purchaser Info
// =============================================================================

/// Entitlement state of the current profile as of one synchronization point.
///
/// Produced either from a cached read or from a parsed remote response and
/// never mutated afterwards. Compared structurally to the previously cached
/// snapshot to decide whether listeners must be notified.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PurchaserInfo {
    pub profile_id: String,
    pub customer_user_id: Option<String>,
    /// Keyed by access level id.
    #[serde(default)]
    pub access_levels: BTreeMap<String, AccessLevel>,
    /// Keyed by vendor product id.
    #[serde(default)]
    pub subscriptions: BTreeMap<String, Subscription>,
    /// Keyed by vendor product id.
    #[serde(default)]
    pub non_subscriptions: BTreeMap<String, Vec<NonSubscription>>,
}

impl PurchaserInfo {
    /// Creates an empty snapshot for a profile.
    pub fn new(profile_id: impl Into<String>) -> Self {
        PurchaserInfo {
            profile_id: profile_id.into(),
            ..Default::default()
        }
    }

    /// Returns true if the named access level exists and is active.
    pub fn is_access_active(&self, access_level_id: &str) -> bool {
        self.access_levels
            .get(access_level_id)
            .map(|level| level.is_active)
            .unwrap_or(false)
    }

    /// Iterates over active access levels.
    pub fn active_access_levels(&self) -> impl Iterator<Item = &AccessLevel> {
        self.access_levels.values().filter(|level| level.is_active)
    }
}

// =============================================================================
// Profile
// =============================================================================

/// The identity the SDK currently operates as.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Server-assigned, stable identifier.
    pub profile_id: String,
    /// Caller-assigned identifier, if identified.
    pub customer_user_id: Option<String>,
}

// =============================================================================
// IAM Credentials
// =============================================================================

/// Short-lived credentials returned by the install-metadata sync.
///
/// Every field is optional: only the fields present in a response overwrite
/// what is stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IamCredentials {
    pub access_key_id: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
}

impl IamCredentials {
    /// Overlays the fields present in `update` onto `self`.
    pub fn merge(&self, update: &IamCredentials) -> IamCredentials {
        IamCredentials {
            access_key_id: update
                .access_key_id
                .clone()
                .or_else(|| self.access_key_id.clone()),
            secret_key: update.secret_key.clone().or_else(|| self.secret_key.clone()),
            session_token: update
                .session_token
                .clone()
                .or_else(|| self.session_token.clone()),
        }
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.access_key_id.is_none() && self.secret_key.is_none() && self.session_token.is_none()
    }
}

// =============================================================================
// Attribution Source
// =============================================================================

/// Attribution network an attribution payload comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionSource {
    Adjust,
    AppsFlyer,
    Branch,
    Custom,
}

impl std::fmt::Display for AttributionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributionSource::Adjust => write!(f, "adjust"),
            AttributionSource::AppsFlyer => write!(f, "appsflyer"),
            AttributionSource::Branch => write!(f, "branch"),
            AttributionSource::Custom => write!(f, "custom"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
