//! # Collaborator Interfaces
//!
//! Traits the host application implements to connect the SDK to its backend,
//! its platform billing library and its analytics pipeline.
//!
//! ## Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Collaborator Boundaries                           │
//! │                                                                         │
//! │   SyncEngine                                                           │
//! │       │                                                                 │
//! │       ├──► RemoteGateway     create_profile • get_purchaser_info       │
//! │       │    (backend)         get_paywalls • get_promo                  │
//! │       │                      update_profile • update_attribution       │
//! │       │                      sync_meta_install • set_push_token        │
//! │       │                                                                 │
//! │       ├──► PurchaseAdapter   purchase (+ validation) • restore         │
//! │       │    (platform billing) billing_details                          │
//! │       │                                                                 │
//! │       └──► AnalyticsSink     track_event                               │
//! │            (fire-and-forget)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timeouts, retries, request signing and wire formats all belong to the
//! implementations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use subkit_core::{
    AttributionSource, BillingDetails, IamCredentials, Paywall, Product, ProfileAttributes,
    PromoOffer, PurchaserInfo,
};

use crate::error::RemoteError;

/// Result type for collaborator calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

// =============================================================================
// Response Types
// =============================================================================

/// Response to profile creation (first activation or identify).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProfileResponse {
    pub profile_id: String,
    pub customer_user_id: Option<String>,
    pub purchaser_info: PurchaserInfo,
}

/// Remote paywall configuration before billing enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaywallsResponse {
    pub paywalls: Vec<Paywall>,
    pub products: Vec<Product>,
}

/// Response to a profile attribute update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileResponse {
    /// Profile id as seen by the backend. Empty if not reported.
    pub profile_id: String,
}

/// Response to the install-metadata sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetaInstallResponse {
    pub iam_credentials: IamCredentials,
    pub profile_id: Option<String>,
}

/// Server-side validation of one purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub purchaser_info: PurchaserInfo,
    /// Raw validation result as returned by the backend.
    pub validation_result: serde_json::Value,
}

/// Outcome of the platform purchase flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub purchase_token: String,
    /// `None` when the purchase went through but validation did not.
    pub validation: Option<ValidationResponse>,
}

/// Server-side validation of all restored purchases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreResponse {
    pub purchaser_info: PurchaserInfo,
    pub validation_results: Vec<serde_json::Value>,
}

// =============================================================================
// Remote Gateway
// =============================================================================

/// Request/response operations against the subscription backend.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Creates a profile, or identifies an existing one when
    /// `customer_user_id` is known to the backend.
    async fn create_profile(
        &self,
        customer_user_id: Option<&str>,
    ) -> RemoteResult<CreateProfileResponse>;

    async fn get_purchaser_info(&self, profile_id: &str) -> RemoteResult<PurchaserInfo>;

    async fn get_paywalls(&self, profile_id: &str) -> RemoteResult<PaywallsResponse>;

    /// Returns the promo currently targeted at the profile, if any.
    async fn get_promo(&self, profile_id: &str) -> RemoteResult<Option<PromoOffer>>;

    async fn update_profile(
        &self,
        profile_id: &str,
        attributes: &ProfileAttributes,
    ) -> RemoteResult<UpdateProfileResponse>;

    async fn update_attribution(
        &self,
        profile_id: &str,
        payload: &serde_json::Value,
        source: AttributionSource,
        network_user_id: Option<&str>,
    ) -> RemoteResult<()>;

    async fn sync_meta_install(
        &self,
        profile_id: &str,
        installation_id: &str,
    ) -> RemoteResult<SyncMetaInstallResponse>;

    /// Stores the push token for subsequent install-metadata syncs.
    fn set_push_token(&self, token: &str);

    /// Receives the public SDK key on activation.
    fn set_api_key(&self, _api_key: &str) {}
}

// =============================================================================
// Purchase Adapter
// =============================================================================

/// Platform billing operations.
#[async_trait]
pub trait PurchaseAdapter: Send + Sync {
    /// Runs the platform purchase flow and validates the result server-side.
    async fn purchase(&self, product: &Product) -> RemoteResult<PurchaseResponse>;

    /// Restores all owned purchases and validates them server-side.
    ///
    /// `Ok(None)` means the validation payload was missing.
    async fn restore(&self) -> RemoteResult<Option<RestoreResponse>>;

    /// Queries price/currency metadata, keyed by vendor product id.
    async fn billing_details(
        &self,
        product_ids: &[String],
    ) -> RemoteResult<BTreeMap<String, BillingDetails>>;
}

// =============================================================================
// Analytics Sink
// =============================================================================

/// Receives analytics events (implemented by the host's analytics pipeline).
pub trait AnalyticsSink: Send + Sync {
    fn track_event(&self, name: &str, params: &BTreeMap<String, String>);
}

/// No-op analytics sink.
pub struct NoOpAnalytics;

impl AnalyticsSink for NoOpAnalytics {
    fn track_event(&self, _name: &str, _params: &BTreeMap<String, String>) {}
}
