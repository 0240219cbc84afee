//! # Sync Engine
//!
//! Reconciles cached state with remote results. Every method here runs
//! inside a queue slot (or a background start-up leg) and talks to the
//! collaborators through their traits.
//!
//! ## Cached → Synced Delivery
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Read-style operation lifecycle                        │
//! │                                                                         │
//! │   slot starts                                                           │
//! │       │                                                                 │
//! │       ├── cache populated? ──► Update { value, Cached, None }   (≤ 1)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   RemoteGateway call                                                    │
//! │       │                                                                 │
//! │       ├── Ok(v)  ──► Update { Some(v), Synced, None }                  │
//! │       │              v != stored? ──► store + notify listener           │
//! │       │                                                                 │
//! │       └── Err(e) ──► Update { None, Synced, Some(e) }                  │
//! │                                                                         │
//! │   slot returns  ──► queue advances                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use subkit_core::catalog::{
    apply_billing_details, billing_product_ids, merge_containers, needs_enrichment,
};
use subkit_core::{Paywall, PaywallCatalog, PromoOffer, PurchaserInfo};
use subkit_store::ProfileStore;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::delivery::UpdateSender;
use crate::error::{SdkError, SdkResult};
use crate::gateway::{
    AnalyticsSink, PaywallsResponse, PurchaseAdapter, RemoteGateway, SyncMetaInstallResponse,
};
use crate::notifier::Notifier;

// =============================================================================
// Activation State
// =============================================================================

/// Lifecycle of an SDK instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Uninitialized,
    Activating,
    Active,
}

// =============================================================================
// Sync Engine
// =============================================================================

/// Shared state and collaborators behind every queued command.
pub(crate) struct SyncEngine {
    pub(crate) store: Arc<dyn ProfileStore>,
    pub(crate) gateway: Arc<dyn RemoteGateway>,
    pub(crate) purchases: Arc<dyn PurchaseAdapter>,
    pub(crate) analytics: Arc<dyn AnalyticsSink>,
    pub(crate) notifier: Arc<Notifier>,
    current_promo: Mutex<Option<PromoOffer>>,
    activation: RwLock<ActivationState>,
    /// Set the first time the instance reaches `Active`.
    ever_active: AtomicBool,
}

impl SyncEngine {
    pub(crate) fn new(
        store: Arc<dyn ProfileStore>,
        gateway: Arc<dyn RemoteGateway>,
        purchases: Arc<dyn PurchaseAdapter>,
        analytics: Arc<dyn AnalyticsSink>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            store,
            gateway,
            purchases,
            analytics,
            notifier,
            current_promo: Mutex::new(None),
            activation: RwLock::new(ActivationState::Uninitialized),
            ever_active: AtomicBool::new(false),
        }
    }

    // =========================================================================
    // Activation state
    // =========================================================================

    pub(crate) async fn activation_state(&self) -> ActivationState {
        *self.activation.read().await
    }

    pub(crate) async fn set_activation(&self, state: ActivationState) {
        if state == ActivationState::Active {
            self.ever_active.store(true, Ordering::Release);
        }
        let mut current = self.activation.write().await;
        if *current != state {
            debug!(from = ?*current, to = ?state, "Activation state changed");
            *current = state;
        }
    }

    /// Returns true once any activation has completed, even if a later
    /// logout left the instance `Uninitialized`.
    pub(crate) fn has_been_active(&self) -> bool {
        self.ever_active.load(Ordering::Acquire)
    }

    /// Moves `Uninitialized` to `Activating`. Returns false in any other state.
    pub(crate) async fn begin_activation(&self) -> bool {
        let mut current = self.activation.write().await;
        if *current != ActivationState::Uninitialized {
            return false;
        }
        *current = ActivationState::Activating;
        true
    }

    /// Returns the current profile id, or `NotInitialized` if the SDK is not
    /// active.
    pub(crate) async fn ensure_active(&self) -> SdkResult<String> {
        if self.activation_state().await != ActivationState::Active {
            return Err(SdkError::NotInitialized);
        }
        self.store.profile_id().await?.ok_or(SdkError::NotInitialized)
    }

    // =========================================================================
    // Purchaser info
    // =========================================================================

    /// Cached purchaser info. A corrupt snapshot reads as absent.
    pub(crate) async fn cached_purchaser_info(&self) -> Option<PurchaserInfo> {
        self.store.purchaser_info().await.unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable purchaser info cache");
            None
        })
    }

    /// Stores `info` and notifies the listener if it differs from the
    /// stored snapshot. Returns whether it changed.
    pub(crate) async fn apply_purchaser_info(&self, info: &PurchaserInfo) -> SdkResult<bool> {
        if self.cached_purchaser_info().await.as_ref() == Some(info) {
            debug!(profile_id = %info.profile_id, "Purchaser info unchanged");
            return Ok(false);
        }

        self.store.set_purchaser_info(info).await?;
        info!(profile_id = %info.profile_id, "Purchaser info updated");
        self.notifier.purchaser_info_changed(info);
        Ok(true)
    }

    /// Same as [`apply_purchaser_info`](Self::apply_purchaser_info) for
    /// callers that cannot surface a store failure.
    pub(crate) async fn apply_purchaser_info_logged(&self, info: &PurchaserInfo) {
        if let Err(e) = self.apply_purchaser_info(info).await {
            warn!(error = %e, "Failed to store purchaser info");
        }
    }

    /// Fetches purchaser info remotely and applies it.
    pub(crate) async fn fetch_purchaser_info(&self, profile_id: &str) -> SdkResult<PurchaserInfo> {
        let info = self.gateway.get_purchaser_info(profile_id).await?;
        self.apply_purchaser_info_logged(&info).await;
        Ok(info)
    }

    /// `get_purchaser_info` slot body.
    pub(crate) async fn purchaser_info_updates(&self, tx: UpdateSender<PurchaserInfo>) {
        let profile_id = match self.ensure_active().await {
            Ok(id) => id,
            Err(e) => return tx.failed(e),
        };

        if let Some(cached) = self.cached_purchaser_info().await {
            tx.cached(cached);
        }

        match self.gateway.get_purchaser_info(&profile_id).await {
            Ok(info) => {
                tx.synced(Some(info.clone()), None);
                self.apply_purchaser_info_logged(&info).await;
            }
            Err(e) => tx.failed(e.into()),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    async fn cached_paywalls(&self) -> Vec<Paywall> {
        self.store.paywalls().await.unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable paywall cache");
            Vec::new()
        })
    }

    /// Fetches the remote catalog, enriches it with billing details and
    /// merges it into the cache.
    ///
    /// Always yields a catalog for delivery; the error (if any) goes
    /// alongside it. The cache is only written on success.
    pub(crate) async fn refresh_catalog(&self, profile_id: &str) -> (PaywallCatalog, Option<SdkError>) {
        let PaywallsResponse { paywalls, products } = match self.gateway.get_paywalls(profile_id).await {
            Ok(response) => response,
            Err(e) => return (PaywallCatalog::default(), Some(e.into())),
        };

        if !needs_enrichment(&paywalls, &products) {
            debug!(paywalls = paywalls.len(), "No products to enrich, caching remote catalog");
            let catalog = PaywallCatalog::new(paywalls, products);
            let error = self.store.set_catalog(&catalog).await.err().map(SdkError::from);
            return (catalog, error);
        }

        let product_ids = billing_product_ids(&paywalls, &products);
        let details = match self.purchases.billing_details(&product_ids).await {
            Ok(details) => details,
            Err(e) => {
                warn!(error = %e, "Billing details query failed");
                return (PaywallCatalog::new(paywalls, products), Some(e.into()));
            }
        };

        let (enriched, products) = apply_billing_details(&paywalls, &products, &details);
        let cached = self.cached_paywalls().await;
        let catalog = PaywallCatalog::new(merge_containers(enriched, &cached), products);

        debug!(
            paywalls = catalog.paywalls.len(),
            products = catalog.products.len(),
            "Catalog merged"
        );
        let error = self.store.set_catalog(&catalog).await.err().map(SdkError::from);
        (catalog, error)
    }

    /// `get_paywalls` slot body.
    pub(crate) async fn paywall_updates(&self, tx: UpdateSender<PaywallCatalog>) {
        let profile_id = match self.ensure_active().await {
            Ok(id) => id,
            Err(e) => return tx.failed(e),
        };

        match self.store.catalog().await {
            Ok(Some(cached)) => tx.cached(cached),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable catalog cache"),
        }

        let (catalog, error) = self.refresh_catalog(&profile_id).await;
        tx.synced(Some(catalog), error);
    }

    // =========================================================================
    // Promo
    // =========================================================================

    /// Fetches the current promo and matches it to a paywall.
    ///
    /// Matches against the cached containers first; only when that fails is
    /// one catalog refresh run. `Ok(None)` means no promo is targeted at the
    /// profile.
    pub(crate) async fn resolve_promo(&self, profile_id: &str) -> SdkResult<Option<PromoOffer>> {
        let promo = match self.gateway.get_promo(profile_id).await? {
            Some(promo) => promo,
            None => return Ok(None),
        };

        let resolved = match promo.resolve(&self.cached_paywalls().await) {
            Some(resolved) => resolved,
            None => {
                debug!(variation_id = %promo.variation_id, "Promo not in cache, refreshing catalog");
                let (catalog, error) = self.refresh_catalog(profile_id).await;
                if let Some(e) = error {
                    return Err(e);
                }
                promo
                    .resolve(&catalog.paywalls)
                    .ok_or_else(|| SdkError::PaywallNotFound {
                        variation_id: promo.variation_id.clone(),
                    })?
            }
        };

        self.publish_promo(&resolved).await;
        Ok(Some(resolved))
    }

    /// Replaces the current promo and notifies if it changed.
    async fn publish_promo(&self, promo: &PromoOffer) {
        {
            let mut current = self.current_promo.lock().await;
            if current.as_ref() == Some(promo) {
                return;
            }
            *current = Some(promo.clone());
        }
        info!(variation_id = %promo.variation_id, "Promo received");
        self.notifier.promo_received(promo);
    }

    pub(crate) async fn current_promo(&self) -> Option<PromoOffer> {
        self.current_promo.lock().await.clone()
    }

    pub(crate) async fn clear_current_promo(&self) {
        *self.current_promo.lock().await = None;
    }

    /// `get_promo` slot body.
    pub(crate) async fn promo_updates(&self, tx: UpdateSender<PromoOffer>) {
        let profile_id = match self.ensure_active().await {
            Ok(id) => id,
            Err(e) => return tx.failed(e),
        };

        if let Some(current) = self.current_promo().await {
            tx.cached(current);
        }

        match self.resolve_promo(&profile_id).await {
            Ok(promo) => tx.synced(promo, None),
            Err(e) => tx.failed(e),
        }
    }

    // =========================================================================
    // Install metadata
    // =========================================================================

    /// Syncs install metadata. Failures are logged and otherwise ignored.
    pub(crate) async fn sync_meta_install(&self) {
        let profile_id = match self.store.profile_id().await {
            Ok(Some(id)) => id,
            Ok(None) => return,
            Err(e) => {
                debug!(error = %e, "Skipping install metadata sync");
                return;
            }
        };
        let installation_id = match self.store.installation_id().await {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "Skipping install metadata sync");
                return;
            }
        };

        match self.gateway.sync_meta_install(&profile_id, &installation_id).await {
            Ok(response) => {
                if let Err(e) = self.persist_meta_install(&profile_id, response).await {
                    debug!(error = %e, "Failed to store install metadata");
                }
            }
            Err(e) => debug!(error = %e, "Install metadata sync failed"),
        }
    }

    async fn persist_meta_install(
        &self,
        profile_id: &str,
        response: SyncMetaInstallResponse,
    ) -> SdkResult<()> {
        if !response.iam_credentials.is_empty() {
            let stored = self.store.iam_credentials().await?;
            self.store
                .set_iam_credentials(&stored.merge(&response.iam_credentials))
                .await?;
        }

        if let Some(id) = response.profile_id.filter(|id| !id.is_empty() && id != profile_id) {
            info!(profile_id = %id, "Profile id reassigned by install sync");
            self.store.set_profile_id(&id).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Background start-up legs
    // =========================================================================

    pub(crate) async fn prefetch_paywalls(&self) {
        let Ok(Some(profile_id)) = self.store.profile_id().await else {
            return;
        };
        if let (_, Some(e)) = self.refresh_catalog(&profile_id).await {
            debug!(error = %e, "Paywall prefetch failed");
        }
    }

    pub(crate) async fn prefetch_promo(&self) {
        let Ok(Some(profile_id)) = self.store.profile_id().await else {
            return;
        };
        if let Err(e) = self.resolve_promo(&profile_id).await {
            debug!(error = %e, "Promo prefetch failed");
        }
    }

    /// Full start-up sync after a fresh profile was created.
    pub(crate) fn spawn_startup_sync(self: &Arc<Self>) {
        let engine = self.clone();
        tokio::spawn(async move {
            tokio::join!(
                engine.prefetch_paywalls(),
                engine.prefetch_promo(),
                engine.sync_meta_install(),
                engine.restore_in_background(),
            );
            debug!("Start-up sync finished");
        });
    }
}
