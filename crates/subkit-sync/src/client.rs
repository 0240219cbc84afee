//! # Subkit Client
//!
//! The public entry point. One [`Subkit`] value is one SDK instance: it owns
//! the command queue and the sync engine, and every public operation is
//! submitted through it.
//!
//! ## Operation Routing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Subkit                                        │
//! │                                                                         │
//! │  Queued (FIFO, one at a time)        Not queued                         │
//! │  ─────────────────────────────       ──────────                         │
//! │  activate          → Pending<()>     purchaser_info_cached              │
//! │  identify          → Pending<()>     refresh_push_token                 │
//! │  logout            → Pending<()>     handle_promo_notification          │
//! │  update_profile    → Pending<()>     set_*_listener                     │
//! │  update_attribution→ Pending<()>                                        │
//! │  make_purchase     → Pending<PurchaseOutcome>                           │
//! │  restore_purchases → Pending<RestoreOutcome>                            │
//! │  sync_purchases    → Pending<()>                                        │
//! │  get_purchaser_info→ Updates<PurchaserInfo>                             │
//! │  get_paywalls      → Updates<PaywallCatalog>                            │
//! │  get_promo         → Updates<PromoOffer>                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let subkit = Subkit::builder(SdkConfig::load(None)?)
//!     .with_gateway(gateway)
//!     .with_purchase_adapter(billing)
//!     .build()
//!     .await?;
//! subkit.start();
//!
//! subkit.activate("public_live_abc", None).await?;
//! let paywalls = subkit.get_paywalls().synced().await;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex};

use subkit_core::validation::{validate_api_key, validate_push_token};
use subkit_core::{
    AttributionSource, PaywallCatalog, Product, ProfileAttributes, PromoOffer, PurchaserInfo,
    PROMO_NOTIFICATION_SOURCE,
};
use subkit_store::{DbConfig, MemoryProfileStore, ProfileStore, SqliteProfileStore};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SdkConfig;
use crate::delivery::{Pending, UpdateSender, Updates};
use crate::engine::{ActivationState, SyncEngine};
use crate::error::{SdkError, SdkResult};
use crate::gateway::{AnalyticsSink, NoOpAnalytics, PurchaseAdapter, RemoteGateway};
use crate::logging::{set_log_level, LogLevel};
use crate::notifier::{Notifier, PromoListener, PurchaserInfoListener};
use crate::purchase::{PurchaseOutcome, RestoreOutcome};
use crate::queue::{CommandQueue, CommandQueueHandle, QueueSlot};

/// Analytics event recorded when a promo push is opened.
pub const PROMO_PUSH_OPENED_EVENT: &str = "promo_push_opened";

// =============================================================================
// Subkit
// =============================================================================

/// One SDK instance.
pub struct Subkit {
    config: SdkConfig,
    engine: Arc<SyncEngine>,
    queue: CommandQueueHandle,
    unstarted: Mutex<Option<CommandQueue>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Subkit {
    /// Creates a builder for the given configuration.
    pub fn builder(config: SdkConfig) -> SubkitBuilder {
        SubkitBuilder::new(config)
    }

    fn new(config: SdkConfig, engine: SyncEngine) -> Self {
        let (queue, handle) = CommandQueue::new(config.command_timeout());
        Subkit {
            config,
            engine: Arc::new(engine),
            queue: handle,
            unstarted: Mutex::new(Some(queue)),
            task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub async fn activation_state(&self) -> ActivationState {
        self.engine.activation_state().await
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Starts the command queue. Calls after the first are ignored.
    ///
    /// Operations submitted before `start` are buffered and run in order.
    pub fn start(&self) {
        let queue = self.unstarted.lock().ok().and_then(|mut slot| slot.take());
        match queue {
            Some(queue) => {
                let task = queue.start();
                if let Ok(mut slot) = self.task.lock() {
                    *slot = Some(task);
                }
                info!("Subkit started");
            }
            None => debug!("Subkit already started"),
        }
    }

    /// Stops the command queue after the in-flight command completes.
    ///
    /// Commands still waiting, and any submitted later, fail with
    /// [`SdkError::ShuttingDown`].
    pub async fn shutdown(&self) {
        let unstarted = self.unstarted.lock().ok().and_then(|mut slot| slot.take());
        if let Some(queue) = unstarted {
            queue.discard();
            return;
        }

        self.queue.shutdown().await;

        let task = self.task.lock().ok().and_then(|mut slot| slot.take());
        if let Some(task) = task {
            let _ = task.await;
        }
        info!("Subkit shut down");
    }

    // =========================================================================
    // Submission
    // =========================================================================

    fn submit<T, F, Fut>(&self, label: &'static str, op: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<SyncEngine>) -> Fut + Send + 'static,
        Fut: Future<Output = SdkResult<T>> + Send + 'static,
    {
        let (responder, pending) = Pending::channel();
        let on_abort = responder.clone();
        let engine = self.engine.clone();

        self.queue.enqueue(QueueSlot::new(
            label,
            async move { responder.send(op(engine).await) },
            move |err| on_abort.send(Err(err)),
        ));
        pending
    }

    fn submit_updates<T, F, Fut>(&self, label: &'static str, op: F) -> Updates<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<SyncEngine>, UpdateSender<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, updates) = Updates::channel();
        let on_abort = tx.clone();
        let engine = self.engine.clone();

        self.queue.enqueue(QueueSlot::new(
            label,
            async move { op(engine, tx).await },
            move |err| on_abort.failed(err),
        ));
        updates
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Activates the SDK with a public SDK key.
    ///
    /// The key is validated before anything is queued. Calling again once
    /// activated is a no-op.
    pub fn activate(
        &self,
        api_key: impl Into<String>,
        customer_user_id: Option<String>,
    ) -> Pending<()> {
        let api_key = api_key.into();
        if let Err(e) = validate_api_key(&api_key) {
            return Pending::ready(Err(e.into()));
        }

        self.submit("activate", move |engine| async move {
            engine.activate(api_key, customer_user_id).await
        })
    }

    /// Activates with the api key from the configuration.
    pub fn activate_from_config(&self, customer_user_id: Option<String>) -> Pending<()> {
        match self.config.api_key() {
            Some(key) => self.activate(key.to_string(), customer_user_id),
            None => Pending::ready(Err(SdkError::Config("No API key configured".into()))),
        }
    }

    /// Identifies the current user with a caller-assigned id.
    pub fn identify(&self, customer_user_id: impl Into<String>) -> Pending<()> {
        let customer_user_id = customer_user_id.into();
        self.submit("identify", move |engine| async move {
            engine.identify(customer_user_id).await
        })
    }

    /// Clears identity and cached state, then activates a fresh profile.
    pub fn logout(&self) -> Pending<()> {
        self.submit("logout", |engine| async move { engine.logout().await })
    }

    pub fn update_profile(&self, attributes: ProfileAttributes) -> Pending<()> {
        self.submit("update_profile", move |engine| async move {
            engine.update_profile(attributes).await
        })
    }

    pub fn update_attribution(
        &self,
        payload: serde_json::Value,
        source: AttributionSource,
        network_user_id: Option<String>,
    ) -> Pending<()> {
        self.submit("update_attribution", move |engine| async move {
            engine
                .update_attribution(payload, source, network_user_id)
                .await
        })
    }

    // =========================================================================
    // Read-style operations
    // =========================================================================

    /// Cached purchaser info (if any), then the remote one.
    pub fn get_purchaser_info(&self) -> Updates<PurchaserInfo> {
        self.submit_updates("get_purchaser_info", |engine, tx| async move {
            engine.purchaser_info_updates(tx).await
        })
    }

    /// Cached catalog (if any), then the merged remote one.
    pub fn get_paywalls(&self) -> Updates<PaywallCatalog> {
        self.submit_updates("get_paywalls", |engine, tx| async move {
            engine.paywall_updates(tx).await
        })
    }

    /// Current promo (if any), then the freshly resolved one.
    pub fn get_promo(&self) -> Updates<PromoOffer> {
        self.submit_updates("get_promo", |engine, tx| async move {
            engine.promo_updates(tx).await
        })
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    pub fn make_purchase(&self, product: Product) -> Pending<PurchaseOutcome> {
        self.submit("make_purchase", move |engine| async move {
            engine.make_purchase(product).await
        })
    }

    pub fn restore_purchases(&self) -> Pending<RestoreOutcome> {
        self.submit("restore_purchases", |engine| async move {
            engine.restore_purchases().await
        })
    }

    /// Restores purchases, discarding the outcome.
    #[deprecated(note = "use restore_purchases")]
    pub fn sync_purchases(&self) -> Pending<()> {
        self.submit("sync_purchases", |engine| async move {
            engine.sync_purchases().await
        })
    }

    // =========================================================================
    // Not queued
    // =========================================================================

    /// Cached purchaser info without touching the network.
    pub async fn purchaser_info_cached(&self) -> Option<PurchaserInfo> {
        self.engine.cached_purchaser_info().await
    }

    /// Hands a new push token to the gateway and, when active, syncs install
    /// metadata in the background.
    pub async fn refresh_push_token(&self, token: &str) -> SdkResult<()> {
        validate_push_token(token)?;
        self.engine.gateway.set_push_token(token);

        if self.engine.activation_state().await == ActivationState::Active
            && self.engine.store.profile_id().await?.is_some()
        {
            let engine = self.engine.clone();
            tokio::spawn(async move { engine.sync_meta_install().await });
        }
        Ok(())
    }

    /// Handles an opened push notification.
    ///
    /// Returns `None` if the payload is not a promo notification. Otherwise
    /// records the open and resolves the promo outside the queue.
    pub fn handle_promo_notification(
        &self,
        payload: &HashMap<String, String>,
    ) -> Option<Pending<Option<PromoOffer>>> {
        if payload.get("source").map(String::as_str) != Some(PROMO_NOTIFICATION_SOURCE) {
            return None;
        }

        let mut params = BTreeMap::new();
        if let Some(id) = payload.get("promo_delivery_id") {
            params.insert("promo_delivery_id".to_string(), id.clone());
        }
        self.engine
            .analytics
            .track_event(PROMO_PUSH_OPENED_EVENT, &params);

        let (responder, pending) = Pending::channel();
        let engine = self.engine.clone();
        tokio::spawn(async move {
            let result = match engine.ensure_active().await {
                Ok(profile_id) => engine.resolve_promo(&profile_id).await,
                Err(e) => Err(e),
            };
            responder.send(result);
        });
        Some(pending)
    }

    pub fn set_purchaser_info_listener(&self, listener: Option<Arc<dyn PurchaserInfoListener>>) {
        self.engine.notifier.set_purchaser_info_listener(listener);
    }

    pub fn set_promo_listener(&self, listener: Option<Arc<dyn PromoListener>>) {
        self.engine.notifier.set_promo_listener(listener);
    }

    /// Changes the SDK log verbosity.
    pub fn set_log_level(level: LogLevel) {
        set_log_level(level);
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a [`Subkit`] with its collaborators.
pub struct SubkitBuilder {
    config: SdkConfig,
    gateway: Option<Arc<dyn RemoteGateway>>,
    purchases: Option<Arc<dyn PurchaseAdapter>>,
    store: Option<Arc<dyn ProfileStore>>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
}

impl SubkitBuilder {
    /// Creates a new builder with the given config.
    pub fn new(config: SdkConfig) -> Self {
        SubkitBuilder {
            config,
            gateway: None,
            purchases: None,
            store: None,
            analytics: None,
        }
    }

    /// Sets the backend gateway.
    pub fn with_gateway(mut self, gateway: Arc<dyn RemoteGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Sets the platform billing adapter.
    pub fn with_purchase_adapter(mut self, purchases: Arc<dyn PurchaseAdapter>) -> Self {
        self.purchases = Some(purchases);
        self
    }

    /// Overrides the store chosen from `[storage]`.
    pub fn with_store(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the analytics sink.
    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Builds the instance. The queue is not started.
    pub async fn build(self) -> SdkResult<Subkit> {
        let gateway = self
            .gateway
            .ok_or_else(|| SdkError::Config("Remote gateway required".into()))?;
        let purchases = self
            .purchases
            .ok_or_else(|| SdkError::Config("Purchase adapter required".into()))?;
        let analytics = self.analytics.unwrap_or_else(|| Arc::new(NoOpAnalytics));

        let store: Arc<dyn ProfileStore> = match (self.store, &self.config.storage.database_path) {
            (Some(store), _) => store,
            (None, Some(path)) => {
                info!(?path, "Opening profile store");
                Arc::new(SqliteProfileStore::connect(DbConfig::new(path.clone())).await?)
            }
            (None, None) => Arc::new(MemoryProfileStore::new()),
        };

        let engine = SyncEngine::new(
            store,
            gateway,
            purchases,
            analytics,
            Arc::new(Notifier::new()),
        );
        Ok(Subkit::new(self.config, engine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::PaywallsResponse;
    use crate::testing::{settle, FakeBilling, FakeGateway, RecordingAnalytics};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use subkit_core::{DataState, Paywall};

    struct Fixture {
        subkit: Subkit,
        gateway: Arc<FakeGateway>,
        analytics: Arc<RecordingAnalytics>,
        store: Arc<MemoryProfileStore>,
    }

    async fn fixture(config: SdkConfig) -> Fixture {
        let gateway = Arc::new(FakeGateway::default());
        let analytics = Arc::new(RecordingAnalytics::default());
        let store = Arc::new(MemoryProfileStore::new());

        let subkit = Subkit::builder(config)
            .with_gateway(gateway.clone())
            .with_purchase_adapter(Arc::new(FakeBilling::default()))
            .with_store(store.clone())
            .with_analytics(analytics.clone())
            .build()
            .await
            .unwrap();

        Fixture {
            subkit,
            gateway,
            analytics,
            store,
        }
    }

    #[tokio::test]
    async fn test_builder_requires_collaborators() {
        let result = Subkit::builder(SdkConfig::default()).build().await;
        assert!(matches!(result, Err(SdkError::Config(_))));

        let result = Subkit::builder(SdkConfig::default())
            .with_gateway(Arc::new(FakeGateway::default()))
            .build()
            .await;
        assert!(matches!(result, Err(SdkError::Config(_))));
    }

    #[tokio::test]
    async fn test_blank_api_key_rejected_before_queueing() {
        let f = fixture(SdkConfig::default()).await;

        let err = f.subkit.activate("  ", None).await.unwrap_err();

        assert!(matches!(err, SdkError::Validation(_)));
        assert_eq!(f.gateway.calls().create_profile, 0);
    }

    #[tokio::test]
    async fn test_activate_from_config_without_key() {
        let f = fixture(SdkConfig::default()).await;
        let err = f.subkit.activate_from_config(None).await.unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_operations_run_in_submission_order() {
        let f = fixture(SdkConfig::default()).await;
        f.subkit.start();
        f.gateway.set_delay(Duration::from_millis(20));

        let activated = f.subkit.activate("key", None);
        let info = f.subkit.get_purchaser_info();
        let attribution =
            f.subkit
                .update_attribution(serde_json::json!({}), AttributionSource::Branch, None);
        let paywalls = f.subkit.get_paywalls();

        activated.await.unwrap();
        assert!(info.synced().await.error.is_none());
        attribution.await.unwrap();
        assert!(paywalls.synced().await.error.is_none());

        // Background start-up legs are excluded; only queued calls are ordered.
        let queued: Vec<String> = f
            .gateway
            .log()
            .into_iter()
            .filter(|entry| {
                entry.contains("create_profile")
                    || entry.contains("get_purchaser_info")
                    || entry.contains("update_attribution")
            })
            .collect();
        assert_eq!(
            queued,
            vec![
                "create_profile>",
                "<create_profile",
                "get_purchaser_info>",
                "<get_purchaser_info",
                "update_attribution>",
                "<update_attribution",
            ]
        );
    }

    #[tokio::test]
    async fn test_operations_before_start_are_buffered() {
        let f = fixture(SdkConfig::default()).await;

        let activated = f.subkit.activate("key", Some("user-1".into()));
        let identified = f.subkit.identify("user-1");
        f.subkit.start();
        f.subkit.start();

        activated.await.unwrap();
        identified.await.unwrap();
        assert_eq!(f.gateway.calls().create_profile, 1);
        assert_eq!(f.gateway.api_key().as_deref(), Some("key"));
    }

    #[tokio::test]
    async fn test_calls_before_activation_fail_and_advance() {
        let f = fixture(SdkConfig::default()).await;
        f.subkit.start();

        let identified = f.subkit.identify("user-1");
        let profile = f.subkit.update_profile(ProfileAttributes::default());
        let promo = f.subkit.get_promo();
        let logout = f.subkit.logout();

        assert!(matches!(identified.await, Err(SdkError::NotInitialized)));
        assert!(matches!(profile.await, Err(SdkError::NotInitialized)));
        assert!(matches!(
            promo.synced().await.error,
            Some(SdkError::NotInitialized)
        ));
        assert!(matches!(logout.await, Err(SdkError::NotInitialized)));

        f.subkit.activate("key", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_identify_still_advances() {
        let f = fixture(SdkConfig::default()).await;
        f.subkit.start();
        f.subkit.activate("key", None).await.unwrap();

        let blank = f.subkit.identify("");
        let next = f.subkit.identify("user-1");

        assert!(matches!(blank.await, Err(SdkError::Validation(_))));
        next.await.unwrap();
        assert_eq!(f.gateway.calls().create_profile, 2);
    }

    #[tokio::test]
    async fn test_paywalls_cached_then_synced() {
        let f = fixture(SdkConfig::default()).await;
        f.subkit.start();
        f.subkit.activate("key", None).await.unwrap();
        settle().await;
        f.gateway.set_paywalls(Ok(PaywallsResponse {
            paywalls: vec![Paywall::new("a", "v1")],
            products: vec![],
        }));

        let first = f.subkit.get_paywalls().collect().await;
        let second = f.subkit.get_paywalls().collect().await;

        // The start-up prefetch cached an empty catalog.
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].state, DataState::Cached);
        assert_eq!(first[1].state, DataState::Synced);
        assert_eq!(second[0].value.as_ref().unwrap().paywalls.len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_stall_queue() {
        let f = fixture(SdkConfig::default()).await;
        f.subkit.start();
        f.subkit.activate("key", None).await.unwrap();

        drop(f.subkit.get_purchaser_info());
        drop(f.subkit.identify("user-1"));

        f.subkit.identify("user-1").await.unwrap();
        assert_eq!(f.gateway.calls().create_profile, 2);
    }

    #[tokio::test]
    async fn test_listener_fires_on_change_only() {
        let f = fixture(SdkConfig::default()).await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        f.subkit
            .set_purchaser_info_listener(Some(Arc::new(move |_: &PurchaserInfo| {
                counter.fetch_add(1, Ordering::SeqCst);
            })));
        f.subkit.start();

        f.subkit.activate("key", None).await.unwrap();
        settle().await;
        f.subkit.get_purchaser_info().synced().await;
        f.subkit.get_purchaser_info().synced().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            f.subkit.purchaser_info_cached().await,
            Some(PurchaserInfo::new("profile-1"))
        );
    }

    #[tokio::test]
    async fn test_handle_promo_notification() {
        let f = fixture(SdkConfig::default()).await;
        f.subkit.start();
        f.subkit.activate("key", None).await.unwrap();
        settle().await;

        let foreign: HashMap<String, String> =
            [("source".to_string(), "other".to_string())].into_iter().collect();
        assert!(f.subkit.handle_promo_notification(&foreign).is_none());

        f.gateway.set_promo(Ok(Some(PromoOffer::new("v1"))));
        f.gateway.set_paywalls(Ok(PaywallsResponse {
            paywalls: vec![Paywall::new("a", "v1")],
            products: vec![],
        }));
        let payload: HashMap<String, String> = [
            ("source".to_string(), "subkit".to_string()),
            ("promo_delivery_id".to_string(), "d-1".to_string()),
        ]
        .into_iter()
        .collect();

        let promo = f
            .subkit
            .handle_promo_notification(&payload)
            .unwrap()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(promo.paywall.unwrap().developer_id, "a");
        let events = f.analytics.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, PROMO_PUSH_OPENED_EVENT);
        assert_eq!(events[0].1.get("promo_delivery_id").map(String::as_str), Some("d-1"));
    }

    #[tokio::test]
    async fn test_refresh_push_token() {
        let f = fixture(SdkConfig::default()).await;
        assert!(f.subkit.refresh_push_token("").await.is_err());

        f.subkit.refresh_push_token("token-1").await.unwrap();
        assert_eq!(f.gateway.push_token().as_deref(), Some("token-1"));
        assert_eq!(f.gateway.calls().sync_meta_install, 0);

        f.subkit.start();
        f.subkit.activate("key", None).await.unwrap();
        settle().await;
        let before = f.gateway.calls().sync_meta_install;

        f.subkit.refresh_push_token("token-2").await.unwrap();
        settle().await;
        assert_eq!(f.gateway.calls().sync_meta_install, before + 1);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_later_commands() {
        let f = fixture(SdkConfig::default()).await;
        f.subkit.start();
        f.subkit.activate("key", None).await.unwrap();

        f.subkit.shutdown().await;

        assert!(matches!(
            f.subkit.identify("user-1").await,
            Err(SdkError::ShuttingDown)
        ));
        assert!(matches!(
            f.subkit.get_paywalls().synced().await.error,
            Some(SdkError::ShuttingDown)
        ));
    }

    #[tokio::test]
    async fn test_shutdown_before_start() {
        let f = fixture(SdkConfig::default()).await;
        let pending = f.subkit.activate("key", None);

        f.subkit.shutdown().await;

        assert!(matches!(pending.await, Err(SdkError::ShuttingDown)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_from_config() {
        let mut config = SdkConfig::default();
        config.queue.command_timeout_secs = 1;
        let f = fixture(config).await;
        f.subkit.start();
        f.subkit.activate("key", None).await.unwrap();
        f.gateway.set_delay(Duration::from_secs(5));

        let err = f.subkit.identify("user-1").await.unwrap_err();

        assert!(matches!(err, SdkError::CommandTimedOut { secs: 1 }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_logout_keeps_installation_id() {
        let f = fixture(SdkConfig::default()).await;
        f.subkit.start();
        f.subkit.activate("key", Some("user-1".into())).await.unwrap();
        settle().await;
        let installation_id = f.store.installation_id().await.unwrap();

        f.subkit.logout().await.unwrap();

        assert_eq!(f.store.installation_id().await.unwrap(), installation_id);
        assert!(f.store.customer_user_id().await.unwrap().is_none());
    }
}
