//! Scripted collaborator doubles for unit tests.
//!
//! Every scripted result is sticky: once set it is returned on every call
//! until replaced. `create_profile` is the exception and takes a queue, with
//! a generated `profile-N` response when the queue is empty.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use subkit_core::{
    AttributionSource, BillingDetails, Product, ProfileAttributes, PromoOffer, PurchaserInfo,
};
use subkit_store::{MemoryProfileStore, ProfileStore, StoreError, StoreResult};

use crate::engine::SyncEngine;
use crate::error::RemoteError;
use crate::gateway::{
    AnalyticsSink, CreateProfileResponse, PaywallsResponse, PurchaseAdapter, PurchaseResponse,
    RemoteGateway, RemoteResult, RestoreResponse, SyncMetaInstallResponse, UpdateProfileResponse,
};
use crate::notifier::Notifier;

/// Per-method call counters.
#[derive(Debug, Clone, Default)]
pub struct GatewayCalls {
    pub create_profile: usize,
    pub get_purchaser_info: usize,
    pub get_paywalls: usize,
    pub get_promo: usize,
    pub update_profile: usize,
    pub update_attribution: usize,
    pub sync_meta_install: usize,
}

// =============================================================================
// Fake Gateway
// =============================================================================

#[derive(Default)]
pub struct FakeGateway {
    create_profile: Mutex<VecDeque<RemoteResult<CreateProfileResponse>>>,
    purchaser_info: Mutex<Option<RemoteResult<PurchaserInfo>>>,
    paywalls: Mutex<Option<RemoteResult<PaywallsResponse>>>,
    promo: Mutex<Option<RemoteResult<Option<PromoOffer>>>>,
    update_profile: Mutex<Option<RemoteResult<UpdateProfileResponse>>>,
    update_attribution: Mutex<Option<RemoteResult<()>>>,
    meta_install: Mutex<Option<RemoteResult<SyncMetaInstallResponse>>>,
    calls: Mutex<GatewayCalls>,
    log: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
    push_token: Mutex<Option<String>>,
    api_key: Mutex<Option<String>>,
}

impl FakeGateway {
    pub fn push_create_profile(&self, result: RemoteResult<CreateProfileResponse>) {
        self.create_profile.lock().unwrap().push_back(result);
    }

    pub fn set_purchaser_info(&self, result: RemoteResult<PurchaserInfo>) {
        *self.purchaser_info.lock().unwrap() = Some(result);
    }

    pub fn set_paywalls(&self, result: RemoteResult<PaywallsResponse>) {
        *self.paywalls.lock().unwrap() = Some(result);
    }

    pub fn set_promo(&self, result: RemoteResult<Option<PromoOffer>>) {
        *self.promo.lock().unwrap() = Some(result);
    }

    pub fn set_update_profile(&self, result: RemoteResult<UpdateProfileResponse>) {
        *self.update_profile.lock().unwrap() = Some(result);
    }

    pub fn set_update_attribution(&self, result: RemoteResult<()>) {
        *self.update_attribution.lock().unwrap() = Some(result);
    }

    pub fn set_meta_install(&self, result: RemoteResult<SyncMetaInstallResponse>) {
        *self.meta_install.lock().unwrap() = Some(result);
    }

    /// Makes every remote call take `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> GatewayCalls {
        self.calls.lock().unwrap().clone()
    }

    /// `name>` when a call starts and `<name` when it returns.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn push_token(&self) -> Option<String> {
        self.push_token.lock().unwrap().clone()
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key.lock().unwrap().clone()
    }

    async fn call<T: Clone>(
        &self,
        name: &str,
        scripted: &Mutex<Option<RemoteResult<T>>>,
        default: impl FnOnce() -> RemoteResult<T>,
    ) -> RemoteResult<T> {
        self.log.lock().unwrap().push(format!("{name}>"));
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.log.lock().unwrap().push(format!("<{name}"));

        let result = scripted.lock().unwrap().clone();
        result.unwrap_or_else(default)
    }
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn create_profile(
        &self,
        customer_user_id: Option<&str>,
    ) -> RemoteResult<CreateProfileResponse> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.create_profile += 1;
            calls.create_profile
        };
        let scripted = Mutex::new(self.create_profile.lock().unwrap().pop_front());
        let customer_user_id = customer_user_id.map(str::to_string);
        self.call("create_profile", &scripted, || {
            let profile_id = format!("profile-{n}");
            Ok(CreateProfileResponse {
                purchaser_info: PurchaserInfo::new(profile_id.clone()),
                profile_id,
                customer_user_id,
            })
        })
        .await
    }

    async fn get_purchaser_info(&self, profile_id: &str) -> RemoteResult<PurchaserInfo> {
        self.calls.lock().unwrap().get_purchaser_info += 1;
        self.call("get_purchaser_info", &self.purchaser_info, || {
            Ok(PurchaserInfo::new(profile_id))
        })
        .await
    }

    async fn get_paywalls(&self, _profile_id: &str) -> RemoteResult<PaywallsResponse> {
        self.calls.lock().unwrap().get_paywalls += 1;
        self.call("get_paywalls", &self.paywalls, || Ok(PaywallsResponse::default()))
            .await
    }

    async fn get_promo(&self, _profile_id: &str) -> RemoteResult<Option<PromoOffer>> {
        self.calls.lock().unwrap().get_promo += 1;
        self.call("get_promo", &self.promo, || Ok(None)).await
    }

    async fn update_profile(
        &self,
        profile_id: &str,
        _attributes: &ProfileAttributes,
    ) -> RemoteResult<UpdateProfileResponse> {
        self.calls.lock().unwrap().update_profile += 1;
        self.call("update_profile", &self.update_profile, || {
            Ok(UpdateProfileResponse {
                profile_id: profile_id.to_string(),
            })
        })
        .await
    }

    async fn update_attribution(
        &self,
        _profile_id: &str,
        _payload: &serde_json::Value,
        _source: AttributionSource,
        _network_user_id: Option<&str>,
    ) -> RemoteResult<()> {
        self.calls.lock().unwrap().update_attribution += 1;
        self.call("update_attribution", &self.update_attribution, || Ok(()))
            .await
    }

    async fn sync_meta_install(
        &self,
        _profile_id: &str,
        _installation_id: &str,
    ) -> RemoteResult<SyncMetaInstallResponse> {
        self.calls.lock().unwrap().sync_meta_install += 1;
        self.call("sync_meta_install", &self.meta_install, || {
            Ok(SyncMetaInstallResponse::default())
        })
        .await
    }

    fn set_push_token(&self, token: &str) {
        *self.push_token.lock().unwrap() = Some(token.to_string());
    }

    fn set_api_key(&self, api_key: &str) {
        *self.api_key.lock().unwrap() = Some(api_key.to_string());
    }
}

// =============================================================================
// Fake Billing
// =============================================================================

#[derive(Default)]
pub struct FakeBilling {
    purchase: Mutex<Option<RemoteResult<PurchaseResponse>>>,
    restore: Mutex<Option<RemoteResult<Option<RestoreResponse>>>>,
    details: Mutex<Option<RemoteResult<BTreeMap<String, BillingDetails>>>>,
    calls: AtomicUsize,
    restore_calls: AtomicUsize,
}

impl FakeBilling {
    pub fn set_purchase(&self, result: RemoteResult<PurchaseResponse>) {
        *self.purchase.lock().unwrap() = Some(result);
    }

    pub fn set_restore(&self, result: RemoteResult<Option<RestoreResponse>>) {
        *self.restore.lock().unwrap() = Some(result);
    }

    pub fn set_details(&self, result: RemoteResult<BTreeMap<String, BillingDetails>>) {
        *self.details.lock().unwrap() = Some(result);
    }

    /// Total calls across all methods.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn restore_calls(&self) -> usize {
        self.restore_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PurchaseAdapter for FakeBilling {
    async fn purchase(&self, _product: &Product) -> RemoteResult<PurchaseResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.purchase.lock().unwrap().clone();
        scripted.unwrap_or_else(|| Err(RemoteError::billing("no purchase scripted")))
    }

    async fn restore(&self) -> RemoteResult<Option<RestoreResponse>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.restore.lock().unwrap().clone();
        scripted.unwrap_or(Ok(None))
    }

    async fn billing_details(
        &self,
        product_ids: &[String],
    ) -> RemoteResult<BTreeMap<String, BillingDetails>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.details.lock().unwrap().clone();
        scripted.unwrap_or_else(|| {
            let ids: Vec<&str> = product_ids.iter().map(String::as_str).collect();
            Ok(billing(&ids))
        })
    }
}

/// Billing details priced at 9.99 USD for each id.
pub fn billing(ids: &[&str]) -> BTreeMap<String, BillingDetails> {
    ids.iter()
        .map(|id| {
            (
                id.to_string(),
                BillingDetails {
                    price_micros: 9_990_000,
                    currency_code: "USD".to_string(),
                    localized_price: "$9.99".to_string(),
                    ..Default::default()
                },
            )
        })
        .collect()
}

// =============================================================================
// Recording Analytics
// =============================================================================

#[derive(Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<(String, BTreeMap<String, String>)>>,
}

impl RecordingAnalytics {
    pub fn events(&self) -> Vec<(String, BTreeMap<String, String>)> {
        self.events.lock().unwrap().clone()
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn track_event(&self, name: &str, params: &BTreeMap<String, String>) {
        self.events
            .lock()
            .unwrap()
            .push((name.to_string(), params.clone()));
    }
}

// =============================================================================
// Failing Store
// =============================================================================

/// In-memory store whose writes fail when they touch a blocked key.
///
/// A batch containing a blocked key fails as a whole and writes nothing.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryProfileStore,
    blocked: Mutex<Vec<&'static str>>,
}

impl FailingStore {
    pub fn block(&self, key: &'static str) {
        self.blocked.lock().unwrap().push(key);
    }

    fn check(&self, key: &str) -> StoreResult<()> {
        if self.blocked.lock().unwrap().iter().any(|blocked| *blocked == key) {
            return Err(StoreError::QueryFailed(format!("write to {key} rejected")));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FailingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check(key)?;
        self.inner.set(key, value).await
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> StoreResult<()> {
        for (key, _) in entries {
            self.check(key)?;
        }
        self.inner.set_many(entries).await
    }

    async fn remove_many(&self, keys: &[&str]) -> StoreResult<()> {
        self.inner.remove_many(keys).await
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness<S = MemoryProfileStore> {
    pub engine: Arc<SyncEngine>,
    pub gateway: Arc<FakeGateway>,
    pub billing: Arc<FakeBilling>,
    pub analytics: Arc<RecordingAnalytics>,
    pub store: Arc<S>,
}

/// Engine over fresh fakes and an empty in-memory store.
pub fn harness() -> Harness {
    harness_with_store(Arc::new(MemoryProfileStore::new()))
}

/// Engine over fresh fakes and the given store.
pub fn harness_with_store<S: ProfileStore + 'static>(store: Arc<S>) -> Harness<S> {
    let gateway = Arc::new(FakeGateway::default());
    let billing = Arc::new(FakeBilling::default());
    let analytics = Arc::new(RecordingAnalytics::default());

    let engine = Arc::new(SyncEngine::new(
        store.clone(),
        gateway.clone(),
        billing.clone(),
        analytics.clone(),
        Arc::new(Notifier::new()),
    ));

    Harness {
        engine,
        gateway,
        billing,
        analytics,
        store,
    }
}

/// Lets spawned background legs run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
