//! # Profile Identity
//!
//! Activation, identify, logout and profile updates.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Profile Identity Transitions                       │
//! │                                                                         │
//! │   Uninitialized ──activate──► Activating                                │
//! │        ▲                          │                                     │
//! │        │ create failed            ├── profile stored? ─┐                │
//! │        │                          │                    │                │
//! │        └──────────────────────────┤ no                 │ yes            │
//! │                                   ▼                    ▼                │
//! │                           create_profile      meta + paywalls + promo   │
//! │                           persist identity    (background), restore,    │
//! │                           start-up sync       first purchaser info      │
//! │                           (background)        delivery completes        │
//! │                                   │                    │                │
//! │                                   └────────┬───────────┘                │
//! │                                            ▼                            │
//! │                       ┌──────────────►  Active  ◄───── identify(id)     │
//! │                       │                    │                            │
//! │                       │                 logout                          │
//! │                       │                    ▼                            │
//! │                       └─────────── clear state, Activating              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed remote call never touches the stored profile id or customer
//! user id.

use std::sync::Arc;

use subkit_core::validation::validate_customer_user_id;
use subkit_core::{AttributionSource, ProfileAttributes};
use tracing::{debug, info, warn};

use crate::engine::{ActivationState, SyncEngine};
use crate::error::{SdkError, SdkResult};
use crate::gateway::CreateProfileResponse;

impl SyncEngine {
    // =========================================================================
    // Activation
    // =========================================================================

    /// `activate` slot body. The api key is validated before queueing.
    pub(crate) async fn activate(
        self: &Arc<Self>,
        api_key: String,
        customer_user_id: Option<String>,
    ) -> SdkResult<()> {
        if !self.begin_activation().await {
            debug!("Already activated, ignoring activate call");
            return Ok(());
        }

        self.gateway.set_api_key(&api_key);
        if let Err(e) = self.store.set_api_key(&api_key).await {
            self.set_activation(ActivationState::Uninitialized).await;
            return Err(e.into());
        }

        self.run_activation(customer_user_id).await
    }

    /// Brings an `Activating` instance to `Active`.
    ///
    /// Leaves the instance `Uninitialized` when no profile could be
    /// established, so `activate` can be retried.
    async fn run_activation(self: &Arc<Self>, customer_user_id: Option<String>) -> SdkResult<()> {
        let stored = match self.store.profile_id().await {
            Ok(stored) => stored,
            Err(e) => {
                self.set_activation(ActivationState::Uninitialized).await;
                return Err(e.into());
            }
        };

        match stored {
            Some(profile_id) => {
                if customer_user_id.is_some() {
                    debug!("Profile already stored, ignoring customer user id on activate");
                }
                self.resume_profile(profile_id).await
            }
            None => self.create_profile(customer_user_id).await,
        }
    }

    /// Activation with a stored profile.
    async fn resume_profile(self: &Arc<Self>, profile_id: String) -> SdkResult<()> {
        info!(profile_id = %profile_id, "Resuming stored profile");
        self.set_activation(ActivationState::Active).await;

        let engine = self.clone();
        tokio::spawn(async move {
            tokio::join!(
                engine.sync_meta_install(),
                engine.prefetch_paywalls(),
                engine.prefetch_promo(),
            );
        });

        self.restore_in_background().await;

        // The first purchaser info delivery completes activation.
        if self.cached_purchaser_info().await.is_some() {
            let engine = self.clone();
            tokio::spawn(async move {
                if let Err(e) = engine.fetch_purchaser_info(&profile_id).await {
                    debug!(error = %e, "Start-up purchaser info fetch failed");
                }
            });
            return Ok(());
        }

        self.fetch_purchaser_info(&profile_id).await.map(|_| ())
    }

    /// Activation without a stored profile.
    async fn create_profile(self: &Arc<Self>, customer_user_id: Option<String>) -> SdkResult<()> {
        let response = match self.gateway.create_profile(customer_user_id.as_deref()).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Profile creation failed");
                self.set_activation(ActivationState::Uninitialized).await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.persist_identity(&response).await {
            self.set_activation(ActivationState::Uninitialized).await;
            return Err(e);
        }
        self.apply_purchaser_info_logged(&response.purchaser_info).await;

        info!(profile_id = %response.profile_id, "Profile created");
        self.set_activation(ActivationState::Active).await;
        self.spawn_startup_sync();
        Ok(())
    }

    async fn persist_identity(&self, response: &CreateProfileResponse) -> SdkResult<()> {
        self.store
            .set_identity(&response.profile_id, response.customer_user_id.as_deref())
            .await?;
        Ok(())
    }

    // =========================================================================
    // Identify / Logout
    // =========================================================================

    /// `identify` slot body.
    pub(crate) async fn identify(self: &Arc<Self>, customer_user_id: String) -> SdkResult<()> {
        validate_customer_user_id(&customer_user_id)?;
        let current_profile = self.ensure_active().await?;

        if self.store.customer_user_id().await?.as_deref() == Some(customer_user_id.as_str()) {
            debug!("Customer user id unchanged, skipping identify");
            return Ok(());
        }

        let response = self
            .gateway
            .create_profile(Some(&customer_user_id))
            .await?;
        self.persist_identity(&response).await?;
        self.apply_purchaser_info_logged(&response.purchaser_info).await;

        if response.profile_id == current_profile {
            return Ok(());
        }

        info!(
            from = %current_profile,
            to = %response.profile_id,
            "Profile changed on identify, invalidating catalog"
        );
        self.store.clear_catalog().await?;

        let engine = self.clone();
        tokio::spawn(async move {
            tokio::join!(
                engine.prefetch_paywalls(),
                engine.sync_meta_install(),
                engine.restore_in_background(),
            );
        });
        Ok(())
    }

    /// `logout` slot body.
    ///
    /// Allowed once any activation has completed. A logout whose
    /// re-activation failed can therefore be retried with another logout.
    pub(crate) async fn logout(self: &Arc<Self>) -> SdkResult<()> {
        if !self.has_been_active() {
            return Err(SdkError::NotInitialized);
        }

        info!("Logging out");
        self.store.clear_on_logout().await?;
        self.clear_current_promo().await;
        self.set_activation(ActivationState::Activating).await;

        self.run_activation(None).await
    }

    // =========================================================================
    // Profile updates
    // =========================================================================

    /// `update_profile` slot body.
    pub(crate) async fn update_profile(&self, attributes: ProfileAttributes) -> SdkResult<()> {
        let profile_id = self.ensure_active().await?;
        let response = self.gateway.update_profile(&profile_id, &attributes).await?;

        if !response.profile_id.is_empty() && response.profile_id != profile_id {
            info!(profile_id = %response.profile_id, "Profile id reassigned by update");
            self.store.set_profile_id(&response.profile_id).await?;
        }
        Ok(())
    }

    /// `update_attribution` slot body.
    pub(crate) async fn update_attribution(
        &self,
        payload: serde_json::Value,
        source: AttributionSource,
        network_user_id: Option<String>,
    ) -> SdkResult<()> {
        let profile_id = self.ensure_active().await?;
        debug!(%source, "Updating attribution");
        self.gateway
            .update_attribution(&profile_id, &payload, source, network_user_id.as_deref())
            .await?;
        Ok(())
    }
}
