//! # ProfileStore
//!
//! The durable state of one SDK installation, behind a key-value trait.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ProfileStore                                     │
//! │                                                                         │
//! │  Typed accessors (provided methods)                                    │
//! │  ├── profile_id / set_profile_id                                       │
//! │  ├── customer_user_id / set_customer_user_id                           │
//! │  ├── set_identity                                 (one write)          │
//! │  ├── purchaser_info / set_purchaser_info          (JSON)               │
//! │  ├── catalog / set_catalog / clear_catalog        (JSON, atomic)       │
//! │  ├── iam_credentials / set_iam_credentials        (JSON)               │
//! │  ├── installation_id                              (generated once)     │
//! │  ├── api_key / set_api_key                                             │
//! │  └── clear_on_logout                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Raw operations (required methods)                                     │
//! │  get • set • set_many • remove_many                                    │
//! │       │                                                                 │
//! │       ├──► MemoryProfileStore  (tokio RwLock<HashMap>)                  │
//! │       └──► SqliteProfileStore  (profile_kv table)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backends only implement the four raw operations. Ordering of writes is
//! the caller's job (subkit-sync serializes them through its command queue).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use subkit_core::{IamCredentials, Paywall, PaywallCatalog, Product, PurchaserInfo};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Storage keys.
pub mod keys {
    pub const PROFILE_ID: &str = "profile_id";
    pub const CUSTOMER_USER_ID: &str = "customer_user_id";
    pub const PURCHASER_INFO: &str = "purchaser_info";
    pub const PAYWALLS: &str = "paywalls";
    pub const PRODUCTS: &str = "products";
    pub const IAM_CREDENTIALS: &str = "iam_credentials";
    pub const INSTALLATION_ID: &str = "installation_id";
    pub const API_KEY: &str = "api_key";

    /// Keys wiped by `clear_on_logout`. The installation id and api key
    /// survive a logout.
    pub const LOGOUT_KEYS: &[&str] = &[
        PROFILE_ID,
        CUSTOMER_USER_ID,
        PURCHASER_INFO,
        PAYWALLS,
        PRODUCTS,
        IAM_CREDENTIALS,
    ];
}

/// Durable key-value persistence for profile state.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    // =========================================================================
    // Raw operations
    // =========================================================================

    /// Reads a raw value.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a raw value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Writes several values atomically.
    async fn set_many(&self, entries: &[(&str, String)]) -> StoreResult<()>;

    /// Removes several keys atomically. Missing keys are ignored.
    async fn remove_many(&self, keys: &[&str]) -> StoreResult<()>;

    // =========================================================================
    // Identity
    // =========================================================================

    async fn profile_id(&self) -> StoreResult<Option<String>> {
        Ok(self.get(keys::PROFILE_ID).await?.filter(|id| !id.is_empty()))
    }

    async fn set_profile_id(&self, profile_id: &str) -> StoreResult<()> {
        self.set(keys::PROFILE_ID, profile_id).await
    }

    async fn customer_user_id(&self) -> StoreResult<Option<String>> {
        Ok(self
            .get(keys::CUSTOMER_USER_ID)
            .await?
            .filter(|id| !id.is_empty()))
    }

    /// `None` removes the stored id.
    async fn set_customer_user_id(&self, customer_user_id: Option<&str>) -> StoreResult<()> {
        match customer_user_id {
            Some(id) => self.set(keys::CUSTOMER_USER_ID, id).await,
            None => self.remove_many(&[keys::CUSTOMER_USER_ID]).await,
        }
    }

    /// Stores the profile id and, when given, the customer user id in one
    /// write. `None` leaves the stored customer user id untouched.
    async fn set_identity(
        &self,
        profile_id: &str,
        customer_user_id: Option<&str>,
    ) -> StoreResult<()> {
        let mut entries = vec![(keys::PROFILE_ID, profile_id.to_string())];
        if let Some(id) = customer_user_id {
            entries.push((keys::CUSTOMER_USER_ID, id.to_string()));
        }
        self.set_many(&entries).await
    }

    /// Returns the installation id, generating and persisting one on first use.
    async fn installation_id(&self) -> StoreResult<String> {
        if let Some(id) = self.get(keys::INSTALLATION_ID).await? {
            return Ok(id);
        }
        let id = Uuid::new_v4().to_string();
        debug!(installation_id = %id, "Generated installation id");
        self.set(keys::INSTALLATION_ID, &id).await?;
        Ok(id)
    }

    async fn api_key(&self) -> StoreResult<Option<String>> {
        self.get(keys::API_KEY).await
    }

    async fn set_api_key(&self, api_key: &str) -> StoreResult<()> {
        self.set(keys::API_KEY, api_key).await
    }

    // =========================================================================
    // Cached snapshots
    // =========================================================================

    async fn purchaser_info(&self) -> StoreResult<Option<PurchaserInfo>> {
        decode(keys::PURCHASER_INFO, self.get(keys::PURCHASER_INFO).await?)
    }

    async fn set_purchaser_info(&self, info: &PurchaserInfo) -> StoreResult<()> {
        let json = encode(keys::PURCHASER_INFO, info)?;
        self.set(keys::PURCHASER_INFO, &json).await
    }

    async fn paywalls(&self) -> StoreResult<Vec<Paywall>> {
        Ok(decode(keys::PAYWALLS, self.get(keys::PAYWALLS).await?)?.unwrap_or_default())
    }

    async fn products(&self) -> StoreResult<Vec<Product>> {
        Ok(decode(keys::PRODUCTS, self.get(keys::PRODUCTS).await?)?.unwrap_or_default())
    }

    /// Returns the cached catalog, or `None` if nothing was ever cached.
    async fn catalog(&self) -> StoreResult<Option<PaywallCatalog>> {
        let paywalls: Option<Vec<Paywall>> =
            decode(keys::PAYWALLS, self.get(keys::PAYWALLS).await?)?;
        let products: Option<Vec<Product>> =
            decode(keys::PRODUCTS, self.get(keys::PRODUCTS).await?)?;

        if paywalls.is_none() && products.is_none() {
            return Ok(None);
        }
        Ok(Some(PaywallCatalog::new(
            paywalls.unwrap_or_default(),
            products.unwrap_or_default(),
        )))
    }

    /// Replaces containers and products in one write.
    async fn set_catalog(&self, catalog: &PaywallCatalog) -> StoreResult<()> {
        let entries = [
            (keys::PAYWALLS, encode(keys::PAYWALLS, &catalog.paywalls)?),
            (keys::PRODUCTS, encode(keys::PRODUCTS, &catalog.products)?),
        ];
        self.set_many(&entries).await
    }

    async fn clear_catalog(&self) -> StoreResult<()> {
        self.remove_many(&[keys::PAYWALLS, keys::PRODUCTS]).await
    }

    async fn iam_credentials(&self) -> StoreResult<IamCredentials> {
        Ok(decode(keys::IAM_CREDENTIALS, self.get(keys::IAM_CREDENTIALS).await?)?
            .unwrap_or_default())
    }

    async fn set_iam_credentials(&self, credentials: &IamCredentials) -> StoreResult<()> {
        let json = encode(keys::IAM_CREDENTIALS, credentials)?;
        self.set(keys::IAM_CREDENTIALS, &json).await
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// Wipes identity, cached snapshots and credentials.
    async fn clear_on_logout(&self) -> StoreResult<()> {
        debug!("Clearing profile state on logout");
        self.remove_many(keys::LOGOUT_KEYS).await
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StoreError::corrupt(key, e))
}

fn decode<T: DeserializeOwned>(key: &str, raw: Option<String>) -> StoreResult<Option<T>> {
    raw.map(|json| serde_json::from_str(&json).map_err(|e| StoreError::corrupt(key, e)))
        .transpose()
}
