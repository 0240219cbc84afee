//! # In-Memory Store
//!
//! `ProfileStore` over a `HashMap`. Nothing survives the process; used by
//! tests and as the default when no database path is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::store::ProfileStore;

/// Volatile profile store.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> StoreResult<()> {
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> StoreResult<()> {
        let mut map = self.entries.write().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::keys;
    use subkit_core::{IamCredentials, Paywall, PaywallCatalog, Product, PurchaserInfo};

    #[tokio::test]
    async fn test_identity_round_trip() {
        let store = MemoryProfileStore::new();
        assert_eq!(store.profile_id().await.unwrap(), None);

        store.set_profile_id("p1").await.unwrap();
        store.set_customer_user_id(Some("user-1")).await.unwrap();
        assert_eq!(store.profile_id().await.unwrap().as_deref(), Some("p1"));
        assert_eq!(
            store.customer_user_id().await.unwrap().as_deref(),
            Some("user-1")
        );

        store.set_customer_user_id(None).await.unwrap();
        assert_eq!(store.customer_user_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_identity() {
        let store = MemoryProfileStore::new();
        store.set_identity("p1", Some("user-1")).await.unwrap();
        store.set_identity("p2", None).await.unwrap();

        assert_eq!(store.profile_id().await.unwrap().as_deref(), Some("p2"));
        assert_eq!(
            store.customer_user_id().await.unwrap().as_deref(),
            Some("user-1")
        );
    }

    #[tokio::test]
    async fn test_empty_profile_id_reads_as_none() {
        let store = MemoryProfileStore::new();
        store.set(keys::PROFILE_ID, "").await.unwrap();
        assert_eq!(store.profile_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_catalog_absent_vs_empty() {
        let store = MemoryProfileStore::new();
        assert!(store.catalog().await.unwrap().is_none());

        store.set_catalog(&PaywallCatalog::default()).await.unwrap();
        let cached = store.catalog().await.unwrap().unwrap();
        assert!(cached.is_empty());

        let catalog = PaywallCatalog::new(
            vec![Paywall::new("a", "va").with_product(Product::new("monthly"))],
            vec![Product::new("monthly")],
        );
        store.set_catalog(&catalog).await.unwrap();
        assert_eq!(store.catalog().await.unwrap(), Some(catalog));

        store.clear_catalog().await.unwrap();
        assert!(store.catalog().await.unwrap().is_none());
        assert!(store.paywalls().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_installation_id_is_stable() {
        let store = MemoryProfileStore::new();
        let first = store.installation_id().await.unwrap();
        let second = store.installation_id().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 36);
    }

    #[tokio::test]
    async fn test_clear_on_logout_keeps_installation_and_api_key() {
        let store = MemoryProfileStore::new();
        let installation = store.installation_id().await.unwrap();
        store.set_api_key("public_live_1").await.unwrap();
        store.set_profile_id("p1").await.unwrap();
        store.set_customer_user_id(Some("u1")).await.unwrap();
        store
            .set_purchaser_info(&PurchaserInfo::new("p1"))
            .await
            .unwrap();
        store
            .set_iam_credentials(&IamCredentials {
                access_key_id: Some("k".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        store.clear_on_logout().await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.installation_id().await.unwrap(), installation);
        assert_eq!(store.api_key().await.unwrap().as_deref(), Some("public_live_1"));
        assert_eq!(store.profile_id().await.unwrap(), None);
        assert_eq!(store.purchaser_info().await.unwrap(), None);
        assert!(store.iam_credentials().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() {
        let store = MemoryProfileStore::new();
        store.set(keys::PURCHASER_INFO, "{not json").await.unwrap();

        let err = store.purchaser_info().await.unwrap_err();
        assert!(matches!(err, crate::StoreError::Corrupt { .. }));
    }
}
