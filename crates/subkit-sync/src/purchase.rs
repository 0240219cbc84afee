//! # Purchase & Restore
//!
//! Purchases and restores go through the [`PurchaseAdapter`], which runs the
//! platform flow and returns the backend's validation. The purchaser info in
//! that validation is applied like any other snapshot. Once the backend has
//! validated, a local cache failure is logged and the outcome still returned.
//!
//! [`PurchaseAdapter`]: crate::gateway::PurchaseAdapter

use serde::{Deserialize, Serialize};
use subkit_core::{Product, PurchaserInfo};
use tracing::{debug, info};

use crate::engine::SyncEngine;
use crate::error::{RemoteError, SdkResult};
use crate::gateway::RestoreResponse;

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub purchaser_info: PurchaserInfo,
    pub purchase_token: String,
    pub validation_result: serde_json::Value,
    pub product: Product,
}

/// Result of a successful restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreOutcome {
    pub purchaser_info: PurchaserInfo,
    pub validation_results: Vec<serde_json::Value>,
}

impl SyncEngine {
    /// `make_purchase` slot body.
    pub(crate) async fn make_purchase(&self, product: Product) -> SdkResult<PurchaseOutcome> {
        self.ensure_active().await?;
        info!(product = %product.vendor_product_id, "Starting purchase");

        let response = self.purchases.purchase(&product).await?;
        let validation = response
            .validation
            .ok_or_else(|| RemoteError::unknown("Purchase validation response missing"))?;

        self.apply_purchaser_info_logged(&validation.purchaser_info)
            .await;
        info!(product = %product.vendor_product_id, "Purchase validated");

        Ok(PurchaseOutcome {
            purchaser_info: validation.purchaser_info,
            purchase_token: response.purchase_token,
            validation_result: validation.validation_result,
            product,
        })
    }

    /// Restores purchases and applies the resulting purchaser info.
    async fn restore_and_apply(&self) -> SdkResult<RestoreResponse> {
        let response = self
            .purchases
            .restore()
            .await?
            .ok_or_else(|| RemoteError::unknown("Restore validation response missing"))?;

        self.apply_purchaser_info_logged(&response.purchaser_info)
            .await;
        Ok(response)
    }

    /// `restore_purchases` slot body.
    pub(crate) async fn restore_purchases(&self) -> SdkResult<RestoreOutcome> {
        self.ensure_active().await?;
        let response = self.restore_and_apply().await?;
        info!(
            restored = response.validation_results.len(),
            "Purchases restored"
        );

        Ok(RestoreOutcome {
            purchaser_info: response.purchaser_info,
            validation_results: response.validation_results,
        })
    }

    /// `sync_purchases` slot body.
    pub(crate) async fn sync_purchases(&self) -> SdkResult<()> {
        self.ensure_active().await?;
        self.restore_and_apply().await.map(|_| ())
    }

    /// Start-up purchase sync. The result is only logged.
    pub(crate) async fn restore_in_background(&self) {
        if let Err(e) = self.restore_and_apply().await {
            debug!(error = %e, "Start-up purchase sync failed");
        }
    }
}
