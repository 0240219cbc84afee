//! # Promotional Offers
//!
//! A promo is advertised by the backend with a `variation_id`. It only becomes
//! usable once that variation is matched to a paywall from the catalog.
//!
//! ```text
//!   PromoOffer { variation_id: "v1", paywall: None }
//!        │
//!        │  resolve(&catalog.paywalls)
//!        ▼
//!   PromoOffer { variation_id: "v1", paywall: Some(Paywall { variation_id: "v1", .. }) }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{find_by_variation, Paywall};

/// Kind of promotional campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoType {
    Campaign,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A server-advertised promotional variation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PromoOffer {
    pub promo_type: PromoType,
    pub variation_id: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// Set once the variation has been matched against the catalog.
    pub paywall: Option<Paywall>,
}

impl PromoOffer {
    /// Creates an unresolved promo for a variation.
    pub fn new(variation_id: impl Into<String>) -> Self {
        PromoOffer {
            variation_id: variation_id.into(),
            ..Default::default()
        }
    }

    /// Matches this promo against `paywalls`.
    ///
    /// Returns the resolved promo, or `None` if no paywall carries the
    /// variation.
    pub fn resolve(&self, paywalls: &[Paywall]) -> Option<PromoOffer> {
        find_by_variation(paywalls, &self.variation_id).map(|paywall| PromoOffer {
            paywall: Some(paywall.clone()),
            ..self.clone()
        })
    }

    /// Returns true once a paywall is attached.
    pub fn is_resolved(&self) -> bool {
        self.paywall.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_matches_variation() {
        let paywalls = vec![Paywall::new("a", "v0"), Paywall::new("b", "v1")];
        let promo = PromoOffer::new("v1");

        let resolved = promo.resolve(&paywalls).unwrap();
        assert!(resolved.is_resolved());
        assert_eq!(resolved.paywall.unwrap().developer_id, "b");
        assert!(!promo.is_resolved());
    }

    #[test]
    fn test_resolve_unmatched() {
        let paywalls = vec![Paywall::new("a", "v0")];
        assert!(PromoOffer::new("v2").resolve(&paywalls).is_none());
    }

    #[test]
    fn test_unknown_promo_type_deserializes() {
        let promo: PromoOffer = serde_json::from_str(
            r#"{"promo_type":"flash_sale","variation_id":"v1","expires_at":null,"paywall":null}"#,
        )
        .unwrap();
        assert_eq!(promo.promo_type, PromoType::Unknown);
    }
}
