//! # Paywall Catalog
//!
//! Paywall containers, products and the rules for merging a freshly fetched
//! catalog into the cached one.
//!
//! ## Merge Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Catalog Merge Pipeline                            │
//! │                                                                         │
//! │  remote containers + remote products                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  needs_enrichment? ── no ──► cache remote catalog verbatim             │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  billing_product_ids() ──► billing library query (subkit-sync)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply_billing_details()  ← drops containers without products          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  merge_containers(fresh, cached)                                       │
//! │                                                                         │
//! │    fresh  [a, b]          cached [b, c]                                │
//! │    result [a, b, c]       (fresh first, cached duplicates dropped)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

// =============================================================================
// Billing Details
// =============================================================================

/// Platform billing metadata for one product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillingDetails {
    /// Price in micro-units of the currency (1_000_000 = 1.00).
    pub price_micros: i64,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Price formatted for display by the billing library.
    pub localized_price: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// ISO 8601 period, e.g. "P1M".
    pub subscription_period: Option<String>,
    pub free_trial_period: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A purchasable product as configured remotely.
///
/// Platform billing fields are `None` until the catalog merge fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Product {
    pub vendor_product_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_micros: Option<i64>,
    pub currency_code: Option<String>,
    pub localized_price: Option<String>,
    pub subscription_period: Option<String>,
    pub free_trial_period: Option<String>,
    pub introductory_offer_eligibility: bool,
    /// Variation of the paywall this product was listed in, if any.
    pub variation_id: Option<String>,
    /// Developer id of the paywall this product was listed in, if any.
    pub paywall_id: Option<String>,
}

impl Product {
    /// Creates a bare product with only its vendor id.
    pub fn new(vendor_product_id: impl Into<String>) -> Self {
        Product {
            vendor_product_id: vendor_product_id.into(),
            ..Default::default()
        }
    }

    /// Returns true once billing metadata has been merged in.
    pub fn has_billing_details(&self) -> bool {
        self.price_micros.is_some() && self.currency_code.is_some()
    }

    /// Returns a copy with billing metadata applied.
    ///
    /// Remote titles/descriptions win over billing ones when present.
    pub fn with_billing_details(&self, details: &BillingDetails) -> Product {
        Product {
            vendor_product_id: self.vendor_product_id.clone(),
            title: self.title.clone().or_else(|| details.title.clone()),
            description: self
                .description
                .clone()
                .or_else(|| details.description.clone()),
            price_micros: Some(details.price_micros),
            currency_code: Some(details.currency_code.clone()),
            localized_price: Some(details.localized_price.clone()),
            subscription_period: details
                .subscription_period
                .clone()
                .or_else(|| self.subscription_period.clone()),
            free_trial_period: details
                .free_trial_period
                .clone()
                .or_else(|| self.free_trial_period.clone()),
            introductory_offer_eligibility: self.introductory_offer_eligibility,
            variation_id: self.variation_id.clone(),
            paywall_id: self.paywall_id.clone(),
        }
    }
}

// =============================================================================
// Paywall
// =============================================================================

/// A paywall container: one configured variation and its products.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paywall {
    /// Container id assigned by the developer. Used for deduplication.
    pub developer_id: String,
    /// Variation id, matched against promo offers.
    pub variation_id: String,
    pub revision: i64,
    pub is_promo: bool,
    #[serde(default)]
    pub products: Vec<Product>,
    pub custom_payload: Option<String>,
    pub visual_paywall: Option<String>,
}

impl Paywall {
    /// Creates an empty paywall container.
    pub fn new(developer_id: impl Into<String>, variation_id: impl Into<String>) -> Self {
        Paywall {
            developer_id: developer_id.into(),
            variation_id: variation_id.into(),
            ..Default::default()
        }
    }

    /// Adds a product (builder style).
    pub fn with_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    /// Returns true if at least one product is attached.
    pub fn has_products(&self) -> bool {
        !self.products.is_empty()
    }
}

// =============================================================================
// Paywall Catalog
// =============================================================================

/// Ordered paywall containers plus the flat product list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaywallCatalog {
    pub paywalls: Vec<Paywall>,
    pub products: Vec<Product>,
}

impl PaywallCatalog {
    /// Creates a catalog from its parts.
    pub fn new(paywalls: Vec<Paywall>, products: Vec<Product>) -> Self {
        PaywallCatalog { paywalls, products }
    }

    /// Finds the first paywall carrying the given variation.
    pub fn find_by_variation(&self, variation_id: &str) -> Option<&Paywall> {
        find_by_variation(&self.paywalls, variation_id)
    }

    /// Returns true if there are neither paywalls nor products.
    pub fn is_empty(&self) -> bool {
        self.paywalls.is_empty() && self.products.is_empty()
    }
}

/// Finds the first paywall in `paywalls` carrying `variation_id`.
pub fn find_by_variation<'a>(paywalls: &'a [Paywall], variation_id: &str) -> Option<&'a Paywall> {
    paywalls.iter().find(|p| p.variation_id == variation_id)
}

// =============================================================================
// Merge Rules
// =============================================================================

/// Returns true if a remote catalog has anything to enrich with billing data.
///
/// When no container carries products and the flat product list is empty,
/// the remote catalog is cached as-is without a billing query.
pub fn needs_enrichment(containers: &[Paywall], products: &[Product]) -> bool {
    !products.is_empty() || containers.iter().any(Paywall::has_products)
}

/// Collects the vendor ids to query from the billing library.
///
/// Order follows first appearance; duplicates are removed.
pub fn billing_product_ids(containers: &[Paywall], products: &[Product]) -> Vec<String> {
    let mut seen = HashSet::new();
    containers
        .iter()
        .filter(|c| c.has_products())
        .flat_map(|c| c.products.iter())
        .chain(products.iter())
        .filter(|p| seen.insert(p.vendor_product_id.clone()))
        .map(|p| p.vendor_product_id.clone())
        .collect()
}

/// Applies billing metadata to product-bearing containers and flat products.
///
/// Enriched containers come first. Containers without products follow them
/// when the flat product list is non-empty and are dropped otherwise.
/// Products missing from `details` are kept unchanged.
pub fn apply_billing_details(
    containers: &[Paywall],
    products: &[Product],
    details: &BTreeMap<String, BillingDetails>,
) -> (Vec<Paywall>, Vec<Product>) {
    let enrich = |p: &Product| match details.get(&p.vendor_product_id) {
        Some(d) => p.with_billing_details(d),
        None => p.clone(),
    };

    let (stocked, bare): (Vec<&Paywall>, Vec<&Paywall>) =
        containers.iter().partition(|c| c.has_products());

    let mut paywalls: Vec<Paywall> = stocked
        .into_iter()
        .map(|c| Paywall {
            products: c.products.iter().map(enrich).collect(),
            ..c.clone()
        })
        .collect();

    if !products.is_empty() {
        paywalls.extend(bare.into_iter().cloned());
    }

    let products = products.iter().map(enrich).collect();

    (paywalls, products)
}

/// Merges freshly arrived containers with the cached ones.
///
/// Fresh containers come first and win over cached containers with the same
/// developer id. Relative order is preserved inside each group.
pub fn merge_containers(fresh: Vec<Paywall>, cached: &[Paywall]) -> Vec<Paywall> {
    let fresh_ids: HashSet<&str> = fresh.iter().map(|c| c.developer_id.as_str()).collect();

    let tail: Vec<Paywall> = cached
        .iter()
        .filter(|c| !fresh_ids.contains(c.developer_id.as_str()))
        .cloned()
        .collect();

    let mut merged = fresh;
    merged.extend(tail);
    merged
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(paywalls: &[Paywall]) -> Vec<&str> {
        paywalls.iter().map(|p| p.developer_id.as_str()).collect()
    }

    fn details(price: i64) -> BillingDetails {
        BillingDetails {
            price_micros: price,
            currency_code: "USD".to_string(),
            localized_price: format!("${}", price / 1_000_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_containers_new_first_dedup_tail() {
        let fresh = vec![Paywall::new("a", "va"), Paywall::new("b", "vb-new")];
        let cached = vec![Paywall::new("b", "vb-old"), Paywall::new("c", "vc")];

        let merged = merge_containers(fresh, &cached);

        assert_eq!(ids(&merged), vec!["a", "b", "c"]);
        assert_eq!(merged[1].variation_id, "vb-new");
    }

    #[test]
    fn test_merge_containers_empty_cache() {
        let merged = merge_containers(vec![Paywall::new("a", "va")], &[]);
        assert_eq!(ids(&merged), vec!["a"]);
    }

    #[test]
    fn test_needs_enrichment() {
        let empty = vec![Paywall::new("a", "va")];
        assert!(!needs_enrichment(&empty, &[]));
        assert!(needs_enrichment(&empty, &[Product::new("p")]));

        let stocked = vec![Paywall::new("a", "va").with_product(Product::new("p"))];
        assert!(needs_enrichment(&stocked, &[]));
    }

    #[test]
    fn test_billing_product_ids_dedup() {
        let containers = vec![
            Paywall::new("a", "va")
                .with_product(Product::new("monthly"))
                .with_product(Product::new("yearly")),
            Paywall::new("b", "vb").with_product(Product::new("monthly")),
        ];
        let products = vec![Product::new("yearly"), Product::new("coins")];

        assert_eq!(
            billing_product_ids(&containers, &products),
            vec!["monthly", "yearly", "coins"]
        );
    }

    #[test]
    fn test_apply_billing_details_keeps_empty_containers_with_products() {
        let containers = vec![
            Paywall::new("empty", "ve"),
            Paywall::new("a", "va").with_product(Product::new("monthly")),
        ];
        let products = vec![Product::new("monthly"), Product::new("unknown")];
        let mut map = BTreeMap::new();
        map.insert("monthly".to_string(), details(9_990_000));

        let (paywalls, products) = apply_billing_details(&containers, &products, &map);

        assert_eq!(ids(&paywalls), vec!["a", "empty"]);
        assert_eq!(paywalls[0].products[0].price_micros, Some(9_990_000));
        assert!(products[0].has_billing_details());
        assert!(!products[1].has_billing_details());
    }

    #[test]
    fn test_apply_billing_details_drops_empty_containers_without_products() {
        let containers = vec![
            Paywall::new("a", "va").with_product(Product::new("monthly")),
            Paywall::new("empty", "ve"),
        ];
        let mut map = BTreeMap::new();
        map.insert("monthly".to_string(), details(9_990_000));

        let (paywalls, products) = apply_billing_details(&containers, &[], &map);

        assert_eq!(ids(&paywalls), vec!["a"]);
        assert!(products.is_empty());
    }

    #[test]
    fn test_with_billing_details_keeps_remote_title() {
        let mut product = Product::new("monthly");
        product.title = Some("Remote title".into());
        let mut d = details(1_000_000);
        d.title = Some("Store title".into());

        let enriched = product.with_billing_details(&d);
        assert_eq!(enriched.title.as_deref(), Some("Remote title"));
        assert_eq!(enriched.currency_code.as_deref(), Some("USD"));
    }

    #[test]
    fn test_find_by_variation() {
        let catalog = PaywallCatalog::new(
            vec![Paywall::new("a", "v1"), Paywall::new("b", "v2")],
            vec![],
        );
        assert_eq!(catalog.find_by_variation("v2").map(|p| p.developer_id.as_str()), Some("b"));
        assert!(catalog.find_by_variation("v3").is_none());
    }
}
