//! # Listener Notification
//!
//! Holds at most one purchaser-info listener and at most one promo listener.
//! Registering replaces the previous listener; `None` unregisters.

use std::sync::{Arc, RwLock};

use subkit_core::{PromoOffer, PurchaserInfo};
use tracing::debug;

/// Called when the cached purchaser info changes.
pub trait PurchaserInfoListener: Send + Sync {
    fn on_purchaser_info_updated(&self, info: &PurchaserInfo);
}

impl<F> PurchaserInfoListener for F
where
    F: Fn(&PurchaserInfo) + Send + Sync,
{
    fn on_purchaser_info_updated(&self, info: &PurchaserInfo) {
        self(info)
    }
}

/// Called when a new promo is resolved.
pub trait PromoListener: Send + Sync {
    fn on_promo_received(&self, promo: &PromoOffer);
}

impl<F> PromoListener for F
where
    F: Fn(&PromoOffer) + Send + Sync,
{
    fn on_promo_received(&self, promo: &PromoOffer) {
        self(promo)
    }
}

/// Single-subscriber listener registry.
#[derive(Default)]
pub struct Notifier {
    purchaser_info: RwLock<Option<Arc<dyn PurchaserInfoListener>>>,
    promo: RwLock<Option<Arc<dyn PromoListener>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_purchaser_info_listener(&self, listener: Option<Arc<dyn PurchaserInfoListener>>) {
        if let Ok(mut slot) = self.purchaser_info.write() {
            *slot = listener;
        }
    }

    pub fn set_promo_listener(&self, listener: Option<Arc<dyn PromoListener>>) {
        if let Ok(mut slot) = self.promo.write() {
            *slot = listener;
        }
    }

    /// Invokes the purchaser-info listener, if any.
    ///
    /// The listener is cloned out of the lock first so it may re-register.
    pub fn purchaser_info_changed(&self, info: &PurchaserInfo) {
        let listener = self
            .purchaser_info
            .read()
            .map(|slot| slot.clone())
            .unwrap_or_default();

        match listener {
            Some(listener) => listener.on_purchaser_info_updated(info),
            None => debug!("Purchaser info changed with no listener registered"),
        }
    }

    /// Invokes the promo listener, if any.
    pub fn promo_received(&self, promo: &PromoOffer) {
        let listener = self.promo.read().map(|slot| slot.clone()).unwrap_or_default();

        if let Some(listener) = listener {
            listener.on_promo_received(promo);
        }
    }
}
