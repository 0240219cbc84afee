//! # Result Delivery
//!
//! How queued work hands results back to the caller.
//!
//! ## Two Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Result Delivery                                 │
//! │                                                                         │
//! │  Read-style (get_purchaser_info, get_paywalls, get_promo)              │
//! │  ─────────────────────────────────────────────────────                 │
//! │   UpdateSender ──mpsc──► Updates<T>                                    │
//! │     cached(v)            Update { Some(v), Cached, None }   (0 or 1)   │
//! │     synced(v, err)       Update { v,       Synced, err  }   (exactly 1)│
//! │                                                                         │
//! │  Mutating (activate, identify, make_purchase, ...)                     │
//! │  ─────────────────────────────────────────────────                     │
//! │   Responder ──oneshot──► Pending<T>  (awaits to SdkResult<T>)          │
//! │                                                                         │
//! │  A dropped receiver is fine: sends are ignored and the queue keeps      │
//! │  draining.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use subkit_core::DataState;
use tokio::sync::{mpsc, oneshot};

use crate::error::{SdkError, SdkResult};

// =============================================================================
// Two-phase updates
// =============================================================================

/// One delivery of a read-style operation.
#[derive(Debug)]
pub struct Update<T> {
    pub value: Option<T>,
    pub state: DataState,
    pub error: Option<SdkError>,
}

impl<T> Update<T> {
    pub fn is_cached(&self) -> bool {
        self.state == DataState::Cached
    }

    pub fn is_synced(&self) -> bool {
        self.state == DataState::Synced
    }

    /// Converts to a result, discarding the state tag.
    ///
    /// A successful delivery without a value maps to `Ok(None)`.
    pub fn into_result(self) -> SdkResult<Option<T>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

/// Sending half used by queued work.
pub struct UpdateSender<T> {
    tx: mpsc::UnboundedSender<Update<T>>,
}

impl<T> Clone for UpdateSender<T> {
    fn clone(&self) -> Self {
        UpdateSender {
            tx: self.tx.clone(),
        }
    }
}

impl<T> UpdateSender<T> {
    /// Delivers a locally cached value.
    pub fn cached(&self, value: T) {
        self.send(Update {
            value: Some(value),
            state: DataState::Cached,
            error: None,
        });
    }

    /// Delivers the outcome of the remote attempt.
    pub fn synced(&self, value: Option<T>, error: Option<SdkError>) {
        self.send(Update {
            value,
            state: DataState::Synced,
            error,
        });
    }

    /// Delivers a failed synced result without a value.
    pub fn failed(&self, error: SdkError) {
        self.synced(None, Some(error));
    }

    fn send(&self, update: Update<T>) {
        // Receiver gone: the caller stopped listening.
        let _ = self.tx.send(update);
    }
}

/// Receiving half returned to the caller.
pub struct Updates<T> {
    rx: mpsc::UnboundedReceiver<Update<T>>,
}

impl<T> Updates<T> {
    /// Creates a connected sender/receiver pair.
    pub fn channel() -> (UpdateSender<T>, Updates<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (UpdateSender { tx }, Updates { rx })
    }

    /// Waits for the next delivery. `None` once the operation is finished.
    pub async fn next(&mut self) -> Option<Update<T>> {
        self.rx.recv().await
    }

    /// Skips any cached delivery and waits for the synced one.
    pub async fn synced(mut self) -> Update<T> {
        while let Some(update) = self.rx.recv().await {
            if update.is_synced() {
                return update;
            }
        }
        Update {
            value: None,
            state: DataState::Synced,
            error: Some(SdkError::ChannelError(
                "Operation ended without a synced result".into(),
            )),
        }
    }

    /// Collects every delivery until the operation is finished.
    pub async fn collect(mut self) -> Vec<Update<T>> {
        let mut all = Vec::new();
        while let Some(update) = self.rx.recv().await {
            all.push(update);
        }
        all
    }
}

// =============================================================================
// Single result
// =============================================================================

/// Sending half of a single-result operation.
///
/// Cloneable so the queue watchdog can answer on behalf of a stalled slot;
/// the first send wins.
pub struct Responder<T> {
    tx: Arc<Mutex<Option<oneshot::Sender<SdkResult<T>>>>>,
}

impl<T> Clone for Responder<T> {
    fn clone(&self) -> Self {
        Responder {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Responder<T> {
    pub fn send(&self, result: SdkResult<T>) {
        let tx = self.tx.lock().map(|mut slot| slot.take()).unwrap_or_default();
        if let Some(tx) = tx {
            let _ = tx.send(result);
        }
    }
}

/// Awaitable result of a mutating operation.
pub struct Pending<T> {
    rx: oneshot::Receiver<SdkResult<T>>,
}

impl<T> Pending<T> {
    /// Creates a connected responder/pending pair.
    pub fn channel() -> (Responder<T>, Pending<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Responder {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            Pending { rx },
        )
    }

    /// A pending result that is already resolved.
    pub fn ready(result: SdkResult<T>) -> Pending<T> {
        let (responder, pending) = Self::channel();
        responder.send(result);
        pending
    }
}

impl<T> Future for Pending<T> {
    type Output = SdkResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(SdkError::ChannelError("Result channel closed".into()))
            })
        })
    }
}
