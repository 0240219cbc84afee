//! # Command Queue
//!
//! Orders every public SDK operation into a single sequence. Exactly one
//! command runs at a time; the next one starts when the previous future has
//! returned.
//!
//! ## Actor Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Command Queue                                  │
//! │                                                                         │
//! │   Subkit::identify ──┐                                                  │
//! │   Subkit::get_*    ──┼──► CommandQueueHandle::enqueue (sync, in order)  │
//! │   Subkit::logout   ──┘              │                                   │
//! │                                     │ unbounded mpsc                    │
//! │                                     ▼                                   │
//! │                           ┌───────────────────┐                         │
//! │                           │ CommandQueue::run │                         │
//! │                           │                   │                         │
//! │                           │  slot.work.await  │ ◄── optional watchdog   │
//! │                           │  (one at a time)  │     (tokio::time)       │
//! │                           └─────────┬─────────┘                         │
//! │                                     │                                   │
//! │           shutdown ─────────────────┘                                   │
//! │           remaining slots aborted with SdkError::ShuttingDown           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A slot completes when its future returns, so every exit path (success,
//! failure, validation short-circuit) advances the queue. A slot that never
//! returns stalls the queue unless the watchdog is configured.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::SdkError;

// =============================================================================
// Queue Slot
// =============================================================================

/// One unit of queued work.
pub struct QueueSlot {
    label: &'static str,
    work: BoxFuture<'static, ()>,
    on_abort: Box<dyn FnOnce(SdkError) + Send>,
}

impl QueueSlot {
    /// Creates a slot.
    ///
    /// `on_abort` answers the caller when the work is dropped without
    /// running to completion (watchdog timeout or shutdown).
    pub fn new<F, A>(label: &'static str, work: F, on_abort: A) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
        A: FnOnce(SdkError) + Send + 'static,
    {
        QueueSlot {
            label,
            work: work.boxed(),
            on_abort: Box::new(on_abort),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn abort(self, err: SdkError) {
        debug!(command = self.label, error = %err, "Command aborted");
        (self.on_abort)(err);
    }
}

// =============================================================================
// Queue Handle
// =============================================================================

/// Handle for submitting work to the queue.
#[derive(Clone)]
pub struct CommandQueueHandle {
    slot_tx: mpsc::UnboundedSender<QueueSlot>,
    shutdown_tx: mpsc::Sender<oneshot::Sender<()>>,
    closed: Arc<AtomicBool>,
}

impl CommandQueueHandle {
    /// Appends a slot to the queue.
    ///
    /// Synchronous, so submission order is call order. After shutdown the
    /// slot is aborted immediately with [`SdkError::ShuttingDown`].
    pub fn enqueue(&self, slot: QueueSlot) {
        if self.closed.load(Ordering::Acquire) {
            slot.abort(SdkError::ShuttingDown);
            return;
        }

        if let Err(mpsc::error::SendError(slot)) = self.slot_tx.send(slot) {
            slot.abort(SdkError::ShuttingDown);
        }
    }

    /// Returns true once shutdown has been requested.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops the queue after the in-flight slot completes.
    ///
    /// Must only be awaited once the actor is running.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);

        let (ack_tx, ack_rx) = oneshot::channel();
        if self.shutdown_tx.try_send(ack_tx).is_err() {
            debug!("Command queue already shutting down");
            return;
        }
        let _ = ack_rx.await;
    }
}

// =============================================================================
// Queue Actor
// =============================================================================

/// The queue actor. Created together with its handle; run with [`start`].
///
/// [`start`]: CommandQueue::start
pub struct CommandQueue {
    slot_rx: mpsc::UnboundedReceiver<QueueSlot>,
    shutdown_rx: mpsc::Receiver<oneshot::Sender<()>>,
    command_timeout: Option<Duration>,
    closed: Arc<AtomicBool>,
}

impl CommandQueue {
    /// Creates the queue and its handle.
    ///
    /// Slots enqueued before [`start`](Self::start) are buffered and run in
    /// order once the actor starts.
    pub fn new(command_timeout: Option<Duration>) -> (CommandQueue, CommandQueueHandle) {
        let (slot_tx, slot_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let closed = Arc::new(AtomicBool::new(false));

        let queue = CommandQueue {
            slot_rx,
            shutdown_rx,
            command_timeout,
            closed: closed.clone(),
        };
        let handle = CommandQueueHandle {
            slot_tx,
            shutdown_tx,
            closed,
        };
        (queue, handle)
    }

    /// Spawns the actor task.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Aborts everything buffered without ever running it.
    pub fn discard(mut self) {
        self.drain();
    }

    async fn run(mut self) {
        info!(
            watchdog_secs = self.command_timeout.map(|t| t.as_secs()),
            "Command queue started"
        );

        let mut ack = None;
        loop {
            tokio::select! {
                biased;

                Some(done) = self.shutdown_rx.recv() => {
                    ack = Some(done);
                    break;
                }

                slot = self.slot_rx.recv() => match slot {
                    Some(slot) => Self::execute(slot, self.command_timeout).await,
                    None => break,
                },
            }
        }

        self.drain();
        info!("Command queue stopped");

        if let Some(done) = ack {
            let _ = done.send(());
        }
    }

    async fn execute(slot: QueueSlot, command_timeout: Option<Duration>) {
        let QueueSlot {
            label,
            work,
            on_abort,
        } = slot;
        debug!(command = label, "Command started");

        match command_timeout {
            None => work.await,
            Some(limit) => {
                if tokio::time::timeout(limit, work).await.is_err() {
                    error!(
                        command = label,
                        timeout_secs = limit.as_secs(),
                        "Command exceeded watchdog limit, aborting"
                    );
                    on_abort(SdkError::CommandTimedOut {
                        secs: limit.as_secs(),
                    });
                    return;
                }
            }
        }

        debug!(command = label, "Command completed");
    }

    fn drain(&mut self) {
        self.closed.store(true, Ordering::Release);
        self.slot_rx.close();

        let mut dropped = 0usize;
        while let Ok(slot) = self.slot_rx.try_recv() {
            slot.abort(SdkError::ShuttingDown);
            dropped += 1;
        }
        if dropped > 0 {
            warn!(dropped, "Aborted queued commands on shutdown");
        }
    }
}
