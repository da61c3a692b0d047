//! Broadcast cancellation shared by every thread of a game.
//!
//! The signal is a channel that never carries a message: triggering it drops
//! the only sender, which makes every clone of the receiver ready at once.
//! Blocking waits put [`Shutdown::receiver`] in a `select!` next to their
//! normal wake source so cancellation always unblocks them.

use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Shutdown {
    inner: Arc<ShutdownInner>,
}

#[derive(Debug)]
struct ShutdownInner {
    triggered: AtomicBool,
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            inner: Arc::new(ShutdownInner {
                triggered: AtomicBool::new(false),
                sender: Mutex::new(Some(tx)),
                receiver: rx,
            }),
        }
    }

    /// Fires the signal. Calling it more than once is a no-op.
    pub fn trigger(&self) {
        if !self.inner.triggered.swap(true, Ordering::AcqRel) {
            tracing::debug!("shutdown triggered");
        }
        self.inner.sender.lock().take();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Becomes ready (disconnected) once the signal fires.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.inner.receiver
    }

    /// Sleeps for `duration` unless the signal fires first.
    /// Returns `false` when the sleep was cut short.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }
        if duration.is_zero() {
            return true;
        }
        select! {
            recv(self.inner.receiver) -> _ => false,
            default(duration) => !self.is_triggered(),
        }
    }
}
