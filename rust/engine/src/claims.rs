use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::board::MARKERS_PER_CLAIM;

/// A completed selection waiting for the dealer's verdict.
///
/// Holds slot indices rather than cards so that a slot emptied by an
/// earlier commit is detected when the claim is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub player: usize,
    pub slots: [usize; MARKERS_PER_CLAIM],
}

/// Wake-up reasons delivered to the dealer thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerSignal {
    ClaimSubmitted,
    RoundExpired { round: u64 },
}

/// FIFO of pending claims. Players push, the dealer alone pops.
///
/// The dealer can also withdraw a queued claim when a commit makes it moot,
/// which is why this is a locked deque rather than a plain channel.
#[derive(Debug)]
pub struct ClaimQueue {
    pending: Mutex<VecDeque<Claim>>,
    signals: Sender<DealerSignal>,
}

impl ClaimQueue {
    pub fn new(signals: Sender<DealerSignal>) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            signals,
        }
    }

    /// Queues `claim` and wakes the dealer.
    pub fn submit(&self, claim: Claim) {
        self.pending.lock().push_back(claim);
        tracing::debug!(player = claim.player, slots = ?claim.slots, "claim submitted");
        if self.signals.send(DealerSignal::ClaimSubmitted).is_err() {
            tracing::debug!(player = claim.player, "dealer gone, claim left unsignalled");
        }
    }

    pub fn pop(&self) -> Option<Claim> {
        self.pending.lock().pop_front()
    }

    /// Drops `player`'s queued claim. Returns true if one was queued.
    pub fn withdraw(&self, player: usize) -> bool {
        let mut pending = self.pending.lock();
        let before = pending.len();
        pending.retain(|claim| claim.player != player);
        before != pending.len()
    }

    /// Discards every queued claim and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut pending = self.pending.lock();
        let discarded = pending.len();
        pending.clear();
        discarded
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
