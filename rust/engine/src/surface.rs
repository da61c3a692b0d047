use parking_lot::Mutex;
use std::time::Duration;

use crate::cards::Card;

/// Output side of the game: whatever renders the board, timers and scores.
///
/// Calls are fire-and-forget; nothing the surface does feeds back into game
/// logic. Board notifications are issued while the board lock is held, so
/// implementations must not call back into the board.
pub trait Surface: Send + Sync {
    fn place_card(&self, card: Card, slot: usize);
    fn remove_card(&self, slot: usize);
    fn place_marker(&self, player: usize, slot: usize);
    fn remove_marker(&self, player: usize, slot: usize);
    fn set_countdown(&self, remaining: Duration, warning: bool);
    fn set_freeze(&self, player: usize, remaining: Duration);
    fn set_score(&self, player: usize, score: u32);
    /// A set on the table, by ascending slot, shown when hints are enabled.
    fn show_hint(&self, slots: [usize; 3]);
    fn announce_winners(&self, players: &[usize]);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn place_card(&self, _card: Card, _slot: usize) {}
    fn remove_card(&self, _slot: usize) {}
    fn place_marker(&self, _player: usize, _slot: usize) {}
    fn remove_marker(&self, _player: usize, _slot: usize) {}
    fn set_countdown(&self, _remaining: Duration, _warning: bool) {}
    fn set_freeze(&self, _player: usize, _remaining: Duration) {}
    fn set_score(&self, _player: usize, _score: u32) {}
    fn show_hint(&self, _slots: [usize; 3]) {}
    fn announce_winners(&self, _players: &[usize]) {}
}

/// Emits every notification as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSurface;

impl Surface for TracingSurface {
    fn place_card(&self, card: Card, slot: usize) {
        tracing::debug!(card = card.id(), slot, "card placed");
    }
    fn remove_card(&self, slot: usize) {
        tracing::debug!(slot, "card removed");
    }
    fn place_marker(&self, player: usize, slot: usize) {
        tracing::trace!(player, slot, "marker placed");
    }
    fn remove_marker(&self, player: usize, slot: usize) {
        tracing::trace!(player, slot, "marker removed");
    }
    fn set_countdown(&self, remaining: Duration, warning: bool) {
        tracing::trace!(remaining_ms = remaining.as_millis() as u64, warning, "countdown");
    }
    fn set_freeze(&self, player: usize, remaining: Duration) {
        tracing::trace!(player, remaining_ms = remaining.as_millis() as u64, "freeze");
    }
    fn set_score(&self, player: usize, score: u32) {
        tracing::debug!(player, score, "score updated");
    }
    fn show_hint(&self, slots: [usize; 3]) {
        tracing::info!(?slots, "hint: set on table");
    }
    fn announce_winners(&self, players: &[usize]) {
        tracing::info!(winners = ?players, "winners announced");
    }
}

/// One captured surface notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    PlaceCard { card: Card, slot: usize },
    RemoveCard { slot: usize },
    PlaceMarker { player: usize, slot: usize },
    RemoveMarker { player: usize, slot: usize },
    Countdown { remaining: Duration, warning: bool },
    Freeze { player: usize, remaining: Duration },
    Score { player: usize, score: u32 },
    Hint([usize; 3]),
    Winners(Vec<usize>),
}

/// Surface that records notifications for later inspection
#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn push(&self, event: SurfaceEvent) {
        self.events.lock().push(event);
    }
}

impl Surface for RecordingSurface {
    fn place_card(&self, card: Card, slot: usize) {
        self.push(SurfaceEvent::PlaceCard { card, slot });
    }
    fn remove_card(&self, slot: usize) {
        self.push(SurfaceEvent::RemoveCard { slot });
    }
    fn place_marker(&self, player: usize, slot: usize) {
        self.push(SurfaceEvent::PlaceMarker { player, slot });
    }
    fn remove_marker(&self, player: usize, slot: usize) {
        self.push(SurfaceEvent::RemoveMarker { player, slot });
    }
    fn set_countdown(&self, remaining: Duration, warning: bool) {
        self.push(SurfaceEvent::Countdown { remaining, warning });
    }
    fn set_freeze(&self, player: usize, remaining: Duration) {
        self.push(SurfaceEvent::Freeze { player, remaining });
    }
    fn set_score(&self, player: usize, score: u32) {
        self.push(SurfaceEvent::Score { player, score });
    }
    fn show_hint(&self, slots: [usize; 3]) {
        self.push(SurfaceEvent::Hint(slots));
    }
    fn announce_winners(&self, players: &[usize]) {
        self.push(SurfaceEvent::Winners(players.to_vec()));
    }
}
