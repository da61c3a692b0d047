//! The shared table: which card sits in which slot, and which players hold
//! markers on which slots.
//!
//! All state lives behind one reader/writer lock. Players toggle their own
//! markers in shared mode, so any number of them can work concurrently; the
//! dealer places and removes cards in exclusive mode through
//! [`ExclusiveBoard`], which serializes every card mutation against every
//! marker operation. Marker cells are atomics because several readers write
//! to them at once, but each player only ever writes its own column while
//! in shared mode.

use parking_lot::{RwLock, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cards::{Card, SetRules};
use crate::shutdown::Shutdown;
use crate::surface::Surface;

/// Markers a player may hold at once; the third one completes a claim.
pub const MARKERS_PER_CLAIM: usize = 3;

/// Result of a single marker toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Placed,
    Removed,
    /// The toggle placed the player's third marker; carries the marked slots
    /// in ascending order.
    Completed([usize; MARKERS_PER_CLAIM]),
    /// Empty slot, fourth marker, closed board or out-of-range slot.
    Ignored,
}

/// A card taken off the board, with the players whose markers it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub card: Card,
    pub slot: usize,
    pub cleared: Vec<usize>,
}

/// Point-in-time copy of the board, taken under the shared lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub slots: Vec<Option<Card>>,
    /// Marked slots per player, ascending
    pub markers: Vec<Vec<usize>>,
    pub accepting: bool,
}

#[derive(Debug)]
struct Grid {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: Vec<Option<usize>>,
    markers: Vec<AtomicBool>,
    marker_counts: Vec<AtomicUsize>,
    accepting: bool,
}

impl Grid {
    fn marker(&self, players: usize, player: usize, slot: usize) -> &AtomicBool {
        &self.markers[slot * players + player]
    }

    fn marked_slots(&self, players: usize, table_size: usize, player: usize) -> Vec<usize> {
        (0..table_size)
            .filter(|&slot| self.marker(players, player, slot).load(Ordering::Acquire))
            .collect()
    }
}

pub struct Board {
    table_size: usize,
    players: usize,
    grid: RwLock<Grid>,
    surface: Arc<dyn Surface>,
    delay: Duration,
    shutdown: Shutdown,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("table_size", &self.table_size)
            .field("players", &self.players)
            .field("grid", &*self.grid.read())
            .finish()
    }
}

impl Board {
    pub fn new(
        table_size: usize,
        deck_size: usize,
        players: usize,
        surface: Arc<dyn Surface>,
        delay: Duration,
        shutdown: Shutdown,
    ) -> Self {
        let grid = Grid {
            slot_to_card: vec![None; table_size],
            card_to_slot: vec![None; deck_size],
            markers: (0..table_size * players)
                .map(|_| AtomicBool::new(false))
                .collect(),
            marker_counts: (0..players).map(|_| AtomicUsize::new(0)).collect(),
            accepting: false,
        };
        Self {
            table_size,
            players,
            grid: RwLock::new(grid),
            surface,
            delay,
            shutdown,
        }
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    pub fn players(&self) -> usize {
        self.players
    }

    /// Toggles `player`'s marker on `slot` in shared mode.
    ///
    /// When the toggle places the third marker, `on_complete` runs with the
    /// marked slots while the shared lock is still held, so a claim submitted
    /// from it is queued before the dealer can touch any of those slots.
    pub fn toggle_marker<F>(&self, player: usize, slot: usize, on_complete: F) -> Toggle
    where
        F: FnOnce([usize; MARKERS_PER_CLAIM]),
    {
        if player >= self.players || slot >= self.table_size {
            return Toggle::Ignored;
        }
        let grid = self.grid.read();
        if !grid.accepting || grid.slot_to_card[slot].is_none() {
            return Toggle::Ignored;
        }
        let cell = grid.marker(self.players, player, slot);
        let count = &grid.marker_counts[player];

        if cell.load(Ordering::Acquire) {
            if cell
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Toggle::Ignored;
            }
            count.fetch_sub(1, Ordering::AcqRel);
            self.surface.remove_marker(player, slot);
            tracing::trace!(player, slot, "marker removed");
            return Toggle::Removed;
        }

        let reserved = count.fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
            (c < MARKERS_PER_CLAIM).then_some(c + 1)
        });
        let Ok(previous) = reserved else {
            return Toggle::Ignored;
        };
        if cell
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            count.fetch_sub(1, Ordering::AcqRel);
            return Toggle::Ignored;
        }
        self.surface.place_marker(player, slot);
        tracing::trace!(player, slot, markers = previous + 1, "marker placed");

        if previous + 1 == MARKERS_PER_CLAIM {
            let marked = grid.marked_slots(self.players, self.table_size, player);
            if let Ok(slots) = <[usize; MARKERS_PER_CLAIM]>::try_from(marked) {
                on_complete(slots);
                return Toggle::Completed(slots);
            }
        }
        Toggle::Placed
    }

    /// Places a marker if there is none; a no-op otherwise.
    pub fn place_marker(&self, player: usize, slot: usize) -> Toggle {
        if self.has_marker(player, slot) {
            return Toggle::Ignored;
        }
        self.toggle_marker(player, slot, |_| {})
    }

    /// Removes a marker if there is one; a no-op otherwise.
    pub fn remove_marker(&self, player: usize, slot: usize) -> Toggle {
        if !self.has_marker(player, slot) {
            return Toggle::Ignored;
        }
        self.toggle_marker(player, slot, |_| {})
    }

    pub fn card_at(&self, slot: usize) -> Option<Card> {
        self.grid.read().slot_to_card.get(slot).copied().flatten()
    }

    pub fn slot_of(&self, card: Card) -> Option<usize> {
        self.grid
            .read()
            .card_to_slot
            .get(card.index())
            .copied()
            .flatten()
    }

    pub fn has_marker(&self, player: usize, slot: usize) -> bool {
        if player >= self.players || slot >= self.table_size {
            return false;
        }
        self.grid
            .read()
            .marker(self.players, player, slot)
            .load(Ordering::Acquire)
    }

    pub fn markers_of(&self, player: usize) -> Vec<usize> {
        if player >= self.players {
            return Vec::new();
        }
        self.grid
            .read()
            .marked_slots(self.players, self.table_size, player)
    }

    pub fn marker_count(&self, player: usize) -> usize {
        self.grid
            .read()
            .marker_counts
            .get(player)
            .map_or(0, |c| c.load(Ordering::Acquire))
    }

    /// Cards currently on the board, in slot order.
    pub fn cards(&self) -> Vec<Card> {
        self.grid.read().slot_to_card.iter().flatten().copied().collect()
    }

    pub fn is_accepting(&self) -> bool {
        self.grid.read().accepting
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let grid = self.grid.read();
        BoardSnapshot {
            slots: grid.slot_to_card.clone(),
            markers: (0..self.players)
                .map(|p| grid.marked_slots(self.players, self.table_size, p))
                .collect(),
            accepting: grid.accepting,
        }
    }

    /// Checks that the two card/slot mappings mirror each other and that no
    /// player holds more markers than a claim needs.
    pub fn is_consistent(&self) -> bool {
        let grid = self.grid.read();
        let forward = grid
            .slot_to_card
            .iter()
            .enumerate()
            .all(|(slot, card)| match card {
                Some(card) => grid.card_to_slot.get(card.index()) == Some(&Some(slot)),
                None => true,
            });
        let backward = grid
            .card_to_slot
            .iter()
            .enumerate()
            .all(|(id, slot)| match slot {
                Some(slot) => grid.slot_to_card[*slot].map(Card::index) == Some(id),
                None => true,
            });
        let counts = (0..self.players).all(|p| {
            let marked = grid.marked_slots(self.players, self.table_size, p).len();
            marked <= MARKERS_PER_CLAIM
                && marked == grid.marker_counts[p].load(Ordering::Acquire)
        });
        forward && backward && counts
    }

    /// Slot triples of every set currently on the board, each ascending.
    pub fn hints(&self, rules: &dyn SetRules) -> Vec<[usize; 3]> {
        let grid = self.grid.read();
        let cards: Vec<Card> = grid.slot_to_card.iter().flatten().copied().collect();
        rules
            .find_sets(&cards, usize::MAX)
            .into_iter()
            .filter_map(|set| {
                let mut slots = [0usize; 3];
                for (i, card) in set.iter().enumerate() {
                    slots[i] = grid.card_to_slot.get(card.index()).copied().flatten()?;
                }
                slots.sort_unstable();
                Some(slots)
            })
            .collect()
    }

    /// Takes the board in exclusive mode for a multi-step commit.
    pub fn exclusive(&self) -> ExclusiveBoard<'_> {
        ExclusiveBoard {
            board: self,
            grid: self.grid.write(),
        }
    }

    pub fn place_card(&self, card: Card, slot: usize) -> bool {
        self.exclusive().place_card(card, slot)
    }

    pub fn remove_card(&self, slot: usize) -> Option<Removal> {
        self.exclusive().remove_card(slot)
    }
}

/// Exclusive access to the board. Holding one blocks every marker toggle.
pub struct ExclusiveBoard<'a> {
    board: &'a Board,
    grid: RwLockWriteGuard<'a, Grid>,
}

impl ExclusiveBoard<'_> {
    /// Puts `card` into the empty `slot`. Returns `false` without changing
    /// anything if the slot is taken or the card is already on the board.
    pub fn place_card(&mut self, card: Card, slot: usize) -> bool {
        let board = self.board;
        if slot >= board.table_size
            || self.grid.slot_to_card[slot].is_some()
            || self.grid.card_to_slot.get(card.index()) != Some(&None)
        {
            return false;
        }
        board.shutdown.sleep(board.delay);
        self.grid.slot_to_card[slot] = Some(card);
        self.grid.card_to_slot[card.index()] = Some(slot);
        board.surface.place_card(card, slot);
        true
    }

    /// Empties `slot`, clearing every marker on it.
    pub fn remove_card(&mut self, slot: usize) -> Option<Removal> {
        let board = self.board;
        let card = self.grid.slot_to_card.get(slot).copied().flatten()?;
        board.shutdown.sleep(board.delay);
        let cleared: Vec<usize> = (0..board.players)
            .filter(|&player| self.clear_marker(player, slot))
            .collect();
        self.grid.slot_to_card[slot] = None;
        self.grid.card_to_slot[card.index()] = None;
        board.surface.remove_card(slot);
        Some(Removal {
            card,
            slot,
            cleared,
        })
    }

    pub fn remove_marker(&mut self, player: usize, slot: usize) -> bool {
        if player >= self.board.players || slot >= self.board.table_size {
            return false;
        }
        self.clear_marker(player, slot)
    }

    /// Removes every marker of every player.
    pub fn clear_markers(&mut self) {
        for slot in 0..self.board.table_size {
            for player in 0..self.board.players {
                self.clear_marker(player, slot);
            }
        }
    }

    pub fn card_at(&self, slot: usize) -> Option<Card> {
        self.grid.slot_to_card.get(slot).copied().flatten()
    }

    pub fn has_marker(&self, player: usize, slot: usize) -> bool {
        player < self.board.players
            && slot < self.board.table_size
            && self
                .grid
                .marker(self.board.players, player, slot)
                .load(Ordering::Acquire)
    }

    pub fn is_empty_slot(&self, slot: usize) -> bool {
        slot < self.board.table_size && self.grid.slot_to_card[slot].is_none()
    }

    /// Opens the board for marker toggles.
    pub fn open(&mut self) {
        self.grid.accepting = true;
    }

    /// Closes the board; toggles are ignored until it is opened again.
    pub fn close(&mut self) {
        self.grid.accepting = false;
    }

    fn clear_marker(&mut self, player: usize, slot: usize) -> bool {
        let players = self.board.players;
        let was_set = self
            .grid
            .marker(players, player, slot)
            .swap(false, Ordering::AcqRel);
        if was_set {
            self.grid.marker_counts[player].fetch_sub(1, Ordering::AcqRel);
            self.board.surface.remove_marker(player, slot);
        }
        was_set
    }
}
