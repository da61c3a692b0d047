//! The dealer: sole owner of the deck, the only writer of cards and scores,
//! and the single arbiter of claims.
//!
//! Round lifecycle: shuffle and deal, await the end of the round while
//! draining the claim queue, collect the board back into the deck. The loop
//! stops when deck and board together hold no set (game over) or when the
//! shutdown signal fires (aborted).

use crossbeam_channel::{select, Receiver};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::board::{Board, ExclusiveBoard};
use crate::cards::{Card, SetRules};
use crate::claims::{Claim, ClaimQueue, DealerSignal};
use crate::config::GameConfig;
use crate::deck::Deck;
use crate::player::{PlayerHandle, PlayerState, PlayerWake, Verdict};
use crate::shutdown::Shutdown;
use crate::surface::Surface;
use crate::timer::TimerControl;

/// How a game finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEnd {
    /// Deck and board hold no more sets
    GameOver,
    /// The shutdown signal fired first
    Aborted,
}

/// Final result of a game, returned by the dealer thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub end: GameEnd,
    /// Score per player id
    pub scores: Vec<u32>,
    /// Every player holding the top score, ascending
    pub winners: Vec<usize>,
    /// Rounds dealt
    pub rounds: u64,
}

/// What the dealer decided about one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Point,
    Penalty,
    /// A claimed slot was emptied before the claim was checked
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    Expired,
    Exhausted,
    Aborted,
}

/// Ids of every player holding the highest score.
pub fn winners(scores: &[u32]) -> Vec<usize> {
    let Some(&best) = scores.iter().max() else {
        return Vec::new();
    };
    scores
        .iter()
        .enumerate()
        .filter(|(_, &score)| score == best)
        .map(|(id, _)| id)
        .collect()
}

/// The shared pieces a dealer is built from.
pub struct DealerParts {
    pub config: GameConfig,
    pub board: Arc<Board>,
    pub rules: Arc<dyn SetRules>,
    pub players: Vec<Arc<PlayerHandle>>,
    pub claims: Arc<ClaimQueue>,
    pub signals: Receiver<DealerSignal>,
    pub timer: TimerControl,
    pub surface: Arc<dyn Surface>,
    pub shutdown: Shutdown,
}

pub struct Dealer {
    config: GameConfig,
    board: Arc<Board>,
    deck: Deck,
    rules: Arc<dyn SetRules>,
    players: Vec<Arc<PlayerHandle>>,
    claims: Arc<ClaimQueue>,
    signals: Receiver<DealerSignal>,
    timer: TimerControl,
    surface: Arc<dyn Surface>,
    shutdown: Shutdown,
    slot_rng: ChaCha20Rng,
    round: u64,
    crew: Vec<(String, JoinHandle<()>)>,
}

impl Dealer {
    pub fn new(parts: DealerParts) -> Self {
        let seed = parts.config.seed.unwrap_or_else(rand::random);
        let deck = Deck::new_with_seed(parts.config.deck_size, seed);
        Self::with_deck(parts, deck, seed)
    }

    fn with_deck(parts: DealerParts, deck: Deck, seed: u64) -> Self {
        Self {
            config: parts.config,
            board: parts.board,
            deck,
            rules: parts.rules,
            players: parts.players,
            claims: parts.claims,
            signals: parts.signals,
            timer: parts.timer,
            surface: parts.surface,
            shutdown: parts.shutdown,
            slot_rng: ChaCha20Rng::seed_from_u64(seed.wrapping_add(1)),
            round: 0,
            crew: Vec::new(),
        }
    }

    /// Hands over a thread the dealer stops and joins when the game ends.
    /// Threads are joined in reverse order of attachment.
    pub fn attach(&mut self, name: impl Into<String>, thread: JoinHandle<()>) {
        self.crew.push((name.into(), thread));
    }

    pub fn run(mut self) -> GameOutcome {
        tracing::info!(
            players = self.players.len(),
            deck = self.deck.len(),
            table_size = self.board.table_size(),
            "dealer starting"
        );
        let end = loop {
            if self.shutdown.is_triggered() {
                break GameEnd::Aborted;
            }
            if !self.sets_remain() {
                break GameEnd::GameOver;
            }
            self.shuffle_and_deal();
            let round_end = if self.shutdown.is_triggered() {
                RoundEnd::Aborted
            } else {
                self.await_round_end()
            };
            tracing::info!(round = self.round, ?round_end, "round ended");
            if round_end == RoundEnd::Aborted {
                break GameEnd::Aborted;
            }
            self.collect();
        };

        self.timer.disarm();
        self.stop_crew();

        let scores: Vec<u32> = self.players.iter().map(|p| p.score()).collect();
        let winners = winners(&scores);
        if end == GameEnd::GameOver {
            self.surface.announce_winners(&winners);
        }
        tracing::info!(?end, rounds = self.round, ?scores, ?winners, "dealer terminated");
        GameOutcome {
            end,
            scores,
            winners,
            rounds: self.round,
        }
    }

    /// True while deck and board together still hold a set.
    fn sets_remain(&self) -> bool {
        let mut pool = self.deck.cards().to_vec();
        pool.extend(self.board.cards());
        !self.rules.find_sets(&pool, 1).is_empty()
    }

    fn shuffle_and_deal(&mut self) {
        self.round += 1;
        self.deck.shuffle();
        let board = Arc::clone(&self.board);
        {
            let mut table = board.exclusive();
            self.fill_empty_slots(&mut table);
            table.open();
        }
        if self.config.hints {
            let hints = board.hints(self.rules.as_ref());
            tracing::debug!(round = self.round, sets = hints.len(), "showing hints");
            for slots in hints {
                self.surface.show_hint(slots);
            }
        }
        self.timer.arm(self.round, self.config.turn_timeout());
        for player in &self.players {
            player.wake(PlayerWake::Resume);
        }
        tracing::info!(
            round = self.round,
            on_table = board.cards().len(),
            deck = self.deck.len(),
            "round started"
        );
    }

    /// Fills every empty slot from the top of the deck, visiting slots in
    /// random order.
    fn fill_empty_slots(&mut self, table: &mut ExclusiveBoard<'_>) {
        let mut slots: Vec<usize> = (0..self.board.table_size()).collect();
        slots.shuffle(&mut self.slot_rng);
        for slot in slots {
            if self.shutdown.is_triggered() {
                break;
            }
            if !table.is_empty_slot(slot) {
                continue;
            }
            let Some(card) = self.deck.draw() else {
                break;
            };
            if !table.place_card(card, slot) {
                self.deck.put_back(card);
            }
        }
    }

    /// Blocks until the round ends, checking queued claims on every wake.
    fn await_round_end(&mut self) -> RoundEnd {
        loop {
            if self.shutdown.is_triggered() {
                return RoundEnd::Aborted;
            }
            select! {
                recv(self.signals) -> msg => match msg {
                    Ok(DealerSignal::RoundExpired { round }) if round == self.round => {
                        return RoundEnd::Expired;
                    }
                    Ok(DealerSignal::RoundExpired { round }) => {
                        tracing::trace!(round, current = self.round, "stale expiry ignored");
                        continue;
                    }
                    Ok(DealerSignal::ClaimSubmitted) => {}
                    Err(_) => return RoundEnd::Aborted,
                },
                recv(self.shutdown.receiver()) -> _ => return RoundEnd::Aborted,
            }
            if self.shutdown.is_triggered() {
                return RoundEnd::Aborted;
            }
            self.process_claims();
            if !self.sets_remain() {
                return RoundEnd::Exhausted;
            }
        }
    }

    /// Checks every queued claim in submission order.
    fn process_claims(&mut self) {
        while let Some(claim) = self.claims.pop() {
            let outcome = self.verify(claim);
            tracing::debug!(
                round = self.round,
                player = claim.player,
                slots = ?claim.slots,
                ?outcome,
                "claim checked"
            );
            if self.shutdown.is_triggered() {
                break;
            }
        }
    }

    /// Rules on one claim under exclusive board access and delivers the
    /// verdict to the claimant.
    fn verify(&mut self, claim: Claim) -> ClaimOutcome {
        let Some(claimant) = self.players.get(claim.player).cloned() else {
            return ClaimOutcome::Void;
        };
        let board = Arc::clone(&self.board);
        let mut table = board.exclusive();

        let mut cards = [Card::new(0); 3];
        for (card, &slot) in cards.iter_mut().zip(&claim.slots) {
            match table.card_at(slot) {
                Some(found) if table.has_marker(claim.player, slot) => *card = found,
                _ => {
                    drop(table);
                    claimant.wake(PlayerWake::Resume);
                    return ClaimOutcome::Void;
                }
            }
        }

        if self.rules.is_valid_set(&cards) {
            let mut displaced = BTreeSet::new();
            for &slot in &claim.slots {
                if let Some(removal) = table.remove_card(slot) {
                    displaced.extend(removal.cleared.into_iter().filter(|&p| p != claim.player));
                }
            }
            for other in displaced {
                if self.claims.withdraw(other) {
                    tracing::debug!(player = other, by = claim.player, "queued claim made moot");
                    if let Some(handle) = self.players.get(other) {
                        handle.wake(PlayerWake::Resume);
                    }
                }
            }
            self.fill_empty_slots(&mut table);
            drop(table);

            let score = claimant.add_point();
            self.surface.set_score(claim.player, score);
            claimant.set_state(PlayerState::PendingPoint);
            claimant.wake(PlayerWake::Verdict(Verdict::Point));
            ClaimOutcome::Point
        } else {
            for &slot in &claim.slots {
                table.remove_marker(claim.player, slot);
            }
            drop(table);

            claimant.set_state(PlayerState::PendingPenalty);
            claimant.wake(PlayerWake::Verdict(Verdict::Penalty));
            ClaimOutcome::Penalty
        }
    }

    /// Ends the round: suspends the players, discards queued claims and
    /// sweeps every card back into the deck.
    fn collect(&mut self) {
        self.timer.disarm();
        for player in &self.players {
            player.wake(PlayerWake::Suspend);
        }
        let board = Arc::clone(&self.board);
        let mut table = board.exclusive();
        table.close();
        table.clear_markers();
        let discarded = self.claims.clear();

        let mut slots: Vec<usize> = (0..board.table_size()).collect();
        slots.shuffle(&mut self.slot_rng);
        for slot in slots {
            if let Some(removal) = table.remove_card(slot) {
                self.deck.put_back(removal.card);
            }
        }
        drop(table);
        tracing::debug!(round = self.round, discarded, deck = self.deck.len(), "board collected");
    }

    fn stop_crew(&mut self) {
        self.shutdown.trigger();
        while let Some((name, thread)) = self.crew.pop() {
            if thread.join().is_err() {
                tracing::error!(thread = %name, "thread panicked");
            }
        }
    }
}
