//! Wiring: builds the shared state of one game and runs every participant on
//! its own named thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::unbounded;

use crate::board::{Board, BoardSnapshot};
use crate::cards::SetRules;
use crate::claims::ClaimQueue;
use crate::config::GameConfig;
use crate::dealer::{Dealer, DealerParts, GameOutcome};
use crate::errors::GameError;
use crate::input::{KeyboardSource, SlotSource};
use crate::player::{ActorContext, PlayerActor, PlayerHandle, PlayerState};
use crate::shutdown::Shutdown;
use crate::surface::Surface;
use crate::timer::RoundTimer;

/// Who sits in a seat.
pub enum Seat {
    /// Presses arrive through [`GameHandle::press`]
    Human,
    /// Presses come from the given source
    Automated(Box<dyn SlotSource>),
}

impl std::fmt::Debug for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Seat::Human => f.write_str("Human"),
            Seat::Automated(source) => write!(f, "Automated({})", source.name()),
        }
    }
}

pub struct Game;

impl Game {
    /// Validates `config` and starts a game with one actor per seat.
    pub fn start(
        config: GameConfig,
        seats: Vec<Seat>,
        surface: Arc<dyn Surface>,
    ) -> Result<GameHandle, GameError> {
        let rules = Arc::new(config.rules());
        Self::start_with_rules(config, seats, surface, rules)
    }

    pub fn start_with_rules(
        config: GameConfig,
        seats: Vec<Seat>,
        surface: Arc<dyn Surface>,
        rules: Arc<dyn SetRules>,
    ) -> Result<GameHandle, GameError> {
        config.validate()?;
        if seats.len() != config.players {
            return Err(GameError::SeatMismatch {
                expected: config.players,
                actual: seats.len(),
            });
        }

        let shutdown = Shutdown::new();
        let board = Arc::new(Board::new(
            config.table_size,
            config.deck_size,
            config.players,
            surface.clone(),
            config.table_delay(),
            shutdown.clone(),
        ));
        let (signal_tx, signals) = unbounded();
        let claims = Arc::new(ClaimQueue::new(signal_tx.clone()));
        let (timer, round_timer) = RoundTimer::new(
            signal_tx,
            surface.clone(),
            config.turn_timeout_warning(),
            shutdown.clone(),
        );
        let ctx = ActorContext {
            board: board.clone(),
            claims: claims.clone(),
            surface: surface.clone(),
            shutdown: shutdown.clone(),
            point_freeze: config.point_freeze(),
            penalty_freeze: config.penalty_freeze(),
        };

        let mut players = Vec::with_capacity(seats.len());
        let mut actors = Vec::with_capacity(seats.len());
        for (id, seat) in seats.into_iter().enumerate() {
            let human = matches!(seat, Seat::Human);
            let (handle, mailbox) = PlayerHandle::new(id, human, config.input_queue_capacity);
            let source: Box<dyn SlotSource> = match (seat, mailbox.presses) {
                (Seat::Automated(source), _) => source,
                (Seat::Human, Some(presses)) => Box::new(KeyboardSource::new(presses)),
                (Seat::Human, None) => return Err(GameError::UnknownPlayer(id)),
            };
            actors.push(PlayerActor::new(handle.clone(), mailbox.wake, source, ctx.clone()));
            players.push(handle);
        }

        let mut dealer = Dealer::new(DealerParts {
            config,
            board: board.clone(),
            rules,
            players: players.clone(),
            claims,
            signals,
            timer,
            surface,
            shutdown: shutdown.clone(),
        });

        let mut crew: Vec<(String, JoinHandle<()>)> = Vec::new();
        let spawned = spawn("timer".to_string(), move || round_timer.run()).and_then(|t| {
            crew.push(("timer".to_string(), t));
            for (id, actor) in actors.into_iter().enumerate() {
                let name = format!("player-{id}");
                let thread = spawn(name.clone(), move || actor.run())?;
                crew.push((name, thread));
            }
            Ok(())
        });
        if let Err(err) = spawned {
            shutdown.trigger();
            for (_, thread) in crew.into_iter().rev() {
                let _ = thread.join();
            }
            return Err(err);
        }

        for (name, thread) in crew {
            dealer.attach(name, thread);
        }
        let dealer = match spawn("dealer".to_string(), move || dealer.run()) {
            Ok(dealer) => dealer,
            Err(err) => {
                // the dealer owned the crew; with it gone they only see the signal
                shutdown.trigger();
                return Err(err);
            }
        };
        tracing::info!(players = players.len(), "game started");

        Ok(GameHandle {
            players,
            board,
            shutdown,
            dealer: Some(dealer),
        })
    }
}

fn spawn<T, F>(name: String, body: F) -> Result<JoinHandle<T>, GameError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map_err(|source| GameError::Spawn { name, source })
}

/// Control over a running game. Dropping the handle aborts the game and
/// waits for every thread to finish.
pub struct GameHandle {
    players: Vec<Arc<PlayerHandle>>,
    board: Arc<Board>,
    shutdown: Shutdown,
    dealer: Option<JoinHandle<GameOutcome>>,
}

impl GameHandle {
    /// Forwards a key press to a human player. `Ok(false)` means the press
    /// was dropped: the player is not playing, is automated, or its queue is
    /// full.
    pub fn press(&self, player: usize, slot: usize) -> Result<bool, GameError> {
        let handle = self
            .players
            .get(player)
            .ok_or(GameError::UnknownPlayer(player))?;
        Ok(handle.press(slot))
    }

    pub fn players(&self) -> &[Arc<PlayerHandle>] {
        &self.players
    }

    pub fn state(&self, player: usize) -> Option<PlayerState> {
        self.players.get(player).map(|p| p.state())
    }

    pub fn scores(&self) -> Vec<u32> {
        self.players.iter().map(|p| p.score()).collect()
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    /// A clone of the game's shutdown signal.
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Asks every thread to stop. Returns immediately; use [`join`] to wait.
    ///
    /// [`join`]: GameHandle::join
    pub fn abort(&self) {
        if !self.shutdown.is_triggered() {
            tracing::info!("game aborted");
        }
        self.shutdown.trigger();
    }

    pub fn is_finished(&self) -> bool {
        self.dealer.as_ref().map_or(true, |d| d.is_finished())
    }

    /// Waits for the dealer to finish and returns the outcome.
    pub fn join(mut self) -> Result<GameOutcome, GameError> {
        let dealer = self
            .dealer
            .take()
            .ok_or_else(|| GameError::ThreadPanicked("dealer".to_string()))?;
        dealer
            .join()
            .map_err(|_| GameError::ThreadPanicked("dealer".to_string()))
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        if let Some(dealer) = self.dealer.take() {
            self.shutdown.trigger();
            if dealer.join().is_err() {
                tracing::error!("dealer thread panicked");
            }
        }
    }
}
