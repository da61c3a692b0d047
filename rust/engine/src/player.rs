use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::{Board, Toggle};
use crate::claims::{Claim, ClaimQueue};
use crate::input::{SlotSource, SourceEvent};
use crate::shutdown::Shutdown;
use crate::surface::Surface;

/// Longest single wait of the freeze countdown between display updates.
const FREEZE_TICK: Duration = Duration::from_secs(1);

/// Where a player is in its cycle.
///
/// `Waiting` and `Playing` are written by the actor itself; the two pending
/// states are written only by the dealer when it delivers a verdict.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlayerState {
    /// Suspended between rounds or while a claim awaits its verdict
    Waiting = 0,
    /// Accepting key presses
    Playing = 1,
    /// Claim rejected; a penalty freeze follows
    PendingPenalty = 2,
    /// Claim accepted; a point freeze follows
    PendingPoint = 3,
}

impl PlayerState {
    fn from_u8(v: u8) -> PlayerState {
        match v {
            1 => PlayerState::Playing,
            2 => PlayerState::PendingPenalty,
            3 => PlayerState::PendingPoint,
            _ => PlayerState::Waiting,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    Point,
    Penalty,
}

/// Typed wake-up delivered to an actor over its wake channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PlayerWake {
    /// A round is running: play, or keep playing after a void or moot claim
    Resume,
    /// The round ended
    Suspend,
    /// The dealer checked this player's claim
    Verdict(Verdict),
}

/// The part of a player shared between its actor thread, the dealer and
/// whoever delivers keyboard input.
#[derive(Debug)]
pub struct PlayerHandle {
    id: usize,
    state: AtomicU8,
    score: AtomicU32,
    wake: Sender<PlayerWake>,
    presses: Option<Sender<usize>>,
}

/// Receiving ends owned by the actor thread.
#[derive(Debug)]
pub struct Mailbox {
    pub wake: Receiver<PlayerWake>,
    pub presses: Option<Receiver<usize>>,
}

impl PlayerHandle {
    /// Creates a player in `Waiting`. Human players get a press queue of
    /// `capacity` slots.
    pub fn new(id: usize, human: bool, capacity: usize) -> (Arc<Self>, Mailbox) {
        let (wake_tx, wake_rx) = unbounded();
        let (press_tx, press_rx) = if human {
            let (tx, rx) = bounded(capacity);
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };
        let handle = Arc::new(Self {
            id,
            state: AtomicU8::new(PlayerState::Waiting as u8),
            score: AtomicU32::new(0),
            wake: wake_tx,
            presses: press_tx,
        });
        let mailbox = Mailbox {
            wake: wake_rx,
            presses: press_rx,
        };
        (handle, mailbox)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_human(&self) -> bool {
        self.presses.is_some()
    }

    pub fn state(&self) -> PlayerState {
        PlayerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Acquire)
    }

    /// Queues a key press for a human player.
    ///
    /// Presses are accepted only while the player is `Playing`; when the
    /// queue is full the newest press is dropped. Returns whether the press
    /// was queued.
    pub fn press(&self, slot: usize) -> bool {
        let Some(presses) = &self.presses else {
            return false;
        };
        if self.state() != PlayerState::Playing {
            return false;
        }
        match presses.try_send(slot) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(player = self.id, slot, "press queue full, press dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub(crate) fn wake(&self, event: PlayerWake) {
        if self.wake.send(event).is_err() {
            tracing::trace!(player = self.id, ?event, "actor gone, wake dropped");
        }
    }

    pub(crate) fn set_state(&self, state: PlayerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: PlayerState, to: PlayerState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Adds one point and returns the new score.
    pub(crate) fn add_point(&self) -> u32 {
        self.score.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Everything an actor shares with the rest of the game.
#[derive(Clone)]
pub struct ActorContext {
    pub board: Arc<Board>,
    pub claims: Arc<ClaimQueue>,
    pub surface: Arc<dyn Surface>,
    pub shutdown: Shutdown,
    pub point_freeze: Duration,
    pub penalty_freeze: Duration,
}

/// The thread body of one player.
pub struct PlayerActor {
    handle: Arc<PlayerHandle>,
    wake: Receiver<PlayerWake>,
    source: Box<dyn SlotSource>,
    ctx: ActorContext,
    round_active: bool,
}

impl PlayerActor {
    pub fn new(
        handle: Arc<PlayerHandle>,
        wake: Receiver<PlayerWake>,
        source: Box<dyn SlotSource>,
        ctx: ActorContext,
    ) -> Self {
        Self {
            handle,
            wake,
            source,
            ctx,
            round_active: false,
        }
    }

    pub fn run(mut self) {
        let id = self.handle.id();
        tracing::info!(player = id, source = self.source.name(), "player actor starting");
        while !self.ctx.shutdown.is_triggered() {
            let flow = match self.handle.state() {
                PlayerState::Waiting => self.idle(),
                PlayerState::Playing => self.play(),
                PlayerState::PendingPoint => self.freeze(self.ctx.point_freeze),
                PlayerState::PendingPenalty => self.freeze(self.ctx.penalty_freeze),
            };
            if flow.is_break() {
                break;
            }
        }
        tracing::info!(player = id, score = self.handle.score(), "player actor terminated");
    }

    fn idle(&mut self) -> ControlFlow<()> {
        select! {
            recv(self.wake) -> msg => match msg {
                Ok(event) => {
                    self.apply(event);
                    ControlFlow::Continue(())
                }
                Err(_) => ControlFlow::Break(()),
            },
            recv(self.ctx.shutdown.receiver()) -> _ => ControlFlow::Break(()),
        }
    }

    fn play(&mut self) -> ControlFlow<()> {
        match self.source.next_event(&self.wake, &self.ctx.shutdown) {
            SourceEvent::Slot(slot) => {
                self.press(slot);
                ControlFlow::Continue(())
            }
            SourceEvent::Wake(event) => {
                self.apply(event);
                ControlFlow::Continue(())
            }
            SourceEvent::Shutdown => ControlFlow::Break(()),
        }
    }

    fn press(&mut self, slot: usize) {
        let id = self.handle.id();
        let handle = &self.handle;
        let claims = &self.ctx.claims;
        let toggle = self.ctx.board.toggle_marker(id, slot, |slots| {
            handle.set_state(PlayerState::Waiting);
            claims.submit(Claim { player: id, slots });
        });
        if let Toggle::Completed(slots) = toggle {
            tracing::debug!(player = id, ?slots, "third marker placed, awaiting verdict");
        }
    }

    fn apply(&mut self, event: PlayerWake) {
        let id = self.handle.id();
        match event {
            PlayerWake::Resume => {
                self.source.reset();
                self.round_active = true;
                self.handle
                    .transition(PlayerState::Waiting, PlayerState::Playing);
            }
            PlayerWake::Suspend => {
                self.source.reset();
                self.round_active = false;
                self.handle
                    .transition(PlayerState::Playing, PlayerState::Waiting);
            }
            PlayerWake::Verdict(verdict) => {
                tracing::debug!(player = id, ?verdict, "verdict received");
            }
        }
    }

    /// Counts down a point or penalty freeze. Wake events arriving meanwhile
    /// only update whether a round is running; key presses stay queued.
    fn freeze(&mut self, duration: Duration) -> ControlFlow<()> {
        let id = self.handle.id();
        let until = Instant::now() + duration;
        loop {
            let remaining = until.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.ctx.surface.set_freeze(id, remaining);
            let tick = remaining.min(FREEZE_TICK);
            select! {
                recv(self.wake) -> msg => match msg {
                    Ok(event) => self.apply(event),
                    Err(_) => return ControlFlow::Break(()),
                },
                recv(self.ctx.shutdown.receiver()) -> _ => return ControlFlow::Break(()),
                default(tick) => {}
            }
        }
        self.ctx.surface.set_freeze(id, Duration::ZERO);
        let next = if self.round_active {
            PlayerState::Playing
        } else {
            PlayerState::Waiting
        };
        self.handle.set_state(next);
        ControlFlow::Continue(())
    }
}
