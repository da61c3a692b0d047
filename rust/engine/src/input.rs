//! Where a player's next key press comes from.
//!
//! A human actor drains a bounded queue fed by the keyboard; an automated
//! actor makes one up. Both are a [`SlotSource`]: the actor asks for the next
//! event and gets either a slot to toggle, a wake event from the dealer that
//! arrived first, or cancellation.

use crossbeam_channel::{never, select, Receiver};
use std::collections::VecDeque;
use std::time::Duration;

use crate::player::PlayerWake;
use crate::shutdown::Shutdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    Slot(usize),
    Wake(PlayerWake),
    Shutdown,
}

pub trait SlotSource: Send {
    /// Blocks until a slot is available, a wake event arrives or the game
    /// shuts down. Wake events must be returned, never swallowed.
    fn next_event(&mut self, wake: &Receiver<PlayerWake>, shutdown: &Shutdown) -> SourceEvent;

    /// Discards input gathered for a deal that is no longer on the table.
    fn reset(&mut self) {}

    fn name(&self) -> &str;
}

/// Waits up to `timeout` for a wake event or cancellation.
/// Returns `None` if neither arrived in time.
pub fn poll_wake(
    wake: &Receiver<PlayerWake>,
    shutdown: &Shutdown,
    timeout: Duration,
) -> Option<SourceEvent> {
    if shutdown.is_triggered() {
        return Some(SourceEvent::Shutdown);
    }
    select! {
        recv(wake) -> msg => Some(msg.map_or(SourceEvent::Shutdown, SourceEvent::Wake)),
        recv(shutdown.receiver()) -> _ => Some(SourceEvent::Shutdown),
        default(timeout) => None,
    }
}

/// Blocks until a wake event or cancellation.
fn wait_for_wake(wake: &Receiver<PlayerWake>, shutdown: &Shutdown) -> SourceEvent {
    select! {
        recv(wake) -> msg => msg.map_or(SourceEvent::Shutdown, SourceEvent::Wake),
        recv(shutdown.receiver()) -> _ => SourceEvent::Shutdown,
    }
}

/// Human input: slot indices delivered through the actor's press queue.
#[derive(Debug)]
pub struct KeyboardSource {
    presses: Receiver<usize>,
}

impl KeyboardSource {
    pub fn new(presses: Receiver<usize>) -> Self {
        Self { presses }
    }
}

impl SlotSource for KeyboardSource {
    fn next_event(&mut self, wake: &Receiver<PlayerWake>, shutdown: &Shutdown) -> SourceEvent {
        if shutdown.is_triggered() {
            return SourceEvent::Shutdown;
        }
        let event = select! {
            recv(wake) -> msg => Some(msg.map_or(SourceEvent::Shutdown, SourceEvent::Wake)),
            recv(self.presses) -> msg => msg.ok().map(SourceEvent::Slot),
            recv(shutdown.receiver()) -> _ => Some(SourceEvent::Shutdown),
        };
        match event {
            Some(event) => event,
            None => {
                // keyboard detached; only the dealer can move us now
                self.presses = never();
                wait_for_wake(wake, shutdown)
            }
        }
    }

    fn reset(&mut self) {
        let dropped = self.presses.try_iter().count();
        if dropped > 0 {
            tracing::debug!(dropped, "stale presses discarded");
        }
    }

    fn name(&self) -> &str {
        "keyboard"
    }
}

/// Replays a fixed list of presses, one every `pace`, then idles.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    presses: VecDeque<usize>,
    pace: Duration,
}

impl ScriptedSource {
    pub fn new(presses: impl IntoIterator<Item = usize>, pace: Duration) -> Self {
        Self {
            presses: presses.into_iter().collect(),
            pace,
        }
    }
}

impl SlotSource for ScriptedSource {
    fn next_event(&mut self, wake: &Receiver<PlayerWake>, shutdown: &Shutdown) -> SourceEvent {
        if let Some(event) = poll_wake(wake, shutdown, self.pace) {
            return event;
        }
        match self.presses.pop_front() {
            Some(slot) => SourceEvent::Slot(slot),
            None => wait_for_wake(wake, shutdown),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
