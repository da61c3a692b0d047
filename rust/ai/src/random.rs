//! Random key presses, the behavior of a computer player.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use setgame_engine::crossbeam_channel::Receiver;
use setgame_engine::input::{poll_wake, SlotSource, SourceEvent};
use setgame_engine::player::PlayerWake;
use setgame_engine::shutdown::Shutdown;

/// Presses a uniformly random slot every `pace`.
///
/// The pause doubles as the wait for the dealer: a wake event or shutdown
/// arriving during it is returned instead of a slot.
#[derive(Debug, Clone)]
pub struct RandomPresser {
    rng: StdRng,
    table_size: usize,
    pace: Duration,
}

impl RandomPresser {
    pub fn new(table_size: usize, pace: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            table_size,
            pace,
        }
    }
}

impl SlotSource for RandomPresser {
    fn next_event(&mut self, wake: &Receiver<PlayerWake>, shutdown: &Shutdown) -> SourceEvent {
        if let Some(event) = poll_wake(wake, shutdown, self.pace) {
            return event;
        }
        SourceEvent::Slot(self.rng.random_range(0..self.table_size.max(1)))
    }

    fn name(&self) -> &str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use setgame_engine::crossbeam_channel::unbounded;

    #[test]
    fn presses_stay_on_the_table() {
        let (_tx, rx) = unbounded();
        let shutdown = Shutdown::new();
        let mut bot = RandomPresser::new(5, Duration::ZERO, Some(3));
        for _ in 0..200 {
            match bot.next_event(&rx, &shutdown) {
                SourceEvent::Slot(slot) => assert!(slot < 5),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn same_seed_same_presses() {
        let (_tx, rx) = unbounded();
        let shutdown = Shutdown::new();
        let mut a = RandomPresser::new(12, Duration::ZERO, Some(42));
        let mut b = RandomPresser::new(12, Duration::ZERO, Some(42));
        for _ in 0..50 {
            assert_eq!(a.next_event(&rx, &shutdown), b.next_event(&rx, &shutdown));
        }
    }

    #[test]
    fn wake_events_take_priority_over_presses() {
        let (tx, rx) = unbounded();
        let shutdown = Shutdown::new();
        let mut bot = RandomPresser::new(12, Duration::from_secs(30), Some(1));
        tx.send(PlayerWake::Suspend).unwrap();
        assert_eq!(
            bot.next_event(&rx, &shutdown),
            SourceEvent::Wake(PlayerWake::Suspend)
        );
        shutdown.trigger();
        assert_eq!(bot.next_event(&rx, &shutdown), SourceEvent::Shutdown);
    }
}
