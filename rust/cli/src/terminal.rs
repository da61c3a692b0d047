//! Text rendering of the game for `play`.
//!
//! [`TerminalSurface`] turns surface notifications into lines and hands them
//! to the command loop over a channel; the loop owns the output stream.
//! Countdowns are only reported when the displayed whole second changes.

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use setgame_engine::cards::{Card, SetRules, StandardRules};
use setgame_engine::surface::Surface;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::ui::format_players;

const NOTHING_SHOWN: u64 = u64::MAX;

/// `#17 [2 2 1 0]`
pub fn render_card(rules: &dyn SetRules, card: Card) -> String {
    let features: Vec<String> = rules.features(card).iter().map(|f| f.to_string()).collect();
    format!("{} [{}]", card, features.join(" "))
}

fn whole_seconds(remaining: Duration) -> u64 {
    remaining.as_millis().div_ceil(1000) as u64
}

pub struct TerminalSurface {
    lines: Sender<String>,
    rules: StandardRules,
    countdown_shown: AtomicU64,
    freeze_shown: Mutex<HashMap<usize, u64>>,
}

impl TerminalSurface {
    pub fn new(lines: Sender<String>, rules: StandardRules) -> Self {
        Self {
            lines,
            rules,
            countdown_shown: AtomicU64::new(NOTHING_SHOWN),
            freeze_shown: Mutex::new(HashMap::new()),
        }
    }

    fn emit(&self, line: String) {
        // the loop stops listening once the game is over
        let _ = self.lines.send(line);
    }
}

impl Surface for TerminalSurface {
    fn place_card(&self, card: Card, slot: usize) {
        self.emit(format!("slot {:>2} <- {}", slot, render_card(&self.rules, card)));
    }

    fn remove_card(&self, slot: usize) {
        self.emit(format!("slot {:>2} cleared", slot));
    }

    fn place_marker(&self, player: usize, slot: usize) {
        self.emit(format!("player {} marks slot {}", player, slot));
    }

    fn remove_marker(&self, player: usize, slot: usize) {
        self.emit(format!("player {} unmarks slot {}", player, slot));
    }

    fn set_countdown(&self, remaining: Duration, warning: bool) {
        let secs = whole_seconds(remaining);
        if self.countdown_shown.swap(secs, Ordering::AcqRel) == secs {
            return;
        }
        if warning {
            self.emit(format!("time left: {}s (hurry)", secs));
        } else {
            self.emit(format!("time left: {}s", secs));
        }
    }

    fn set_freeze(&self, player: usize, remaining: Duration) {
        let secs = whole_seconds(remaining);
        let mut shown = self.freeze_shown.lock();
        if shown.insert(player, secs) == Some(secs) {
            return;
        }
        drop(shown);
        if secs == 0 {
            self.emit(format!("player {} may play again", player));
        } else {
            self.emit(format!("player {} frozen: {}s", player, secs));
        }
    }

    fn set_score(&self, player: usize, score: u32) {
        self.emit(format!("player {} found a set! score: {}", player, score));
    }

    fn show_hint(&self, slots: [usize; 3]) {
        self.emit(format!("hint: slots {} {} {}", slots[0], slots[1], slots[2]));
    }

    fn announce_winners(&self, players: &[usize]) {
        self.emit(format!("winner: {}", format_players(players)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn countdown_prints_once_per_second() {
        let (tx, rx) = unbounded();
        let surface = TerminalSurface::new(tx, StandardRules::default());
        surface.set_countdown(Duration::from_millis(2_500), false);
        surface.set_countdown(Duration::from_millis(2_100), false);
        surface.set_countdown(Duration::from_millis(1_900), false);
        surface.set_countdown(Duration::from_millis(900), true);
        surface.set_countdown(Duration::from_millis(10), true);
        surface.set_countdown(Duration::ZERO, true);

        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(
            lines,
            vec![
                "time left: 3s",
                "time left: 2s",
                "time left: 1s (hurry)",
                "time left: 0s (hurry)",
            ]
        );
    }

    #[test]
    fn freezes_are_tracked_per_player() {
        let (tx, rx) = unbounded();
        let surface = TerminalSurface::new(tx, StandardRules::default());
        surface.set_freeze(0, Duration::from_millis(3_000));
        surface.set_freeze(1, Duration::from_millis(3_000));
        surface.set_freeze(0, Duration::from_millis(2_999));
        surface.set_freeze(0, Duration::ZERO);

        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(
            lines,
            vec![
                "player 0 frozen: 3s",
                "player 1 frozen: 3s",
                "player 0 may play again",
            ]
        );
    }

    #[test]
    fn hints_name_the_slots() {
        let (tx, rx) = unbounded();
        let surface = TerminalSurface::new(tx, StandardRules::default());
        surface.show_hint([1, 4, 7]);
        assert_eq!(rx.try_recv().as_deref(), Ok("hint: slots 1 4 7"));
    }

    #[test]
    fn cards_show_their_features() {
        let rules = StandardRules::default();
        assert_eq!(render_card(&rules, Card::new(5)), "#5 [2 1 0 0]");
    }
}
