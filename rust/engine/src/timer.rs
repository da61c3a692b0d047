use crossbeam_channel::{select, unbounded, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::claims::DealerSignal;
use crate::shutdown::Shutdown;
use crate::surface::Surface;

/// Countdown step while far from the deadline.
const COARSE_TICK: Duration = Duration::from_secs(1);
/// Countdown step inside the warning window.
const FINE_TICK: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Arm { round: u64, duration: Duration },
    Disarm,
}

/// The dealer's end of the timer.
#[derive(Debug, Clone)]
pub struct TimerControl {
    commands: Sender<TimerCommand>,
}

impl TimerControl {
    /// Starts (or restarts) the countdown for `round`.
    pub fn arm(&self, round: u64, duration: Duration) {
        self.send(TimerCommand::Arm { round, duration });
    }

    pub fn disarm(&self) {
        self.send(TimerCommand::Disarm);
    }

    fn send(&self, command: TimerCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!(?command, "timer gone, command dropped");
        }
    }
}

/// Counts a round down to zero and tells the dealer when it runs out.
pub struct RoundTimer {
    commands: Receiver<TimerCommand>,
    signals: Sender<DealerSignal>,
    surface: Arc<dyn Surface>,
    warning: Duration,
    shutdown: Shutdown,
}

impl RoundTimer {
    pub fn new(
        signals: Sender<DealerSignal>,
        surface: Arc<dyn Surface>,
        warning: Duration,
        shutdown: Shutdown,
    ) -> (TimerControl, RoundTimer) {
        let (tx, rx) = unbounded();
        let timer = RoundTimer {
            commands: rx,
            signals,
            surface,
            warning,
            shutdown,
        };
        (TimerControl { commands: tx }, timer)
    }

    pub fn run(self) {
        tracing::info!("round timer starting");
        let mut next = self.wait_for_arm();
        while let Some((round, duration)) = next {
            next = self.count_down(round, duration);
        }
        tracing::info!("round timer terminated");
    }

    /// Blocks until armed. `None` means shut down.
    fn wait_for_arm(&self) -> Option<(u64, Duration)> {
        loop {
            select! {
                recv(self.commands) -> msg => match msg {
                    Ok(TimerCommand::Arm { round, duration }) => return Some((round, duration)),
                    Ok(TimerCommand::Disarm) => continue,
                    Err(_) => return None,
                },
                recv(self.shutdown.receiver()) -> _ => return None,
            }
        }
    }

    /// Runs one countdown. Returns the next arming, if any, or `None` on
    /// shutdown.
    fn count_down(&self, round: u64, duration: Duration) -> Option<(u64, Duration)> {
        let deadline = Instant::now() + duration;
        tracing::debug!(round, duration_ms = duration.as_millis() as u64, "countdown armed");
        loop {
            if self.shutdown.is_triggered() {
                return None;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            let warning = remaining <= self.warning;
            self.surface.set_countdown(remaining, warning);
            if remaining.is_zero() {
                tracing::debug!(round, "round expired");
                if self.signals.send(DealerSignal::RoundExpired { round }).is_err() {
                    tracing::debug!(round, "dealer gone, expiry dropped");
                }
                return self.wait_for_arm();
            }
            let tick = if warning || remaining <= COARSE_TICK {
                FINE_TICK
            } else {
                COARSE_TICK
            };
            select! {
                recv(self.commands) -> msg => match msg {
                    Ok(TimerCommand::Arm { round, duration }) => return Some((round, duration)),
                    Ok(TimerCommand::Disarm) => return self.wait_for_arm(),
                    Err(_) => return None,
                },
                recv(self.shutdown.receiver()) -> _ => return None,
                default(tick.min(remaining)) => {}
            }
        }
    }
}
