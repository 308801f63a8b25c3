//! Countdown scheduler running on its own thread.
//!
//! The thread only counts. It never touches the page; expiries are handed to
//! the orchestrator through the event callback and it decides what to run.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use sentinel_logging::{sentinel_debug, sentinel_info};

pub const DEFAULT_STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Running { remaining: u64, period: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    Tick { remaining: u64 },
    Expired,
}

/// Pure countdown state machine. `remaining` stays within `[0, period]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    state: SchedulerState,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running { .. })
    }

    /// (Re)starts the countdown. A zero period is treated as one step.
    pub fn start(&mut self, period_secs: u64) {
        let period = period_secs.max(1);
        self.state = SchedulerState::Running {
            remaining: period,
            period,
        };
    }

    pub fn stop(&mut self) {
        self.state = SchedulerState::Idle;
    }

    /// Advances one step: emits `Tick`, and `Expired` plus a reset when the
    /// countdown reaches zero.
    pub fn step(&mut self) -> Vec<SchedulerEvent> {
        let SchedulerState::Running { remaining, period } = self.state else {
            return Vec::new();
        };
        let remaining = remaining.saturating_sub(1);
        let mut events = vec![SchedulerEvent::Tick { remaining }];
        if remaining == 0 {
            events.push(SchedulerEvent::Expired);
            self.state = SchedulerState::Running {
                remaining: period,
                period,
            };
        } else {
            self.state = SchedulerState::Running { remaining, period };
        }
        events
    }
}

enum SchedulerCommand {
    Start { period_secs: u64 },
    Stop,
}

/// Owns the countdown thread. Dropping the handle ends the thread.
pub struct SchedulerHandle {
    cmd_tx: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    pub fn spawn<F>(step: Duration, on_event: F) -> Self
    where
        F: Fn(SchedulerEvent) + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        thread::spawn(move || run_countdown(step, cmd_rx, on_event));
        Self { cmd_tx }
    }

    pub fn start(&self, period_secs: u64) {
        let _ = self.cmd_tx.send(SchedulerCommand::Start { period_secs });
    }

    pub fn stop(&self) {
        let _ = self.cmd_tx.send(SchedulerCommand::Stop);
    }
}

fn run_countdown<F>(step: Duration, cmd_rx: mpsc::Receiver<SchedulerCommand>, on_event: F)
where
    F: Fn(SchedulerEvent),
{
    let mut countdown = Countdown::new();
    // Absolute deadline of the next step; `None` while idle.
    let mut next_step: Option<Instant> = None;

    loop {
        let command = match next_step {
            Some(deadline) => {
                match cmd_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match cmd_rx.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        match command {
            Some(SchedulerCommand::Start { period_secs }) => {
                sentinel_info!("Scheduler started with period {}s", period_secs);
                countdown.start(period_secs);
                next_step = Some(Instant::now() + step);
            }
            Some(SchedulerCommand::Stop) => {
                sentinel_info!("Scheduler stopped");
                countdown.stop();
                next_step = None;
            }
            None => {
                for event in countdown.step() {
                    on_event(event);
                }
                next_step =
                    next_step.map(|deadline| next_deadline(deadline, step, Instant::now()));
            }
        }
    }
    sentinel_debug!("Scheduler thread exiting");
}

/// Next step deadline after `deadline` fired at `now`. Steps missed while the
/// thread was stalled are dropped, never replayed back to back.
fn next_deadline(deadline: Instant, step: Duration, now: Instant) -> Instant {
    let next = deadline + step;
    if next <= now {
        sentinel_debug!("Scheduler fell behind by {:?}, re-anchoring", now - deadline);
        now + step
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_time_steps_keep_absolute_cadence() {
        let start = Instant::now();
        let step = Duration::from_millis(100);
        let fired = start + step;
        assert_eq!(
            next_deadline(fired, step, fired + Duration::from_millis(5)),
            fired + step
        );
    }

    #[test]
    fn missed_steps_are_dropped_after_a_stall() {
        let start = Instant::now();
        let step = Duration::from_millis(100);
        let now = start + Duration::from_secs(3);
        assert_eq!(next_deadline(start, step, now), now + step);
    }

    #[test]
    fn idle_countdown_emits_nothing() {
        let mut countdown = Countdown::new();
        assert!(countdown.step().is_empty());
        assert_eq!(countdown.state(), SchedulerState::Idle);
    }

    #[test]
    fn zero_period_fires_every_step() {
        let mut countdown = Countdown::new();
        countdown.start(0);
        assert_eq!(
            countdown.step(),
            vec![SchedulerEvent::Tick { remaining: 0 }, SchedulerEvent::Expired]
        );
        assert_eq!(
            countdown.state(),
            SchedulerState::Running {
                remaining: 1,
                period: 1
            }
        );
    }

    #[test]
    fn restart_replaces_running_countdown() {
        let mut countdown = Countdown::new();
        countdown.start(10);
        countdown.step();
        countdown.start(3);
        assert_eq!(
            countdown.state(),
            SchedulerState::Running {
                remaining: 3,
                period: 3
            }
        );
    }
}
