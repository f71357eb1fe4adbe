//! Interval timer engine.
//!
//! The engine is a pure state machine. It owns no clock and spawns nothing;
//! the caller invokes `tick()` once per elapsed second while the timer is
//! running (see [`TimerController`](super::TimerController) for the driver).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> Completed -> (re-arm) Idle
//!   ^________________ reset() from any phase ________________|
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = IntervalTimer::new();
//! timer.start(durations);
//! // Once per second:
//! if let Some(Event::SessionCompleted { .. }) = timer.tick() {
//!     timer.rearm(durations);
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::session::{SessionDurations, SessionKind, MS_PER_MINUTE};
use crate::events::Event;

/// Length of one countdown step.
pub const TICK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    #[default]
    Idle,
    Running,
    Paused,
    /// Transient: the session just ran out and the next kind is not loaded yet.
    Completed,
}

impl TimerPhase {
    pub fn label(self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Completed => "completed",
        }
    }
}

/// Immutable point-in-time view of the timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub kind: SessionKind,
    pub remaining_ms: u64,
}

impl TimerSnapshot {
    pub fn minutes(&self) -> u64 {
        self.remaining_ms / MS_PER_MINUTE
    }

    pub fn seconds(&self) -> u64 {
        (self.remaining_ms % MS_PER_MINUTE) / 1000
    }

    /// `mm:ss` rendering of the remaining time.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.minutes(), self.seconds())
    }
}

/// Study/break interval state machine.
///
/// Invalid commands for the current phase are no-ops and return `None`.
#[derive(Debug, Clone, Default)]
pub struct IntervalTimer {
    phase: TimerPhase,
    kind: SessionKind,
    /// Remaining time in milliseconds, always a whole number of seconds.
    remaining_ms: u64,
}

impl IntervalTimer {
    /// Create an idle timer with the study session selected and nothing armed.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            kind: self.kind,
            remaining_ms: self.remaining_ms,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the current kind's full duration and start counting down.
    pub fn start(&mut self, durations: SessionDurations) -> Option<Event> {
        match self.phase {
            TimerPhase::Idle | TimerPhase::Completed => {
                self.remaining_ms = durations.duration_ms(self.kind);
                self.phase = TimerPhase::Running;
                Some(Event::TimerStarted {
                    kind: self.kind,
                    duration_secs: self.remaining_ms / 1000,
                    at: Utc::now(),
                })
            }
            TimerPhase::Running | TimerPhase::Paused => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Running => {
                self.phase = TimerPhase::Paused;
                Some(Event::TimerPaused {
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Paused => {
                self.phase = TimerPhase::Running;
                Some(Event::TimerResumed {
                    remaining_ms: self.remaining_ms,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Back to `{Idle, Study, 0}` from any phase.
    pub fn reset(&mut self) -> Option<Event> {
        self.phase = TimerPhase::Idle;
        self.kind = SessionKind::Study;
        self.remaining_ms = 0;
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Apply one elapsed second.
    ///
    /// Returns `Some(Event::SessionCompleted)` when the countdown reaches
    /// zero. The timer is then `Completed` with the kind already flipped;
    /// the caller finishes the cycle with [`rearm`](Self::rearm).
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(TICK_MS);
        if self.remaining_ms > 0 {
            return None;
        }
        let ended = self.kind;
        self.kind = ended.flipped();
        self.phase = TimerPhase::Completed;
        Some(Event::SessionCompleted {
            ended,
            at: Utc::now(),
        })
    }

    /// Preload the (already flipped) kind's duration and return to `Idle`.
    pub fn rearm(&mut self, durations: SessionDurations) -> Option<Event> {
        if self.phase != TimerPhase::Completed {
            return None;
        }
        self.remaining_ms = durations.duration_ms(self.kind);
        self.phase = TimerPhase::Idle;
        Some(Event::SessionRearmed {
            kind: self.kind,
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn durations(study: u32, brk: u32) -> SessionDurations {
        SessionDurations::new(study, brk).unwrap()
    }

    fn run_ticks(timer: &mut IntervalTimer, n: u64) -> Vec<Event> {
        (0..n).filter_map(|_| timer.tick()).collect()
    }

    #[test]
    fn new_timer_is_idle_study_zero() {
        let timer = IntervalTimer::new();
        assert_eq!(timer.snapshot(), TimerSnapshot::default());
    }

    #[test]
    fn start_arms_study_duration() {
        let mut timer = IntervalTimer::new();
        assert!(timer.start(durations(25, 5)).is_some());
        assert_eq!(
            timer.snapshot(),
            TimerSnapshot {
                phase: TimerPhase::Running,
                kind: SessionKind::Study,
                remaining_ms: 1_500_000,
            }
        );
    }

    #[test]
    fn start_while_running_is_noop() {
        let mut timer = IntervalTimer::new();
        timer.start(durations(25, 5));
        timer.tick();
        assert!(timer.start(durations(50, 5)).is_none());
        assert_eq!(timer.remaining_ms(), 1_499_000);
    }

    #[test]
    fn start_pause_resume() {
        let mut timer = IntervalTimer::new();
        timer.start(durations(1, 1));
        run_ticks(&mut timer, 30);

        assert!(timer.pause().is_some());
        assert_eq!(timer.phase(), TimerPhase::Paused);
        assert_eq!(timer.remaining_ms(), 30_000);

        // Ticks while paused do nothing.
        assert!(timer.tick().is_none());
        assert_eq!(timer.remaining_ms(), 30_000);

        assert!(timer.resume().is_some());
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert_eq!(timer.remaining_ms(), 30_000);
    }

    #[test]
    fn invalid_transitions_are_noops() {
        let mut timer = IntervalTimer::new();
        assert!(timer.pause().is_none());
        assert!(timer.resume().is_none());
        assert!(timer.tick().is_none());
        assert!(timer.rearm(durations(25, 5)).is_none());
        assert_eq!(timer.snapshot(), TimerSnapshot::default());

        timer.start(durations(25, 5));
        let before = timer.snapshot();
        assert!(timer.resume().is_none());
        assert_eq!(timer.snapshot(), before);
    }

    #[test]
    fn countdown_completes_and_flips_kind() {
        let mut timer = IntervalTimer::new();
        timer.start(durations(25, 5));
        let events = run_ticks(&mut timer, 25 * 60);

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::SessionCompleted {
                ended: SessionKind::Study,
                ..
            }
        ));
        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert_eq!(timer.kind(), SessionKind::Break);
        assert_eq!(timer.remaining_ms(), 0);

        timer.rearm(durations(25, 5));
        assert_eq!(
            timer.snapshot(),
            TimerSnapshot {
                phase: TimerPhase::Idle,
                kind: SessionKind::Break,
                remaining_ms: 300_000,
            }
        );
    }

    #[test]
    fn start_from_completed_begins_next_kind() {
        let mut timer = IntervalTimer::new();
        timer.start(durations(1, 2));
        run_ticks(&mut timer, 60);
        assert_eq!(timer.phase(), TimerPhase::Completed);

        timer.start(durations(1, 2));
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert_eq!(timer.kind(), SessionKind::Break);
        assert_eq!(timer.remaining_ms(), 120_000);
    }

    #[test]
    fn reset_goes_to_beginning() {
        let mut timer = IntervalTimer::new();
        timer.start(durations(1, 1));
        run_ticks(&mut timer, 60);
        timer.rearm(durations(1, 1));
        assert_eq!(timer.kind(), SessionKind::Break);

        timer.reset();
        assert_eq!(timer.snapshot(), TimerSnapshot::default());
        timer.reset();
        assert_eq!(timer.snapshot(), TimerSnapshot::default());
    }

    #[test]
    fn reset_from_completed_skips_rearm() {
        let mut timer = IntervalTimer::new();
        timer.start(durations(1, 1));
        run_ticks(&mut timer, 60);
        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert_eq!(timer.kind(), SessionKind::Break);

        assert!(matches!(timer.reset(), Some(Event::TimerReset { .. })));
        assert_eq!(timer.snapshot(), TimerSnapshot::default());
        // Nothing left to re-arm.
        assert!(timer.rearm(durations(1, 1)).is_none());
        assert_eq!(timer.snapshot(), TimerSnapshot::default());
    }

    #[test]
    fn snapshot_clock_formatting() {
        let snap = TimerSnapshot {
            phase: TimerPhase::Running,
            kind: SessionKind::Study,
            remaining_ms: 1_499_000,
        };
        assert_eq!(snap.minutes(), 24);
        assert_eq!(snap.seconds(), 59);
        assert_eq!(snap.clock(), "24:59");
    }
}
