//! Async driver for [`IntervalTimer`].
//!
//! The controller owns the engine, a one-second ticker task on the Tokio
//! runtime and the snapshot publisher. Observers subscribe to a
//! `watch` channel and always see the latest snapshot first.
//!
//! Each tick is applied synchronously under the engine lock, so aborting the
//! ticker at its sleep can never leave a half-applied decrement. Every
//! spawned ticker carries a generation number; a ticker that already woke up
//! when it was superseded finds a newer generation and drops its tick.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::engine::{IntervalTimer, TimerPhase, TimerSnapshot, TICK_MS};
use super::session::{SessionDurations, SessionKind};
use crate::error::ConfigError;
use crate::events::Event;
use crate::storage::Preferences;

const EVENT_CAPACITY: usize = 64;

/// Supplies study and break lengths. Read at every start and re-arm.
pub trait DurationSource: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the stored durations are not positive.
    fn session_durations(&self) -> Result<SessionDurations, ConfigError>;
}

/// Receives one call per naturally completed session. Never called on reset.
pub trait NotificationSink: Send + Sync {
    fn session_ended(&self, ended: SessionKind);
}

impl DurationSource for SessionDurations {
    fn session_durations(&self) -> Result<SessionDurations, ConfigError> {
        Ok(*self)
    }
}

impl DurationSource for Preferences {
    fn session_durations(&self) -> Result<SessionDurations, ConfigError> {
        Preferences::session_durations(self)
    }
}

/// Preferences edited by the host while a controller is alive.
/// Changes only affect the next start or re-arm.
impl DurationSource for RwLock<Preferences> {
    fn session_durations(&self) -> Result<SessionDurations, ConfigError> {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .session_durations()
    }
}

/// Sink that only records completions in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn session_ended(&self, ended: SessionKind) {
        info!(kind = ended.label(), "session ended");
    }
}

struct TimerCell {
    timer: IntervalTimer,
    /// Durations read when the running session was started.
    armed_with: SessionDurations,
    generation: u64,
    disposed: bool,
}

struct Inner {
    cell: Mutex<TimerCell>,
    snapshots: watch::Sender<TimerSnapshot>,
    events: broadcast::Sender<Event>,
    durations: Arc<dyn DurationSource>,
    notifier: Arc<dyn NotificationSink>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, TimerCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_snapshot(&self, cell: &TimerCell) {
        let snapshot = cell.timer.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }

    fn publish(&self, cell: &TimerCell, event: Event) {
        debug!(?event, "timer transition");
        self.publish_snapshot(cell);
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Apply one tick for `generation`. Returns whether the ticker should keep going.
    fn apply_tick(&self, generation: u64) -> bool {
        let mut cell = self.lock();
        if cell.disposed
            || cell.generation != generation
            || cell.timer.phase() != TimerPhase::Running
        {
            return false;
        }

        let ended = cell.timer.kind();
        let Some(completed) = cell.timer.tick() else {
            self.publish_snapshot(&cell);
            return true;
        };

        // Completed is published on its own before the next kind is loaded.
        self.publish(&cell, completed);
        self.notifier.session_ended(ended);

        let durations = match self.durations.session_durations() {
            Ok(durations) => durations,
            Err(err) => {
                warn!(error = %err, "re-arming with the durations of the finished session");
                cell.armed_with
            }
        };
        if let Some(rearmed) = cell.timer.rearm(durations) {
            self.publish(&cell, rearmed);
        }
        cell.generation += 1;
        false
    }
}

/// Drives one study/break countdown and publishes its snapshots.
///
/// Commands take `&mut self`: one owner issues them, any number of
/// observers read through [`subscribe`](Self::subscribe). Commands that are
/// invalid for the current phase are silent no-ops.
///
/// `start` and `resume` spawn the ticker with `tokio::spawn`, so they must
/// be called from within a Tokio runtime.
///
/// After [`dispose`](Self::dispose) (or drop) every command is a no-op and
/// observers see `{Idle, Study, 0}`.
pub struct TimerController {
    inner: Arc<Inner>,
    ticker: Option<JoinHandle<()>>,
}

impl TimerController {
    pub fn new(durations: Arc<dyn DurationSource>, notifier: Arc<dyn NotificationSink>) -> Self {
        let (snapshots, _) = watch::channel(TimerSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                cell: Mutex::new(TimerCell {
                    timer: IntervalTimer::new(),
                    armed_with: SessionDurations::default(),
                    generation: 0,
                    disposed: false,
                }),
                snapshots,
                events,
                durations,
                notifier,
            }),
            ticker: None,
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> TimerSnapshot {
        *self.inner.snapshots.borrow()
    }

    /// Receiver that starts at the current snapshot and sees every later one.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Transition log. Ticks are not events; they only move the snapshot.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the current kind's session from `Idle` (or `Completed`).
    ///
    /// # Errors
    ///
    /// Returns the configuration source's error when the durations are
    /// invalid; the timer is left untouched in that case.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, since the ticker is spawned
    /// with `tokio::spawn`.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        let mut cell = self.inner.lock();
        if cell.disposed || !matches!(cell.timer.phase(), TimerPhase::Idle | TimerPhase::Completed) {
            return Ok(());
        }
        let durations = self.inner.durations.session_durations()?;
        let Some(event) = cell.timer.start(durations) else {
            return Ok(());
        };
        cell.armed_with = durations;
        cell.generation += 1;
        let generation = cell.generation;
        self.inner.publish(&cell, event);
        drop(cell);

        self.spawn_ticker(generation);
        Ok(())
    }

    pub fn pause(&mut self) {
        let mut cell = self.inner.lock();
        if cell.disposed {
            return;
        }
        if let Some(event) = cell.timer.pause() {
            cell.generation += 1;
            self.inner.publish(&cell, event);
            drop(cell);
            self.abort_ticker();
        }
    }

    /// Continue a paused session.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, since the ticker is spawned
    /// with `tokio::spawn`.
    pub fn resume(&mut self) {
        let mut cell = self.inner.lock();
        if cell.disposed {
            return;
        }
        if let Some(event) = cell.timer.resume() {
            cell.generation += 1;
            let generation = cell.generation;
            self.inner.publish(&cell, event);
            drop(cell);
            self.spawn_ticker(generation);
        }
    }

    /// Return to `{Idle, Study, 0}` and cancel any countdown.
    pub fn reset(&mut self) {
        let mut cell = self.inner.lock();
        if cell.disposed {
            return;
        }
        if let Some(event) = cell.timer.reset() {
            cell.generation += 1;
            self.inner.publish(&cell, event);
        }
        drop(cell);
        self.abort_ticker();
    }

    /// Cancel the countdown and retire the controller. Observers get a
    /// final `{Idle, Study, 0}` snapshot; later commands are no-ops.
    ///
    /// Safe to call any number of times; also runs on drop.
    pub fn dispose(&mut self) {
        let mut cell = self.inner.lock();
        if !cell.disposed {
            cell.disposed = true;
            cell.generation += 1;
            cell.timer.reset();
            self.inner.publish_snapshot(&cell);
            debug!("timer controller disposed");
        }
        drop(cell);
        self.abort_ticker();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().disposed
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn spawn_ticker(&mut self, generation: u64) {
        self.abort_ticker();
        let inner = Arc::clone(&self.inner);
        self.ticker = Some(tokio::spawn(async move {
            // Deadlines are fixed multiples of the period from spawn, so time
            // spent applying a tick does not push later ticks back.
            let period = Duration::from_millis(TICK_MS);
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if !inner.apply_tick(generation) {
                    break;
                }
            }
        }));
    }

    fn abort_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for TimerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerController")
            .field("snapshot", &self.snapshot())
            .field("ticking", &self.ticker.is_some())
            .finish()
    }
}
