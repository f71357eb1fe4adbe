mod controller;
mod engine;
mod session;

pub use controller::{DurationSource, LogNotifier, NotificationSink, TimerController};
pub use engine::{IntervalTimer, TimerPhase, TimerSnapshot, TICK_MS};
pub use session::{SessionDurations, SessionKind};
