//! # gateprep core library
//!
//! Core logic for gateprep, a study tracker for exam preparation. The CLI
//! binary is a thin front end over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a pure study/break state machine ([`IntervalTimer`]) and an
//!   async driver ([`TimerController`]) that ticks it once per second on the
//!   Tokio runtime and publishes immutable snapshots
//! - **Storage**: TOML-based user preferences that double as the timer's
//!   duration source
//! - **Progress**: completed-topic ratio per subject
//! - **Exam**: days-left countdown
//!
//! ## Key Components
//!
//! - [`TimerController`]: the interval timer as seen by a UI host
//! - [`Preferences`]: user preference management
//! - [`DurationSource`] / [`NotificationSink`]: the controller's collaborators

pub mod error;
pub mod events;
pub mod exam;
pub mod progress;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use progress::{SubjectProgress, TopicStatus};
pub use storage::{PreferenceFile, Preferences};
pub use timer::{
    DurationSource, IntervalTimer, LogNotifier, NotificationSink, SessionDurations, SessionKind,
    TimerController, TimerPhase, TimerSnapshot,
};
