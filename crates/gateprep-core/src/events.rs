use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::SessionKind;

/// Every timer transition produces an Event.
/// Hosts that want a transition log subscribe to them; displays use snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        kind: SessionKind,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A session ran down to zero. `ended` is the kind that just finished.
    SessionCompleted {
        ended: SessionKind,
        at: DateTime<Utc>,
    },
    /// The next session was loaded after a completion; the timer is idle.
    SessionRearmed {
        kind: SessionKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
}
