use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::input::Gesture;
use crate::timer::{Recovery, TimerState, Transition, TransitionKind};

/// Every state change the controller makes produces an Event.
/// Hosts print or log them; nothing in the core consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TransitionApplied {
        kind: TransitionKind,
        from: TimerState,
        to: TimerState,
        end_time: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    /// Cold start finished.
    SessionRecovered {
        outcome: String,
        state: TimerState,
        end_time: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    /// A press was classified but did not change state.
    GestureIgnored {
        gesture: Gesture,
        state: TimerState,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        end_time: Option<DateTime<Utc>>,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn transition(transition: &Transition, now_ms: u64) -> Self {
        Event::TransitionApplied {
            kind: transition.kind,
            from: transition.from,
            to: transition.session.state(),
            end_time: transition.session.end_time_ms().and_then(to_datetime),
            at: to_datetime(now_ms).unwrap_or_default(),
        }
    }

    pub fn recovered(recovery: &Recovery, now_ms: u64) -> Self {
        let session = recovery.session();
        let outcome = match recovery {
            Recovery::Fresh => "fresh",
            Recovery::Resumed { .. } => "resumed",
            Recovery::CaughtUp { .. } => "caught_up",
            Recovery::Collapsed { .. } => "collapsed",
        };
        Event::SessionRecovered {
            outcome: outcome.to_string(),
            state: session.state(),
            end_time: session.end_time_ms().and_then(to_datetime),
            at: to_datetime(now_ms).unwrap_or_default(),
        }
    }

    pub fn ignored(gesture: Gesture, state: TimerState, now_ms: u64) -> Self {
        Event::GestureIgnored {
            gesture,
            state,
            at: to_datetime(now_ms).unwrap_or_default(),
        }
    }
}

/// Epoch milliseconds to a UTC timestamp.
pub fn to_datetime(epoch_ms: u64) -> Option<DateTime<Utc>> {
    let ms = i64::try_from(epoch_ms).ok()?;
    Utc.timestamp_millis_opt(ms).single()
}
