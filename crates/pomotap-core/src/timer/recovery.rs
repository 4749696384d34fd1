//! Startup recovery.
//!
//! Given whatever was persisted before the process went away and the current
//! time, work out which state the timer would be in had it kept running.
//! Only one step is looked ahead: if the interval that should have followed
//! the recorded one has also run out, the timer collapses to `Idle` instead
//! of resuming somewhere deep inside a stale cycle.

use serde::Serialize;

use super::state::{TimerSession, TimerState, TransitionKind};
use crate::storage::SessionSnapshot;

/// Outcome of [`recover`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Recovery {
    /// Nothing was persisted.
    Fresh,
    /// The recorded interval is still running.
    Resumed { session: TimerSession },
    /// The recorded interval ended and the one after it is still running.
    CaughtUp {
        kind: TransitionKind,
        from: TimerState,
        elapsed_ms: u64,
        session: TimerSession,
    },
    /// The record was stale, idle, or carried an unknown state label.
    Collapsed {
        last_state: Option<TimerState>,
        elapsed_ms: Option<u64>,
    },
}

impl Recovery {
    /// The session the timer continues with.
    pub fn session(&self) -> TimerSession {
        match self {
            Recovery::Resumed { session } | Recovery::CaughtUp { session, .. } => *session,
            Recovery::Fresh | Recovery::Collapsed { .. } => TimerSession::idle(),
        }
    }

    /// Whether the store has to be rewritten to match this outcome.
    ///
    /// Only a resumed interval is already stored as-is. A fresh start still
    /// rewrites, which clears any half-written or corrupt record.
    pub fn needs_persist(&self) -> bool {
        !matches!(self, Recovery::Resumed { .. })
    }
}

/// One-step catch-up from a persisted snapshot.
pub fn recover(snapshot: Option<SessionSnapshot>, now_ms: u64) -> Recovery {
    let Some(snapshot) = snapshot else {
        return Recovery::Fresh;
    };
    let last_end = snapshot.end_time_ms;

    let last_state = match snapshot.state {
        Some(state) if state.is_active() => state,
        other => {
            return Recovery::Collapsed {
                last_state: other,
                elapsed_ms: None,
            }
        }
    };

    if last_end > now_ms {
        return match TimerSession::active(last_state, last_end) {
            Ok(session) => Recovery::Resumed { session },
            Err(_) => Recovery::Collapsed {
                last_state: Some(last_state),
                elapsed_ms: None,
            },
        };
    }

    let elapsed_ms = now_ms - last_end;
    let collapsed = Recovery::Collapsed {
        last_state: Some(last_state),
        elapsed_ms: Some(elapsed_ms),
    };
    let Some(next) = last_state.next_interval() else {
        return collapsed;
    };
    let Some(next_duration) = next.duration_ms() else {
        return collapsed;
    };
    if elapsed_ms >= next_duration {
        return collapsed;
    }

    match TimerSession::active(next, last_end.saturating_add(next_duration)) {
        Ok(session) => Recovery::CaughtUp {
            kind: TransitionKind::entering(next),
            from: last_state,
            elapsed_ms,
            session,
        },
        Err(_) => collapsed,
    }
}
