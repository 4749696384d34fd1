use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Length of a focus interval in milliseconds (25 minutes).
pub const FOCUS_DURATION_MS: u64 = 25 * 60 * 1000;

/// Length of a break interval in milliseconds (5 minutes).
pub const BREAK_DURATION_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Focus,
    Break,
}

impl TimerState {
    /// Label written to the persistent store.
    pub fn label(self) -> &'static str {
        match self {
            TimerState::Idle => "IDLE",
            TimerState::Focus => "FOCUS",
            TimerState::Break => "BREAK",
        }
    }

    /// Inverse of [`TimerState::label`]. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "IDLE" => Some(TimerState::Idle),
            "FOCUS" => Some(TimerState::Focus),
            "BREAK" => Some(TimerState::Break),
            _ => None,
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, TimerState::Idle)
    }

    /// Interval length for active states.
    pub fn duration_ms(self) -> Option<u64> {
        match self {
            TimerState::Idle => None,
            TimerState::Focus => Some(FOCUS_DURATION_MS),
            TimerState::Break => Some(BREAK_DURATION_MS),
        }
    }

    /// The state an interval hands over to when it expires.
    pub fn next_interval(self) -> Option<Self> {
        match self {
            TimerState::Idle => None,
            TimerState::Focus => Some(TimerState::Break),
            TimerState::Break => Some(TimerState::Focus),
        }
    }
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TimerState::Idle => "idle",
            TimerState::Focus => "focus",
            TimerState::Break => "break",
        })
    }
}

/// The live timer record: current state plus the instant the running
/// interval ends.
///
/// `end_time_ms` is present exactly when the state is active. The fields are
/// private so the only ways in are [`TimerSession::idle`] and
/// [`TimerSession::active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSession", into = "RawSession")]
pub struct TimerSession {
    state: TimerState,
    end_time_ms: Option<u64>,
}

impl TimerSession {
    pub const fn idle() -> Self {
        Self {
            state: TimerState::Idle,
            end_time_ms: None,
        }
    }

    /// An active interval ending at `end_time_ms`.
    ///
    /// # Errors
    /// Returns [`SessionError::IdleWithEndTime`] when `state` is `Idle`.
    pub fn active(state: TimerState, end_time_ms: u64) -> Result<Self, SessionError> {
        if !state.is_active() {
            return Err(SessionError::IdleWithEndTime);
        }
        Ok(Self {
            state,
            end_time_ms: Some(end_time_ms),
        })
    }

    /// Start a fresh interval of `state` at `now_ms`.
    pub(crate) fn starting(state: TimerState, now_ms: u64) -> Option<Self> {
        let duration = state.duration_ms()?;
        Some(Self {
            state,
            end_time_ms: Some(now_ms.saturating_add(duration)),
        })
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn end_time_ms(&self) -> Option<u64> {
        self.end_time_ms
    }

    pub fn is_idle(&self) -> bool {
        self.state == TimerState::Idle
    }

    /// Milliseconds left in the running interval, 0 once expired or idle.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.end_time_ms
            .map(|end| end.saturating_sub(now_ms))
            .unwrap_or(0)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.end_time_ms.is_some_and(|end| now_ms >= end)
    }
}

impl Default for TimerSession {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Serialize, Deserialize)]
struct RawSession {
    state: TimerState,
    #[serde(default)]
    end_time_ms: Option<u64>,
}

impl TryFrom<RawSession> for TimerSession {
    type Error = SessionError;

    fn try_from(raw: RawSession) -> Result<Self, Self::Error> {
        match (raw.state, raw.end_time_ms) {
            (TimerState::Idle, None) => Ok(TimerSession::idle()),
            (TimerState::Idle, Some(_)) => Err(SessionError::IdleWithEndTime),
            (state, Some(end)) => TimerSession::active(state, end),
            (TimerState::Focus, None) => Err(SessionError::ActiveWithoutEndTime("focus")),
            (TimerState::Break, None) => Err(SessionError::ActiveWithoutEndTime("break")),
        }
    }
}

impl From<TimerSession> for RawSession {
    fn from(session: TimerSession) -> Self {
        Self {
            state: session.state,
            end_time_ms: session.end_time_ms,
        }
    }
}

/// Which edge of the state graph a transition took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Idle -> Focus on tap, or Break -> Focus on expiry.
    StartFocus,
    /// Focus -> Break on expiry.
    EnterBreak,
    /// Anything -> Idle on long press.
    ResetIdle,
}

impl TransitionKind {
    /// The kind of transition that lands in `state`.
    pub fn entering(state: TimerState) -> Self {
        match state {
            TimerState::Idle => TransitionKind::ResetIdle,
            TimerState::Focus => TransitionKind::StartFocus,
            TimerState::Break => TransitionKind::EnterBreak,
        }
    }
}

/// A completed state change, ready for its side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub from: TimerState,
    pub session: TimerSession,
}
