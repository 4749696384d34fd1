//! Timer state machine.
//!
//! The machine is pure bookkeeping: it owns the [`TimerSession`] and decides
//! transitions, but persisting, rendering, haptics and re-arming the poll are
//! left to the caller (see [`Controller`](crate::Controller)), which applies
//! them from the returned [`Transition`].
//!
//! ```text
//! Idle --tap--> Focus --expiry--> Break --expiry--> Focus ...
//!   ^                                                 |
//!   +-------------------- long press -----------------+
//! ```

use tracing::debug;

use super::recovery::{recover, Recovery};
use super::state::{TimerSession, TimerState, Transition, TransitionKind};
use crate::storage::SessionSnapshot;

#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    session: TimerSession,
}

impl StateMachine {
    /// A machine sitting in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn state(&self) -> TimerState {
        self.session.state()
    }

    pub fn end_time_ms(&self) -> Option<u64> {
        self.session.end_time_ms()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// A short tap. Only starts a focus interval from `Idle`.
    pub fn tap(&mut self, now_ms: u64) -> Option<Transition> {
        match self.session.state() {
            TimerState::Idle => self.enter(TimerState::Focus, now_ms),
            TimerState::Focus | TimerState::Break => {
                debug!(state = %self.state(), "tap ignored while interval is running");
                None
            }
        }
    }

    /// Scheduler poll. Fires the expiry transition once `now_ms` reaches the
    /// end of the running interval.
    ///
    /// The next interval's end time is taken from `now_ms`, so it is always in
    /// the future and the following poll cannot fire again.
    pub fn poll(&mut self, now_ms: u64) -> Option<Transition> {
        if !self.session.is_expired(now_ms) {
            return None;
        }
        let next = self.session.state().next_interval()?;
        self.enter(next, now_ms)
    }

    /// A completed long press: back to `Idle` from any state.
    pub fn long_press(&mut self) -> Transition {
        let from = self.session.state();
        self.session = TimerSession::idle();
        Transition {
            kind: TransitionKind::ResetIdle,
            from,
            session: self.session,
        }
    }

    /// Replace the session with the outcome of startup recovery.
    pub fn recover(&mut self, snapshot: Option<SessionSnapshot>, now_ms: u64) -> Recovery {
        let recovery = recover(snapshot, now_ms);
        self.session = recovery.session();
        recovery
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter(&mut self, state: TimerState, now_ms: u64) -> Option<Transition> {
        let from = self.session.state();
        self.session = TimerSession::starting(state, now_ms)?;
        Some(Transition {
            kind: TransitionKind::entering(state),
            from,
            session: self.session,
        })
    }
}
