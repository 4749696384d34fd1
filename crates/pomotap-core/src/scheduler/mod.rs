//! Interval poll.
//!
//! While a focus or break interval is running, a single repeating poll asks
//! the state machine whether the interval has ended. The [`Scheduler`] owns
//! that poll's handle and guarantees there is never more than one.

mod queue;

pub use queue::{TimerHandle, TimerQueue};

use tracing::debug;

use crate::timer::TimerState;

/// Default poll period in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug)]
pub struct Scheduler {
    period_ms: u64,
    handle: Option<TimerHandle>,
}

impl Scheduler {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            handle: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether `handle` is this scheduler's live poll.
    pub fn owns(&self, handle: TimerHandle) -> bool {
        self.handle == Some(handle)
    }

    /// Start polling, replacing any poll already running.
    pub fn arm(&mut self, queue: &mut TimerQueue, now_ms: u64) -> TimerHandle {
        self.disarm(queue);
        let handle = queue.set_interval(now_ms, self.period_ms);
        debug!(?handle, period_ms = self.period_ms, "poll armed");
        self.handle = Some(handle);
        handle
    }

    /// Stop polling. Safe to call when nothing is armed.
    pub fn disarm(&mut self, queue: &mut TimerQueue) {
        if let Some(handle) = self.handle.take() {
            queue.cancel(handle);
            debug!(?handle, "poll disarmed");
        }
    }

    /// Arm for active states, disarm for `Idle`.
    pub fn follow(&mut self, queue: &mut TimerQueue, state: TimerState, now_ms: u64) {
        if state.is_active() {
            self.arm(queue, now_ms);
        } else {
            self.disarm(queue);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(POLL_INTERVAL_MS)
    }
}
