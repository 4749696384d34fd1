//! Output collaborators: how the control looks and how it buzzes.
//!
//! Both are fire-and-forget. Nothing they do feeds back into the timer.

use serde::{Deserialize, Serialize};

use crate::timer::{TimerState, TransitionKind};

/// The three mutually exclusive looks of the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualMode {
    Neutral,
    Focus,
    Break,
}

impl From<TimerState> for VisualMode {
    fn from(state: TimerState) -> Self {
        match state {
            TimerState::Idle => VisualMode::Neutral,
            TimerState::Focus => VisualMode::Focus,
            TimerState::Break => VisualMode::Break,
        }
    }
}

/// Renders the current mode. Must be idempotent: rendering the same mode
/// twice leaves the control exactly as rendering it once.
pub trait Presenter {
    fn render(&mut self, mode: VisualMode);
}

/// Vibration pattern: alternating on/off durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VibrationPattern(pub &'static [u64]);

impl VibrationPattern {
    /// Two short pulses.
    pub const DOUBLE_PULSE: Self = Self(&[100, 50, 100]);
    /// One long pulse.
    pub const LONG_PULSE: Self = Self(&[500]);
    /// One very short tick.
    pub const TICK: Self = Self(&[50]);

    pub fn for_transition(kind: TransitionKind) -> Self {
        match kind {
            TransitionKind::StartFocus => Self::DOUBLE_PULSE,
            TransitionKind::EnterBreak => Self::LONG_PULSE,
            TransitionKind::ResetIdle => Self::TICK,
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// Best-effort vibration. Implementations without hardware support should
/// do nothing rather than fail.
pub trait Haptics {
    fn vibrate(&mut self, pattern: VibrationPattern);
}

/// Haptics for hosts with no vibration support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _pattern: VibrationPattern) {}
}
