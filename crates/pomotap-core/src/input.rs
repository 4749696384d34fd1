//! Press gesture classification for the single control.
//!
//! A press either ends quickly (tap), is held until the long-press timer
//! fires, or falls somewhere in between and does nothing. Leaving the control
//! before releasing abandons the press.
//!
//! ```text
//!  0 ms          tap_max_ms             long_press_ms
//!  |---- tap ----|------ dead zone ------|---- long press (timer) ---->
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scheduler::{TimerHandle, TimerQueue};

/// Releases shorter than this count as a tap.
pub const TAP_MAX_MS: u64 = 500;

/// Presses held this long reset the timer.
pub const LONG_PRESS_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Raw events from the control's input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Mouse-down or touch-start. `cancelable` mirrors whether the host lets
    /// the default gesture handling (scroll, zoom) be suppressed.
    PressStart {
        pointer: PointerKind,
        cancelable: bool,
    },
    /// Mouse-up or touch-end.
    PressEnd { pointer: PointerKind },
    /// The pointer left the control while pressed.
    PointerLeave,
}

/// What a finished (or abandoned) press amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum Gesture {
    Tap { held_ms: u64 },
    LongPress,
    /// Released between the tap and long-press thresholds.
    DeadZone { held_ms: u64 },
    /// Released after the long press already fired.
    Consumed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputThresholds {
    pub tap_max_ms: u64,
    pub long_press_ms: u64,
}

impl Default for InputThresholds {
    fn default() -> Self {
        Self {
            tap_max_ms: TAP_MAX_MS,
            long_press_ms: LONG_PRESS_MS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    started_ms: u64,
    long_press: Option<TimerHandle>,
    consumed: bool,
}

#[derive(Debug, Default)]
pub struct InputDetector {
    thresholds: InputThresholds,
    press: Option<Press>,
}

impl InputDetector {
    pub fn new(thresholds: InputThresholds) -> Self {
        Self {
            thresholds,
            press: None,
        }
    }

    /// Whether `handle` is the pending long-press timer.
    pub fn owns(&self, handle: TimerHandle) -> bool {
        self.press
            .and_then(|p| p.long_press)
            .is_some_and(|h| h == handle)
    }

    /// Press-down. Arms the long-press timer and returns whether the host
    /// should suppress its default gesture handling.
    pub fn press(&mut self, queue: &mut TimerQueue, now_ms: u64, cancelable: bool) -> bool {
        self.cancel_timer(queue);
        let handle = queue.set_timeout(now_ms, self.thresholds.long_press_ms);
        self.press = Some(Press {
            started_ms: now_ms,
            long_press: Some(handle),
            consumed: false,
        });
        debug!(now_ms, ?handle, "press started");
        cancelable
    }

    /// The long-press timer fired. Stale handles are ignored.
    pub fn long_press_elapsed(&mut self, handle: TimerHandle) -> Option<Gesture> {
        let press = self.press.as_mut()?;
        if press.long_press != Some(handle) || press.consumed {
            return None;
        }
        press.long_press = None;
        press.consumed = true;
        debug!(?handle, "long press");
        Some(Gesture::LongPress)
    }

    /// Press-up. `None` when no press was in progress.
    pub fn release(&mut self, queue: &mut TimerQueue, now_ms: u64) -> Option<Gesture> {
        self.cancel_timer(queue);
        let press = self.press.take()?;
        let held_ms = now_ms.saturating_sub(press.started_ms);

        let gesture = if press.consumed {
            Gesture::Consumed
        } else if held_ms < self.thresholds.tap_max_ms {
            Gesture::Tap { held_ms }
        } else if held_ms >= self.thresholds.long_press_ms {
            // Released on or after the threshold before the timer was drained.
            Gesture::LongPress
        } else {
            Gesture::DeadZone { held_ms }
        };
        debug!(held_ms, ?gesture, "press released");
        Some(gesture)
    }

    /// Pointer left the control. Abandons the press without a transition.
    pub fn leave(&mut self, queue: &mut TimerQueue) -> Option<Gesture> {
        self.cancel_timer(queue);
        self.press.take().map(|_| Gesture::Cancelled)
    }

    fn cancel_timer(&mut self, queue: &mut TimerQueue) {
        if let Some(handle) = self.press.as_mut().and_then(|p| p.long_press.take()) {
            queue.cancel(handle);
        }
    }
}
