//! # Pomotap Core Library
//!
//! A Pomodoro-style interval timer driven by a single tappable control.
//! Tap to start focusing; intervals then alternate between focus and break
//! on their own until a long press resets to idle.
//!
//! ## Architecture
//!
//! - **Timer**: a wall-clock state machine over `Idle | Focus | Break`,
//!   with one-step catch-up recovery after the process was away
//! - **Scheduler**: a cancellable 1 Hz poll on a single-threaded timer queue
//! - **Input**: press gesture classification (tap, long press, dead zone)
//! - **Storage**: key-value persistence of the session (SQLite or memory)
//!   and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Controller`]: owns everything and applies transition side effects
//! - [`StateMachine`]: transitions and recovery
//! - [`InputDetector`]: gesture classification
//! - [`SessionStore`]: typed persistence over a [`KeyValueStore`]

pub mod clock;
pub mod controller;
pub mod error;
pub mod events;
pub mod feedback;
pub mod input;
pub mod scheduler;
pub mod storage;
#[doc(hidden)]
pub mod testing;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{Collaborators, Controller, ControllerSettings, Dispatch};
pub use error::{ConfigError, CoreError, SessionError, StorageError};
pub use events::Event;
pub use feedback::{Haptics, NoHaptics, Presenter, VibrationPattern, VisualMode};
pub use input::{Gesture, InputDetector, InputEvent, InputThresholds, PointerKind};
pub use scheduler::{Scheduler, TimerHandle, TimerQueue};
pub use storage::{Config, KeyValueStore, MemoryStore, SessionSnapshot, SessionStore, SqliteStore};
pub use timer::{Recovery, StateMachine, TimerSession, TimerState, Transition, TransitionKind};
