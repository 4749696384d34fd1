mod machine;
mod recovery;
mod state;

pub use machine::StateMachine;
pub use recovery::{recover, Recovery};
pub use state::{
    TimerSession, TimerState, Transition, TransitionKind, BREAK_DURATION_MS, FOCUS_DURATION_MS,
};
