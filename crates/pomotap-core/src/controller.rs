//! Wires the timer together on a single-threaded event loop.
//!
//! The [`Controller`] owns the state machine, the scheduler poll, the input
//! detector and the timer queue, plus the host's collaborators. Hosts feed it
//! input events, call [`Controller::run_due`] whenever the queue's next
//! deadline passes, and never touch the pieces directly.
//!
//! Every transition's side effects run synchronously, in this order:
//! persist, render, haptic cue, re-arm the poll.

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::events::Event;
use crate::feedback::{Haptics, Presenter, VibrationPattern, VisualMode};
use crate::input::{Gesture, InputDetector, InputEvent, InputThresholds};
use crate::scheduler::{Scheduler, TimerQueue, POLL_INTERVAL_MS};
use crate::storage::{Config, KeyValueStore, SessionStore};
use crate::timer::{Recovery, StateMachine, TimerSession, TimerState, Transition};

/// The host-provided pieces the controller talks to.
pub struct Collaborators {
    pub clock: Box<dyn Clock>,
    pub store: Box<dyn KeyValueStore>,
    pub presenter: Box<dyn Presenter>,
    pub haptics: Box<dyn Haptics>,
}

/// Tunables taken from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub thresholds: InputThresholds,
    pub poll_interval_ms: u64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            thresholds: InputThresholds::default(),
            poll_interval_ms: POLL_INTERVAL_MS,
        }
    }
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            thresholds: config.input_thresholds(),
            poll_interval_ms: config.scheduler.poll_interval_ms,
        }
    }
}

/// Result of feeding one input event to the controller.
#[derive(Debug, Clone, Default)]
pub struct Dispatch {
    /// The host should suppress its default gesture handling for this event.
    pub suppress_default: bool,
    pub events: Vec<Event>,
}

pub struct Controller {
    clock: Box<dyn Clock>,
    store: SessionStore,
    presenter: Box<dyn Presenter>,
    haptics: Box<dyn Haptics>,
    queue: TimerQueue,
    machine: StateMachine,
    scheduler: Scheduler,
    detector: InputDetector,
}

impl Controller {
    pub fn new(parts: Collaborators, settings: ControllerSettings) -> Self {
        Self {
            clock: parts.clock,
            store: SessionStore::new(parts.store),
            presenter: parts.presenter,
            haptics: parts.haptics,
            queue: TimerQueue::new(),
            machine: StateMachine::new(),
            scheduler: Scheduler::new(settings.poll_interval_ms),
            detector: InputDetector::new(settings.thresholds),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &TimerSession {
        self.machine.session()
    }

    pub fn state(&self) -> TimerState {
        self.machine.state()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// When [`Controller::run_due`] next has work, if ever.
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.next_deadline()
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn snapshot(&self) -> Event {
        let now = self.clock.now_ms();
        let session = self.machine.session();
        Event::StateSnapshot {
            state: session.state(),
            end_time: session.end_time_ms().and_then(crate::events::to_datetime),
            remaining_ms: session.remaining_ms(now),
            at: crate::events::to_datetime(now).unwrap_or_default(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Cold start: restore from the store, render, and arm the poll if an
    /// interval is running. Recovery never buzzes.
    pub fn start(&mut self) -> Recovery {
        let now = self.clock.now_ms();
        let snapshot = self.store.load().unwrap_or_else(|err| {
            warn!(%err, "could not read persisted session, starting idle");
            None
        });
        let recovery = self.machine.recover(snapshot, now);
        info!(?recovery, "session recovered");

        let session = *self.machine.session();
        if recovery.needs_persist() {
            self.persist(&session);
        }
        self.presenter.render(VisualMode::from(session.state()));
        self.scheduler.follow(&mut self.queue, session.state(), now);
        recovery
    }

    /// Handle one event from the control's input surface.
    ///
    /// Timers that came due before the event are fired first, so a release
    /// never races a long press that already elapsed.
    pub fn dispatch(&mut self, input: InputEvent) -> Dispatch {
        let mut events = self.run_due();
        let now = self.clock.now_ms();

        let mut suppress_default = false;
        let gesture = match input {
            InputEvent::PressStart { cancelable, .. } => {
                suppress_default = self.detector.press(&mut self.queue, now, cancelable);
                None
            }
            InputEvent::PressEnd { .. } => self.detector.release(&mut self.queue, now),
            InputEvent::PointerLeave => self.detector.leave(&mut self.queue),
        };
        if let Some(gesture) = gesture {
            events.extend(self.handle_gesture(gesture, now));
        }

        Dispatch {
            suppress_default,
            events,
        }
    }

    /// Fire every timer due at the current time: interval polls and the
    /// long-press delay.
    pub fn run_due(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            let now = self.clock.now_ms();
            let Some(handle) = self.queue.pop_due(now) else {
                break;
            };

            if self.scheduler.owns(handle) {
                debug!(now, "poll");
                if let Some(transition) = self.machine.poll(now) {
                    events.push(self.apply(transition, now));
                }
            } else if let Some(gesture) = self.detector.long_press_elapsed(handle) {
                events.extend(self.handle_gesture(gesture, now));
            } else {
                debug!(?handle, "stale timer ignored");
            }
        }
        events
    }

    /// Reset to idle as a completed long press would.
    pub fn reset(&mut self) -> Event {
        let now = self.clock.now_ms();
        let transition = self.machine.long_press();
        self.apply(transition, now)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn handle_gesture(&mut self, gesture: Gesture, now: u64) -> Option<Event> {
        match gesture {
            Gesture::Tap { .. } => match self.machine.tap(now) {
                Some(transition) => Some(self.apply(transition, now)),
                None => Some(Event::ignored(gesture, self.state(), now)),
            },
            Gesture::LongPress => {
                let transition = self.machine.long_press();
                Some(self.apply(transition, now))
            }
            Gesture::DeadZone { .. } | Gesture::Cancelled => {
                Some(Event::ignored(gesture, self.state(), now))
            }
            Gesture::Consumed => None,
        }
    }

    fn apply(&mut self, transition: Transition, now: u64) -> Event {
        let session = transition.session;
        info!(
            kind = ?transition.kind,
            from = %transition.from,
            to = %session.state(),
            end_time_ms = ?session.end_time_ms(),
            "transition"
        );

        self.persist(&session);
        self.presenter.render(VisualMode::from(session.state()));
        self.haptics
            .vibrate(VibrationPattern::for_transition(transition.kind));
        self.scheduler.follow(&mut self.queue, session.state(), now);

        Event::transition(&transition, now)
    }

    fn persist(&mut self, session: &TimerSession) {
        if let Err(err) = self.store.save(session) {
            warn!(%err, state = %session.state(), "failed to persist session");
        }
    }
}
