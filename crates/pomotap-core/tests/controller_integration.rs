//! Integration tests for the controller: gestures, expiry, and side effects.

use pomotap_core::testing::{RecordingHaptics, RecordingPresenter};
use pomotap_core::storage::{END_TIME_KEY, STATE_KEY};
use pomotap_core::timer::{BREAK_DURATION_MS, FOCUS_DURATION_MS};
use pomotap_core::{
    Clock, Collaborators, Controller, ControllerSettings, Event, InputEvent, KeyValueStore, ManualClock,
    MemoryStore, PointerKind, TimerState, VibrationPattern, VisualMode,
};

const T0: u64 = 1_700_000_000_000;

struct Rig {
    clock: ManualClock,
    store: MemoryStore,
    presenter: RecordingPresenter,
    haptics: RecordingHaptics,
    controller: Controller,
}

fn rig_with_store(store: MemoryStore) -> Rig {
    let clock = ManualClock::new(T0);
    let presenter = RecordingPresenter::new();
    let haptics = RecordingHaptics::new();
    let mut controller = Controller::new(
        Collaborators {
            clock: Box::new(clock.clone()),
            store: Box::new(store.clone()),
            presenter: Box::new(presenter.clone()),
            haptics: Box::new(haptics.clone()),
        },
        ControllerSettings::default(),
    );
    controller.start();
    Rig {
        clock,
        store,
        presenter,
        haptics,
        controller,
    }
}

fn rig() -> Rig {
    rig_with_store(MemoryStore::new())
}

impl Rig {
    fn press(&mut self) {
        self.controller.dispatch(InputEvent::PressStart {
            pointer: PointerKind::Touch,
            cancelable: true,
        });
    }

    fn release(&mut self) -> Vec<Event> {
        self.controller
            .dispatch(InputEvent::PressEnd {
                pointer: PointerKind::Touch,
            })
            .events
    }

    /// Press and hold for `held_ms`, letting timers fire along the way.
    fn hold(&mut self, held_ms: u64) -> Vec<Event> {
        self.press();
        self.advance(held_ms);
        self.release()
    }

    fn tap(&mut self) -> Vec<Event> {
        self.hold(100)
    }

    /// Move the clock forward one poll period at a time, like a live loop.
    fn advance(&mut self, delta_ms: u64) {
        let target = self.clock.now_ms() + delta_ms;
        while let Some(deadline) = self.controller.next_deadline() {
            if deadline > target {
                break;
            }
            self.clock.set(deadline);
            self.controller.run_due();
        }
        self.clock.set(target);
        self.controller.run_due();
    }

    fn stored(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap()
    }
}

#[test]
fn cold_start_with_empty_store_is_idle_and_silent() {
    let r = rig();
    assert_eq!(r.controller.state(), TimerState::Idle);
    assert_eq!(r.presenter.mode(), VisualMode::Neutral);
    assert!(r.haptics.patterns().is_empty());
    assert!(!r.controller.is_polling());
}

#[test]
fn tap_from_idle_starts_focus_with_side_effects() {
    let mut r = rig();
    r.tap();
    let tapped_at = T0 + 100;

    assert_eq!(r.controller.state(), TimerState::Focus);
    assert_eq!(
        r.controller.session().end_time_ms(),
        Some(tapped_at + FOCUS_DURATION_MS)
    );
    assert_eq!(r.stored(STATE_KEY).as_deref(), Some("FOCUS"));
    assert_eq!(
        r.stored(END_TIME_KEY),
        Some((tapped_at + FOCUS_DURATION_MS).to_string())
    );
    assert_eq!(r.presenter.mode(), VisualMode::Focus);
    assert_eq!(r.haptics.patterns(), vec![VibrationPattern::DOUBLE_PULSE]);
    assert!(r.controller.is_polling());
}

#[test]
fn full_cycle_repeats() {
    let mut r = rig();
    r.tap();
    r.haptics.clear();

    for _ in 0..3 {
        r.advance(FOCUS_DURATION_MS);
        assert_eq!(r.controller.state(), TimerState::Break);
        let now = r.clock.now_ms();
        assert_eq!(
            r.controller.session().end_time_ms(),
            Some(now + BREAK_DURATION_MS)
        );
        assert_eq!(r.presenter.mode(), VisualMode::Break);

        r.advance(BREAK_DURATION_MS);
        assert_eq!(r.controller.state(), TimerState::Focus);
        let now = r.clock.now_ms();
        assert_eq!(
            r.controller.session().end_time_ms(),
            Some(now + FOCUS_DURATION_MS)
        );
    }

    assert_eq!(
        r.haptics.patterns(),
        [VibrationPattern::LONG_PULSE, VibrationPattern::DOUBLE_PULSE].repeat(3)
    );
}

#[test]
fn expiry_fires_once_even_after_a_long_stall() {
    let mut r = rig();
    r.tap();
    r.haptics.clear();

    // The host loop stalls: a single wake-up long after the focus ended.
    r.clock.set(T0 + 100 + FOCUS_DURATION_MS + 60_000);
    let events = r.controller.run_due();
    assert_eq!(events.len(), 1);
    assert_eq!(r.controller.state(), TimerState::Break);
    assert_eq!(r.haptics.patterns(), vec![VibrationPattern::LONG_PULSE]);
}

#[test]
fn dead_zone_press_changes_nothing_from_any_state() {
    let mut r = rig();
    r.hold(1_000);
    assert_eq!(r.controller.state(), TimerState::Idle);

    r.tap();
    let before = *r.controller.session();
    r.hold(1_000);
    assert_eq!(*r.controller.session(), before);

    r.advance(FOCUS_DURATION_MS);
    let before = *r.controller.session();
    assert_eq!(before.state(), TimerState::Break);
    r.hold(1_000);
    assert_eq!(*r.controller.session(), before);
}

#[test]
fn long_press_in_focus_resets_to_idle() {
    let mut r = rig();
    r.tap();
    r.advance(60_000);
    r.haptics.clear();

    r.press();
    r.advance(2_000);
    // Reset happens while still held.
    assert_eq!(r.controller.state(), TimerState::Idle);
    assert_eq!(r.haptics.patterns(), vec![VibrationPattern::TICK]);

    // Releasing afterwards is not a tap.
    let events = r.release();
    assert!(events.is_empty());
    assert_eq!(r.controller.state(), TimerState::Idle);
    assert_eq!(r.presenter.mode(), VisualMode::Neutral);
    assert!(!r.controller.is_polling());
    assert_eq!(r.stored(STATE_KEY), None);
    assert_eq!(r.stored(END_TIME_KEY), None);
}

#[test]
fn long_press_from_idle_still_cues() {
    let mut r = rig();
    r.hold(2_500);
    assert_eq!(r.controller.state(), TimerState::Idle);
    assert_eq!(r.haptics.patterns(), vec![VibrationPattern::TICK]);
}

#[test]
fn tap_during_break_is_ignored() {
    let mut r = rig();
    r.tap();
    r.advance(FOCUS_DURATION_MS);
    let before = *r.controller.session();
    r.haptics.clear();

    let events = r.tap();
    assert_eq!(*r.controller.session(), before);
    assert!(r.haptics.patterns().is_empty());
    assert!(matches!(events.as_slice(), [Event::GestureIgnored { .. }]));
}

#[test]
fn leaving_the_control_cancels_long_press() {
    let mut r = rig();
    r.tap();
    r.press();
    r.advance(1_000);
    r.controller.dispatch(InputEvent::PointerLeave);
    r.advance(5_000);
    assert_eq!(r.controller.state(), TimerState::Focus);

    // A stray release after leaving is not a tap either.
    let events = r.release();
    assert!(events.is_empty());
}

#[test]
fn touch_press_asks_to_suppress_default_when_cancelable() {
    let mut r = rig();
    let d = r.controller.dispatch(InputEvent::PressStart {
        pointer: PointerKind::Touch,
        cancelable: true,
    });
    assert!(d.suppress_default);
    r.controller.dispatch(InputEvent::PointerLeave);

    let d = r.controller.dispatch(InputEvent::PressStart {
        pointer: PointerKind::Touch,
        cancelable: false,
    });
    assert!(!d.suppress_default);
}

#[test]
fn only_one_poll_is_ever_armed() {
    let mut r = rig();
    r.tap();
    r.advance(FOCUS_DURATION_MS);
    r.advance(BREAK_DURATION_MS);
    // One interval poll, nothing else pending.
    let deadline = r.controller.next_deadline().unwrap();
    assert!(deadline <= r.clock.now_ms() + 1_000);
    r.controller.reset();
    assert_eq!(r.controller.next_deadline(), None);
}

#[test]
fn reset_clears_storage() {
    let mut r = rig();
    r.tap();
    assert!(r.store.contains(STATE_KEY));
    r.controller.reset();
    assert!(r.store.is_empty());
}

#[test]
fn cold_start_resumes_running_interval_without_cue() {
    let mut store = MemoryStore::new();
    store.set(STATE_KEY, "BREAK").unwrap();
    store.set(END_TIME_KEY, &(T0 + 60_000).to_string()).unwrap();

    let mut r = rig_with_store(store);
    assert_eq!(r.controller.state(), TimerState::Break);
    assert_eq!(r.controller.session().end_time_ms(), Some(T0 + 60_000));
    assert_eq!(r.presenter.mode(), VisualMode::Break);
    assert!(r.haptics.patterns().is_empty());
    assert!(r.controller.is_polling());

    r.advance(60_000);
    assert_eq!(r.controller.state(), TimerState::Focus);
}

#[test]
fn cold_start_catches_up_one_interval_and_persists_it() {
    let mut store = MemoryStore::new();
    let focus_end = T0 - 2 * 60_000;
    store.set(STATE_KEY, "FOCUS").unwrap();
    store.set(END_TIME_KEY, &focus_end.to_string()).unwrap();

    let r = rig_with_store(store);
    assert_eq!(r.controller.state(), TimerState::Break);
    assert_eq!(
        r.controller.session().end_time_ms(),
        Some(focus_end + BREAK_DURATION_MS)
    );
    assert_eq!(r.stored(STATE_KEY).as_deref(), Some("BREAK"));
    assert_eq!(
        r.stored(END_TIME_KEY),
        Some((focus_end + BREAK_DURATION_MS).to_string())
    );
    assert!(r.haptics.patterns().is_empty());
}

#[test]
fn cold_start_with_corrupt_record_clears_it() {
    let mut store = MemoryStore::new();
    store.set(STATE_KEY, "FOCUS").unwrap();
    store.set(END_TIME_KEY, "tomorrow").unwrap();

    let r = rig_with_store(store);
    assert_eq!(r.controller.state(), TimerState::Idle);
    assert!(r.store.is_empty());
    assert_eq!(r.presenter.mode(), VisualMode::Neutral);
}
