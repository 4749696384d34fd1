//! Recording stand-ins for the output collaborators, for driving a
//! [`Controller`](crate::Controller) in tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::feedback::{Haptics, Presenter, VibrationPattern, VisualMode};

/// Remembers the current mode and how often it was asked to render.
///
/// Clones share state so a caller can observe a presenter handed to the
/// controller.
#[derive(Debug, Clone)]
pub struct RecordingPresenter {
    inner: Rc<RefCell<PresenterLog>>,
}

#[derive(Debug)]
struct PresenterLog {
    mode: VisualMode,
    renders: usize,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(PresenterLog {
                mode: VisualMode::Neutral,
                renders: 0,
            })),
        }
    }

    pub fn mode(&self) -> VisualMode {
        self.inner.borrow().mode
    }

    pub fn renders(&self) -> usize {
        self.inner.borrow().renders
    }
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, mode: VisualMode) {
        let mut log = self.inner.borrow_mut();
        log.mode = mode;
        log.renders += 1;
    }
}

/// Collects every requested pattern. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    patterns: Rc<RefCell<Vec<VibrationPattern>>>,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patterns(&self) -> Vec<VibrationPattern> {
        self.patterns.borrow().clone()
    }

    pub fn clear(&self) {
        self.patterns.borrow_mut().clear();
    }
}

impl Haptics for RecordingHaptics {
    fn vibrate(&mut self, pattern: VibrationPattern) {
        self.patterns.borrow_mut().push(pattern);
    }
}
