//! Terminal stand-ins for the control's presenter and haptics, and the
//! wiring that builds a controller from the on-disk config and store.

use std::io::Write;

use pomotap_core::{
    Collaborators, Config, Controller, ControllerSettings, Haptics, NoHaptics, Presenter,
    SqliteStore, SystemClock, VibrationPattern, VisualMode,
};

/// Shows the control's mode on stderr, once per change.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    shown: Option<VisualMode>,
}

impl TerminalPresenter {
    fn label(mode: VisualMode) -> &'static str {
        match mode {
            VisualMode::Neutral => "(   idle   )",
            VisualMode::Focus => "(  FOCUS   )",
            VisualMode::Break => "(  break   )",
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, mode: VisualMode) {
        if self.shown == Some(mode) {
            return;
        }
        self.shown = Some(mode);
        eprintln!("{}", Self::label(mode));
    }
}

/// Rings the terminal bell once per "on" segment of the pattern.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl Haptics for TerminalBell {
    fn vibrate(&mut self, pattern: VibrationPattern) {
        let pulses = pattern.0.iter().step_by(2).count();
        let mut err = std::io::stderr();
        // Best effort: a closed stderr just means no cue.
        let _ = err.write_all("\x07".repeat(pulses).as_bytes());
        let _ = err.flush();
    }
}

/// Build a controller over the configured SQLite store.
pub fn controller(config: &Config) -> Result<Controller, Box<dyn std::error::Error>> {
    let store = SqliteStore::open(&config.storage.database)?;
    let haptics: Box<dyn Haptics> = if config.haptics.enabled {
        Box::new(TerminalBell)
    } else {
        Box::new(NoHaptics)
    };

    Ok(Controller::new(
        Collaborators {
            clock: Box::new(SystemClock),
            store: Box::new(store),
            presenter: Box::new(TerminalPresenter::default()),
            haptics,
        },
        ControllerSettings::from(config),
    ))
}
