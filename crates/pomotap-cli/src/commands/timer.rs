use pomotap_core::{Config, Event, InputEvent, PointerKind, Recovery};

use crate::host;

pub enum TimerAction {
    Status,
    Tap,
    Hold,
}

fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut controller = host::controller(&config)?;

    let recovery = controller.start();
    if !matches!(recovery, Recovery::Fresh | Recovery::Resumed { .. }) {
        tracing::info!(?recovery, "restored session changed while away");
    }

    match action {
        TimerAction::Status => {
            let snapshot = controller.snapshot();
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        TimerAction::Tap => {
            let mut events = controller
                .dispatch(InputEvent::PressStart {
                    pointer: PointerKind::Mouse,
                    cancelable: false,
                })
                .events;
            events.extend(
                controller
                    .dispatch(InputEvent::PressEnd {
                        pointer: PointerKind::Mouse,
                    })
                    .events,
            );
            print_events(&events)?;
        }
        TimerAction::Hold => {
            let event = controller.reset();
            print_events(&[event])?;
        }
    }
    Ok(())
}
