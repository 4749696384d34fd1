//! Interactive loop.
//!
//! One thread, one controller. Each turn waits for either a line on stdin or
//! the controller's next timer deadline, whichever comes first, and hands it
//! to the controller before waiting again.

use std::time::Duration;

use pomotap_core::{Config, Controller, Event, InputEvent, PointerKind};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::host;

const HELP: &str = "keys: p=press  r=release  l=leave  t=tap  h=hold  s=status  q=quit";

enum Key {
    Press,
    Release,
    Leave,
    Tap,
    Hold,
    Status,
    Quit,
    Unknown,
}

impl Key {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "p" => Key::Press,
            "r" => Key::Release,
            "l" => Key::Leave,
            "t" => Key::Tap,
            "h" => Key::Hold,
            "s" => Key::Status,
            "q" | "quit" | "exit" => Key::Quit,
            _ => Key::Unknown,
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut controller = host::controller(&config)?;
    let recovery = controller.start();
    print_event(&Event::recovered(&recovery, controller.now_ms()))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let result = runtime.block_on(event_loop(&mut controller));
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();
    result
}

async fn event_loop(controller: &mut Controller) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("{HELP}");

    loop {
        let wait = controller
            .next_deadline()
            .map(|deadline| deadline.saturating_sub(controller.now_ms()));

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let events = match Key::parse(&line) {
                    Key::Press => controller
                        .dispatch(InputEvent::PressStart {
                            pointer: PointerKind::Touch,
                            cancelable: true,
                        })
                        .events,
                    Key::Release => controller
                        .dispatch(InputEvent::PressEnd { pointer: PointerKind::Touch })
                        .events,
                    Key::Leave => controller.dispatch(InputEvent::PointerLeave).events,
                    Key::Tap => {
                        let mut events = controller
                            .dispatch(InputEvent::PressStart {
                                pointer: PointerKind::Touch,
                                cancelable: true,
                            })
                            .events;
                        events.extend(
                            controller
                                .dispatch(InputEvent::PressEnd { pointer: PointerKind::Touch })
                                .events,
                        );
                        events
                    }
                    Key::Hold => vec![controller.reset()],
                    Key::Status => vec![controller.snapshot()],
                    Key::Quit => break,
                    Key::Unknown => {
                        eprintln!("{HELP}");
                        Vec::new()
                    }
                };
                for event in &events {
                    print_event(event)?;
                }
            }
            _ = sleep_for(wait) => {
                for event in controller.run_due() {
                    print_event(&event)?;
                }
            }
        }
    }
    Ok(())
}

async fn sleep_for(wait_ms: Option<u64>) {
    match wait_ms {
        Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        None => std::future::pending().await,
    }
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
