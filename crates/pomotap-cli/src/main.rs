use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "pomotap", version, about = "Pomotap CLI")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current timer state as JSON
    Status,
    /// Tap the control: starts a focus interval when idle
    Tap,
    /// Hold the control: resets to idle from any state
    Hold,
    /// Interactive loop driving the control from the keyboard
    Run,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr. `POMOTAP_LOG` takes `RUST_LOG`-style directives and
/// defaults to `warn`; `-v` flags raise the global level on top of it.
fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("POMOTAP_LOG")
        .from_env_lossy();

    let filter = match verbosity {
        0 => filter,
        1 => filter.add_directive(LevelFilter::INFO.into()),
        2 => filter.add_directive(LevelFilter::DEBUG.into()),
        _ => filter.add_directive(LevelFilter::TRACE.into()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Status => commands::timer::run(commands::timer::TimerAction::Status),
        Commands::Tap => commands::timer::run(commands::timer::TimerAction::Tap),
        Commands::Hold => commands::timer::run(commands::timer::TimerAction::Hold),
        Commands::Run => commands::run::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
