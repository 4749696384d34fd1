//! `pomotap config`: read and edit `config.toml` by dot path.

use clap::Subcommand;
use pomotap_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value (e.g. "haptics.enabled", "input.long_press_ms")
    Get { key: String },
    /// Change one value and save. Thresholds are checked before saving.
    Set { key: String, value: String },
    /// Print the whole file
    List,
    /// Print where the file lives
    Path,
    /// Overwrite the file with defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("unknown key: {key}"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!(%key, %value, "config updated");
            // Echo what was stored, which may differ in form from the input.
            let stored = config.get(&key).unwrap_or(value);
            println!("{key} = {stored}");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("# {}", Config::path()?.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => println!("{}", Config::path()?.display()),
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("reset {}", Config::path()?.display());
        }
    }
    Ok(())
}
