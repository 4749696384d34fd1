//! TOML-based application configuration.
//!
//! Stores host preferences:
//! - Gesture thresholds for the control
//! - Poll period of the interval scheduler
//! - Whether haptic cues are emitted
//! - Which database file holds the session
//!
//! Interval lengths are fixed and not configurable.
//!
//! Configuration is stored at `~/.config/pomotap/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::input::{InputThresholds, LONG_PRESS_MS, TAP_MAX_MS};
use crate::scheduler::POLL_INTERVAL_MS;

/// Gesture thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_tap_max_ms")]
    pub tap_max_ms: u64,
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
}

/// Interval poll configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file name inside the data directory.
    #[serde(default = "default_database")]
    pub database: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomotap/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub haptics: HapticsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_tap_max_ms() -> u64 {
    TAP_MAX_MS
}
fn default_long_press_ms() -> u64 {
    LONG_PRESS_MS
}
fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL_MS
}
fn default_true() -> bool {
    true
}
fn default_database() -> String {
    "pomotap.db".into()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tap_max_ms: default_tap_max_ms(),
            long_press_ms: default_long_press_ms(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Object(_) => return Err(invalid("not a leaf key".into())),
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of `config.toml` in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::Load {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// [`Config::load`] against an explicit file.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::Load {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::Load {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// [`Config::save`] against an explicit file.
    ///
    /// # Errors
    ///
    /// Same as [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_err = |message: String| ConfigError::Save {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_err(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value does not match
    /// the key's type, or the result fails [`Config::validate`]. The config
    /// is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check the values the timer cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        if self.input.tap_max_ms == 0 {
            return Err(invalid("input.tap_max_ms", "must be at least 1".into()));
        }
        if self.input.long_press_ms < self.input.tap_max_ms {
            return Err(invalid(
                "input.long_press_ms",
                format!(
                    "must not be shorter than input.tap_max_ms ({})",
                    self.input.tap_max_ms
                ),
            ));
        }
        if self.scheduler.poll_interval_ms == 0 {
            return Err(invalid("scheduler.poll_interval_ms", "must be at least 1".into()));
        }
        if self.storage.database.trim().is_empty() {
            return Err(invalid("storage.database", "must name a file".into()));
        }
        Ok(())
    }

    pub fn input_thresholds(&self) -> InputThresholds {
        InputThresholds {
            tap_max_ms: self.input.tap_max_ms,
            long_press_ms: self.input.long_press_ms.max(self.input.tap_max_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.input.long_press_ms, 2000);
        assert!(parsed.haptics.enabled);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("[haptics]\nenabled = false\n").unwrap();
        assert!(!parsed.haptics.enabled);
        assert_eq!(parsed.input.tap_max_ms, 500);
        assert_eq!(parsed.scheduler.poll_interval_ms, 1000);
        assert_eq!(parsed.storage.database, "pomotap.db");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("haptics.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("input.tap_max_ms").as_deref(), Some("500"));
        assert_eq!(cfg.get("storage.database").as_deref(), Some("pomotap.db"));
        assert!(cfg.get("input.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("haptics.enabled", "false").unwrap();
        cfg.set("scheduler.poll_interval_ms", "250").unwrap();
        cfg.set("storage.database", "other.db").unwrap();
        assert!(!cfg.haptics.enabled);
        assert_eq!(cfg.scheduler.poll_interval_ms, 250);
        assert_eq!(cfg.storage.database, "other.db");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("input.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("nope.deeper", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("haptics.enabled", "not_a_bool"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("input.tap_max_ms", "-3"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(cfg.set("input", "1"), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.input.long_press_ms, 2000);

        let mut changed = cfg.clone();
        changed.set("input.long_press_ms", "3000").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().input.long_press_ms, 3000);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "input = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Load { .. })));
    }

    #[test]
    fn long_press_never_below_tap_threshold() {
        // Hand-edited files skip `set`, so thresholds still clamp.
        let mut cfg = Config::default();
        cfg.input.long_press_ms = 100;
        let t = cfg.input_thresholds();
        assert_eq!(t.long_press_ms, 500);
    }

    #[test]
    fn set_rejects_unusable_thresholds() {
        let mut cfg = Config::default();
        let err = cfg.set("input.long_press_ms", "100").unwrap_err();
        assert!(
            matches!(&err, ConfigError::InvalidValue { key, .. } if key == "input.long_press_ms")
        );
        assert_eq!(cfg.input.long_press_ms, 2000);

        assert!(cfg.set("input.tap_max_ms", "0").is_err());
        assert!(cfg.set("scheduler.poll_interval_ms", "0").is_err());
        assert!(cfg.set("storage.database", " ").is_err());
        assert_eq!(cfg.input.tap_max_ms, 500);

        cfg.set("input.tap_max_ms", "2000").unwrap();
        assert_eq!(cfg.input_thresholds().tap_max_ms, 2000);
    }
}
