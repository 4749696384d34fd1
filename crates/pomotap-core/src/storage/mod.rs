mod config;
pub mod database;
mod snapshot;

pub use config::{Config, HapticsConfig, InputConfig, SchedulerConfig, StorageConfig};
pub use database::SqliteStore;
pub use snapshot::{SessionSnapshot, SessionStore, END_TIME_KEY, STATE_KEY};

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::StorageError;

/// String key-value storage that outlives the process.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Write every entry or none of them.
    fn set_all(&mut self, entries: &[(&str, &str)]) -> Result<(), StorageError>;
    /// Remove `key` entirely. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_all(&mut self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.map.borrow_mut();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.map.borrow_mut().remove(key);
        Ok(())
    }
}

/// Returns the data directory, creating it if needed.
///
/// `POMOTAP_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/pomotap[-dev]/`, with `POMOTAP_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("POMOTAP_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOTAP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomotap-dev")
            } else {
                base_dir.join("pomotap")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
