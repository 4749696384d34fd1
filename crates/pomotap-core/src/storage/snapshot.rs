//! Persisted form of the timer session.
//!
//! Two keys hold the session: a state label and the end time as a decimal
//! millisecond count. [`SessionSnapshot::encode`] and
//! [`SessionSnapshot::decode`] are the only code that knows this layout.

use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::StorageError;
use crate::timer::{TimerSession, TimerState};

pub const STATE_KEY: &str = "pomodoro_state";
pub const END_TIME_KEY: &str = "pomodoro_endTime";

/// A decoded (state, end time) pair as found in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// `None` when the stored label was not recognised.
    pub state: Option<TimerState>,
    pub end_time_ms: u64,
}

impl SessionSnapshot {
    /// Snapshot of a running interval. Idle sessions have nothing to store.
    pub fn from_session(session: &TimerSession) -> Option<Self> {
        session.end_time_ms().map(|end_time_ms| Self {
            state: Some(session.state()),
            end_time_ms,
        })
    }

    /// Key/value pairs to write.
    pub fn encode(&self) -> [(&'static str, String); 2] {
        let label = self.state.map(TimerState::label).unwrap_or_default();
        [
            (STATE_KEY, label.to_string()),
            (END_TIME_KEY, self.end_time_ms.to_string()),
        ]
    }

    /// Build a snapshot from raw stored values.
    ///
    /// Returns `None` when either value is missing or the end time does not
    /// parse; callers treat that the same as "no session".
    pub fn decode(state: Option<&str>, end_time: Option<&str>) -> Option<Self> {
        let label = state?;
        let end_time_ms = end_time?.trim().parse::<u64>().ok()?;
        Some(Self {
            state: TimerState::from_label(label.trim()),
            end_time_ms,
        })
    }
}

/// The timer's view of a [`KeyValueStore`].
pub struct SessionStore {
    kv: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read the persisted session, if a complete and parseable one exists.
    ///
    /// # Errors
    /// Returns an error only when the underlying store cannot be read.
    pub fn load(&self) -> Result<Option<SessionSnapshot>, StorageError> {
        let state = self.kv.get(STATE_KEY)?;
        let end_time = self.kv.get(END_TIME_KEY)?;
        let snapshot = SessionSnapshot::decode(state.as_deref(), end_time.as_deref());
        if snapshot.is_none() && (state.is_some() || end_time.is_some()) {
            warn!(?state, ?end_time, "ignoring incomplete or corrupt session record");
        }
        Ok(snapshot)
    }

    /// Write `session`. Idle sessions clear the store.
    ///
    /// Both keys go in one [`KeyValueStore::set_all`], so a failed write
    /// leaves the previous record intact.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn save(&mut self, session: &TimerSession) -> Result<(), StorageError> {
        match SessionSnapshot::from_session(session) {
            Some(snapshot) => {
                let [(state_key, label), (end_key, end_time)] = snapshot.encode();
                self.kv
                    .set_all(&[(state_key, label.as_str()), (end_key, end_time.as_str())])?;
                debug!(state = %session.state(), end_time_ms = snapshot.end_time_ms, "session saved");
                Ok(())
            }
            None => self.clear(),
        }
    }

    /// Remove both keys.
    ///
    /// # Errors
    /// Returns an error if a removal fails.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.kv.remove(STATE_KEY)?;
        self.kv.remove(END_TIME_KEY)?;
        debug!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SqliteStore};

    #[test]
    fn decode_needs_both_keys() {
        assert_eq!(SessionSnapshot::decode(Some("FOCUS"), None), None);
        assert_eq!(SessionSnapshot::decode(None, Some("100")), None);
        assert_eq!(
            SessionSnapshot::decode(Some("FOCUS"), Some("100")),
            Some(SessionSnapshot {
                state: Some(TimerState::Focus),
                end_time_ms: 100
            })
        );
    }

    #[test]
    fn decode_rejects_bad_end_time() {
        assert_eq!(SessionSnapshot::decode(Some("FOCUS"), Some("soon")), None);
        assert_eq!(SessionSnapshot::decode(Some("FOCUS"), Some("-5")), None);
        assert_eq!(SessionSnapshot::decode(Some("FOCUS"), Some("")), None);
    }

    #[test]
    fn decode_keeps_unknown_label_as_none() {
        let snap = SessionSnapshot::decode(Some("NAP"), Some("100")).unwrap();
        assert_eq!(snap.state, None);
    }

    #[test]
    fn encode_writes_label_and_decimal_ms() {
        let session = TimerSession::active(TimerState::Break, 1_234).unwrap();
        let snap = SessionSnapshot::from_session(&session).unwrap();
        let [(k1, v1), (k2, v2)] = snap.encode();
        assert_eq!((k1, v1.as_str()), (STATE_KEY, "BREAK"));
        assert_eq!((k2, v2.as_str()), (END_TIME_KEY, "1234"));
        assert!(SessionSnapshot::from_session(&TimerSession::idle()).is_none());
    }

    #[test]
    fn saving_idle_removes_both_keys() {
        let kv = MemoryStore::new();
        let mut store = SessionStore::new(Box::new(kv.clone()));
        store
            .save(&TimerSession::active(TimerState::Focus, 99).unwrap())
            .unwrap();
        assert!(kv.contains(STATE_KEY) && kv.contains(END_TIME_KEY));

        store.save(&TimerSession::idle()).unwrap();
        assert!(!kv.contains(STATE_KEY));
        assert!(!kv.contains(END_TIME_KEY));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn load_treats_corrupt_record_as_absent() {
        let mut kv = MemoryStore::new();
        kv.set(STATE_KEY, "FOCUS").unwrap();
        kv.set(END_TIME_KEY, "not-a-number").unwrap();
        let store = SessionStore::new(Box::new(kv));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn failed_save_keeps_previous_record() {
        let db = SqliteStore::open_memory().unwrap();
        db.conn()
            .execute_batch(
                "CREATE TRIGGER reject_late_end BEFORE INSERT ON kv
                 WHEN NEW.key = 'pomodoro_endTime' AND CAST(NEW.value AS INTEGER) > 2000
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        let mut store = SessionStore::new(Box::new(db));

        store
            .save(&TimerSession::active(TimerState::Focus, 1_000).unwrap())
            .unwrap();
        let err = store.save(&TimerSession::active(TimerState::Break, 5_000).unwrap());
        assert!(err.is_err());

        assert_eq!(
            store.load().unwrap(),
            Some(SessionSnapshot {
                state: Some(TimerState::Focus),
                end_time_ms: 1_000
            })
        );
    }
}
