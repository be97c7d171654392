//! Recording consent and auto-recording preferences.
//!
//! Read once at startup with [`Settings::load`], handed to whatever needs
//! them, and written back explicitly with [`Settings::save`].

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::{
    KeyValueStore, CONSENT_ACCEPTED_KEY, RECORD_ALL_CALLS_KEY, RECORD_SUSPICIOUS_CALLS_KEY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub consent_accepted: bool,
    pub record_all_calls: bool,
    pub record_suspicious_calls: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            consent_accepted: false,
            record_all_calls: false,
            record_suspicious_calls: true,
        }
    }
}

impl Settings {
    /// Absent or unreadable flags fall back to their defaults.
    pub fn load<S: KeyValueStore>(store: &S) -> Result<Self, StorageError> {
        let defaults = Self::default();
        Ok(Self {
            consent_accepted: read_flag(store, CONSENT_ACCEPTED_KEY, defaults.consent_accepted)?,
            record_all_calls: read_flag(store, RECORD_ALL_CALLS_KEY, defaults.record_all_calls)?,
            record_suspicious_calls: read_flag(
                store,
                RECORD_SUSPICIOUS_CALLS_KEY,
                defaults.record_suspicious_calls,
            )?,
        })
    }

    pub fn save<S: KeyValueStore>(&self, store: &S) -> Result<(), StorageError> {
        store.set(CONSENT_ACCEPTED_KEY, &self.consent_accepted.to_string())?;
        store.set(RECORD_ALL_CALLS_KEY, &self.record_all_calls.to_string())?;
        store.set(
            RECORD_SUSPICIOUS_CALLS_KEY,
            &self.record_suspicious_calls.to_string(),
        )?;
        Ok(())
    }

    pub fn accept_consent(&mut self) {
        self.consent_accepted = true;
    }

    /// Rejecting consent leaves the other preferences as they were.
    pub fn reject_consent(&mut self) {
        self.consent_accepted = false;
    }

    pub fn auto_recording_enabled(&self) -> bool {
        self.record_all_calls || self.record_suspicious_calls
    }
}

fn read_flag<S: KeyValueStore>(store: &S, key: &str, default: bool) -> Result<bool, StorageError> {
    match store.get(key)? {
        None => Ok(default),
        Some(value) => match value.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => {
                warn!("ignoring unreadable setting key={key} value={other:?}");
                Ok(default)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::MemoryStore;

    #[test]
    fn empty_store_yields_defaults() {
        let store = MemoryStore::default();
        let settings = Settings::load(&store).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!settings.consent_accepted);
        assert!(settings.record_suspicious_calls);
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::default();
        let mut settings = Settings::default();
        settings.accept_consent();
        settings.record_all_calls = true;
        settings.record_suspicious_calls = false;
        settings.save(&store).unwrap();

        assert_eq!(store.raw(CONSENT_ACCEPTED_KEY).as_deref(), Some("true"));
        assert_eq!(Settings::load(&store).unwrap(), settings);
    }

    #[test]
    fn garbage_flag_falls_back() {
        let store = MemoryStore::with(RECORD_SUSPICIOUS_CALLS_KEY, "yes please");
        let settings = Settings::load(&store).unwrap();
        assert!(settings.record_suspicious_calls);
    }

    #[test]
    fn auto_recording_needs_one_switch() {
        let mut settings = Settings::default();
        assert!(settings.auto_recording_enabled());
        settings.record_suspicious_calls = false;
        assert!(!settings.auto_recording_enabled());
        settings.record_all_calls = true;
        assert!(settings.auto_recording_enabled());
    }
}
