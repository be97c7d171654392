//! Ledger of recorded call evidence.
//!
//! The whole list is stored as one JSON blob under [`RECORDINGS_KEY`],
//! newest first, and rewritten in full after every change. Audio files
//! live in ordinary app storage and can disappear behind the ledger's
//! back, so [`RecordingsLedger::load`] drops entries whose file is gone and
//! persists the pruned list.

pub mod format;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::LedgerError;
use crate::storage::{KeyValueStore, RECORDINGS_KEY};

pub use format::{format_duration, format_file_size, recording_file_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedCallMetadata {
    pub id: String,
    pub phone_number: String,
    pub date: String,
    pub time: String,
    /// `M:SS`.
    pub duration: String,
    /// Human-readable, e.g. `1.5 MB`.
    pub file_size: String,
    pub file_path: String,
    pub file_name: String,
}

impl RecordedCallMetadata {
    pub fn file_exists(&self) -> bool {
        Path::new(&self.file_path).is_file()
    }
}

pub struct RecordingsLedger<S> {
    store: S,
    recordings: Vec<RecordedCallMetadata>,
}

impl<S: KeyValueStore> RecordingsLedger<S> {
    /// An empty ledger over `store`. Call [`load`](Self::load) to read it.
    pub fn new(store: S) -> Self {
        Self {
            store,
            recordings: Vec::new(),
        }
    }

    pub fn recordings(&self) -> &[RecordedCallMetadata] {
        &self.recordings
    }

    pub fn get(&self, id: &str) -> Option<&RecordedCallMetadata> {
        self.recordings.iter().find(|r| r.id == id)
    }

    /// Read the persisted list, keeping only entries whose file still
    /// exists. A missing or unreadable blob yields an empty list.
    pub fn load(&mut self) -> Result<Vec<RecordedCallMetadata>, LedgerError> {
        let persisted: Vec<RecordedCallMetadata> = match self.store.get(RECORDINGS_KEY)? {
            None => Vec::new(),
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(list) => list,
                Err(e) => {
                    warn!("ignoring unreadable recordings list: {e}");
                    Vec::new()
                }
            },
        };

        let total = persisted.len();
        let (kept, dropped): (Vec<_>, Vec<_>) =
            persisted.into_iter().partition(RecordedCallMetadata::file_exists);

        if !dropped.is_empty() {
            for record in &dropped {
                warn!(
                    "dropping recording id={} with missing file {}",
                    record.id, record.file_path
                );
            }
            self.persist(&kept)?;
            info!("recordings ledger pruned from {total} to {}", kept.len());
        }

        self.recordings = kept;
        Ok(self.recordings.clone())
    }

    /// Add a new recording at the front of the list.
    pub fn append(&mut self, record: RecordedCallMetadata) -> Result<(), LedgerError> {
        if self.get(&record.id).is_some() {
            return Err(LedgerError::DuplicateId(record.id));
        }

        let mut updated = Vec::with_capacity(self.recordings.len() + 1);
        updated.push(record);
        updated.extend(self.recordings.iter().cloned());

        self.persist(&updated)?;
        info!("recording added id={} file={}", updated[0].id, updated[0].file_name);
        self.recordings = updated;
        Ok(())
    }

    /// Delete a recording's audio file, then its entry.
    ///
    /// If the file cannot be deleted the ledger is left untouched.
    pub fn remove(&mut self, id: &str) -> Result<RecordedCallMetadata, LedgerError> {
        let record = self
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;

        fs::remove_file(&record.file_path).map_err(|e| {
            warn!("failed to delete recording file {}: {e}", record.file_path);
            LedgerError::DeleteFailed(e)
        })?;

        let updated: Vec<RecordedCallMetadata> = self
            .recordings
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();
        self.persist(&updated)?;
        info!("recording deleted id={} file={}", record.id, record.file_name);
        self.recordings = updated;
        Ok(record)
    }

    fn persist(&self, recordings: &[RecordedCallMetadata]) -> Result<(), LedgerError> {
        let blob = serde_json::to_string(recordings)?;
        self.store.set(RECORDINGS_KEY, &blob)?;
        Ok(())
    }
}
