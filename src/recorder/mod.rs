//! Call recording sessions.
//!
//! [`CallRecorder`] owns at most one active capture. Stopping it moves the
//! audio into the recordings directory and appends an entry to the ledger;
//! the ledger is only touched once the file is finalized. A capture that
//! stopped but could not be saved is kept as an unsaved recording, and the
//! next `stop` retries saving it.

pub mod capture;
pub mod ticker;

use chrono::{Local, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

use crate::error::RecorderError;
use crate::ledger::format::{display_date, display_time};
use crate::ledger::{
    format_duration, format_file_size, recording_file_name, RecordedCallMetadata, RecordingsLedger,
};
use crate::settings::Settings;
use crate::storage::KeyValueStore;

pub use capture::{ActiveCapture, AudioCapture, FfmpegCapture, RecordingSource};
pub use ticker::{ElapsedCounter, ElapsedTicker};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub microphone: bool,
    pub storage: bool,
}

impl Permissions {
    pub fn granted(&self) -> bool {
        self.microphone && self.storage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingMode {
    Manual,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub phone_number: String,
    pub mode: RecordingMode,
    pub started_at: String,
}

struct ActiveSession {
    info: SessionInfo,
    capture: Box<dyn ActiveCapture>,
    ticker: ElapsedTicker,
    started: Instant,
}

/// Finished audio not yet listed in the ledger.
struct UnsavedRecording {
    info: SessionInfo,
    audio: PathBuf,
    duration_secs: u64,
}

pub struct CallRecorder<C> {
    capture: C,
    staging_dir: PathBuf,
    recordings_dir: PathBuf,
    active: Option<ActiveSession>,
    unsaved: Option<UnsavedRecording>,
}

impl<C: AudioCapture> CallRecorder<C> {
    pub fn new(
        capture: C,
        staging_dir: impl AsRef<Path>,
        recordings_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            capture,
            staging_dir: staging_dir.as_ref().to_path_buf(),
            recordings_dir: recordings_dir.as_ref().to_path_buf(),
            active: None,
            unsaved: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn session(&self) -> Option<&SessionInfo> {
        self.active.as_ref().map(|s| &s.info)
    }

    /// A stopped capture whose save failed is waiting for another `stop`.
    pub fn has_unsaved(&self) -> bool {
        self.unsaved.is_some()
    }

    /// Seconds counted by the running session's ticker.
    pub fn elapsed_secs(&self) -> Option<u64> {
        self.active.as_ref().map(|s| s.ticker.elapsed())
    }

    /// Handle on the running session's elapsed seconds, readable without
    /// access to the recorder.
    pub fn elapsed_counter(&self) -> Option<ElapsedCounter> {
        self.active.as_ref().map(|s| s.ticker.counter())
    }

    /// Begin recording a call. `on_tick` receives the elapsed seconds once
    /// per second until the session stops.
    pub fn start<F>(
        &mut self,
        phone_number: &str,
        mode: RecordingMode,
        settings: &Settings,
        permissions: Permissions,
        on_tick: F,
    ) -> Result<SessionInfo, RecorderError>
    where
        F: FnMut(u64) + Send + 'static,
    {
        if self.active.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }
        if self.unsaved.is_some() {
            return Err(RecorderError::UnsavedRecording);
        }
        if !permissions.granted() {
            return Err(RecorderError::PermissionDenied);
        }
        if !settings.consent_accepted {
            return Err(RecorderError::ConsentRequired);
        }

        fs::create_dir_all(&self.staging_dir)?;
        let session_id = Uuid::new_v4().to_string();
        let output = self.staging_dir.join(format!("{session_id}.m4a"));
        let capture = self.capture.start(&output)?;

        let info = SessionInfo {
            session_id,
            phone_number: phone_number.trim().to_string(),
            mode,
            started_at: Utc::now().to_rfc3339(),
        };
        info!(
            "recording started session={} mode={:?}",
            info.session_id, info.mode
        );

        self.active = Some(ActiveSession {
            info: info.clone(),
            capture,
            ticker: ElapsedTicker::start(on_tick),
            started: Instant::now(),
        });
        Ok(info)
    }

    /// Finish the active session and record it in `ledger`.
    ///
    /// If the audio cannot be moved or listed, it is kept as an unsaved
    /// recording and a later call retries the save.
    pub fn stop<S: KeyValueStore>(
        &mut self,
        ledger: &mut RecordingsLedger<S>,
    ) -> Result<RecordedCallMetadata, RecorderError> {
        if let Some(session) = self.active.take() {
            session.ticker.cancel();
            let duration_secs = session.started.elapsed().as_secs();
            let audio = session.capture.stop()?;
            self.unsaved = Some(UnsavedRecording {
                info: session.info,
                audio,
                duration_secs,
            });
        }

        let unsaved = self.unsaved.as_mut().ok_or(RecorderError::NotRecording)?;
        match save(&self.recordings_dir, unsaved, ledger) {
            Ok(record) => {
                info!(
                    "recording stopped session={} file={} duration={}",
                    unsaved.info.session_id, record.file_name, record.duration
                );
                self.unsaved = None;
                Ok(record)
            }
            Err(e) => {
                warn!(
                    "recording session={} kept unsaved at {}: {e}",
                    unsaved.info.session_id,
                    unsaved.audio.display()
                );
                Err(e)
            }
        }
    }

    /// Discard the active session, or an unsaved recording, without
    /// touching the ledger.
    pub fn cancel(&mut self) -> Result<(), RecorderError> {
        if let Some(session) = self.active.take() {
            session.ticker.cancel();
            session.capture.abort();
            info!("recording cancelled session={}", session.info.session_id);
            return Ok(());
        }

        let unsaved = self.unsaved.take().ok_or(RecorderError::NotRecording)?;
        if let Err(e) = fs::remove_file(&unsaved.audio) {
            warn!("failed to remove unsaved recording {}: {e}", unsaved.audio.display());
        }
        info!("unsaved recording discarded session={}", unsaved.info.session_id);
        Ok(())
    }
}

/// Move the audio under its final name, then list it. `unsaved.audio`
/// follows the file so a retry picks it up wherever it ended.
fn save<S: KeyValueStore>(
    recordings_dir: &Path,
    unsaved: &mut UnsavedRecording,
    ledger: &mut RecordingsLedger<S>,
) -> Result<RecordedCallMetadata, RecorderError> {
    let now = Local::now();
    let file_name = recording_file_name(&now);
    fs::create_dir_all(recordings_dir)?;
    let destination = recordings_dir.join(&file_name);
    move_file(&unsaved.audio, &destination)?;
    unsaved.audio = destination;
    let size = fs::metadata(&unsaved.audio)?.len();

    let record = RecordedCallMetadata {
        id: now.timestamp_millis().to_string(),
        phone_number: unsaved.info.phone_number.clone(),
        date: display_date(&now),
        time: display_time(&now),
        duration: format_duration(unsaved.duration_secs),
        file_size: format_file_size(size),
        file_path: unsaved.audio.to_string_lossy().to_string(),
        file_name,
    };
    ledger.append(record.clone())?;
    Ok(record)
}

/// Rename, falling back to copy and delete across filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::storage::testing::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    const AUDIO: &[u8] = b"fake m4a payload";

    /// Writes a fixed payload on start; `stop` hands it back.
    #[derive(Default)]
    struct FakeCapture {
        aborted: Arc<AtomicUsize>,
    }

    struct FakeSession {
        output: PathBuf,
        aborted: Arc<AtomicUsize>,
    }

    impl AudioCapture for FakeCapture {
        fn start(&self, output: &Path) -> Result<Box<dyn ActiveCapture>, RecorderError> {
            fs::write(output, AUDIO)?;
            Ok(Box::new(FakeSession {
                output: output.to_path_buf(),
                aborted: Arc::clone(&self.aborted),
            }))
        }
    }

    impl ActiveCapture for FakeSession {
        fn stop(self: Box<Self>) -> Result<PathBuf, RecorderError> {
            Ok(self.output)
        }

        fn abort(self: Box<Self>) {
            let _ = fs::remove_file(&self.output);
            self.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }

    const ALLOWED: Permissions = Permissions {
        microphone: true,
        storage: true,
    };

    fn consenting() -> Settings {
        Settings {
            consent_accepted: true,
            ..Settings::default()
        }
    }

    fn recorder(root: &Path) -> CallRecorder<FakeCapture> {
        CallRecorder::new(FakeCapture::default(), root.join("staging"), root.join("recordings"))
    }

    #[test]
    fn start_requires_consent() {
        let dir = tempdir().unwrap();
        let mut recorder = recorder(dir.path());
        let err = recorder
            .start("3001234567", RecordingMode::Manual, &Settings::default(), ALLOWED, |_| {})
            .unwrap_err();
        assert!(matches!(err, RecorderError::ConsentRequired));
        assert!(!recorder.is_recording());
    }

    #[test]
    fn start_requires_permissions() {
        let dir = tempdir().unwrap();
        let mut recorder = recorder(dir.path());
        let denied = Permissions {
            microphone: true,
            storage: false,
        };
        let err = recorder
            .start("3001234567", RecordingMode::Manual, &consenting(), denied, |_| {})
            .unwrap_err();
        assert!(matches!(err, RecorderError::PermissionDenied));
    }

    #[test]
    fn one_session_at_a_time() {
        let dir = tempdir().unwrap();
        let mut recorder = recorder(dir.path());
        let info = recorder
            .start("3001234567", RecordingMode::Auto, &consenting(), ALLOWED, |_| {})
            .unwrap();
        assert_eq!(recorder.session().map(|s| s.session_id.clone()), Some(info.session_id));

        let err = recorder
            .start("3009999999", RecordingMode::Manual, &consenting(), ALLOWED, |_| {})
            .unwrap_err();
        assert!(matches!(err, RecorderError::AlreadyRecording));
    }

    #[test]
    fn stop_moves_file_and_appends_to_ledger() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::default();
        let mut ledger = RecordingsLedger::new(&store);
        let mut recorder = recorder(dir.path());

        recorder
            .start(" 3001234567 ", RecordingMode::Manual, &consenting(), ALLOWED, |_| {})
            .unwrap();
        let record = recorder.stop(&mut ledger).unwrap();

        assert!(!recorder.is_recording());
        assert_eq!(record.phone_number, "3001234567");
        assert_eq!(record.duration, "0:00");
        assert_eq!(record.file_size, format!("{} B", AUDIO.len()));
        assert!(record.file_name.starts_with("call_recording_"));
        assert!(record.file_name.ends_with(&format!("_{}.m4a", record.id)));

        let path = PathBuf::from(&record.file_path);
        assert_eq!(path.parent(), Some(dir.path().join("recordings").as_path()));
        assert_eq!(fs::read(&path).unwrap(), AUDIO);
        assert_eq!(fs::read_dir(dir.path().join("staging")).unwrap().count(), 0);

        assert_eq!(ledger.recordings(), &[record]);
    }

    #[test]
    fn stop_without_session() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::default();
        let mut ledger = RecordingsLedger::new(&store);
        let err = recorder(dir.path()).stop(&mut ledger).unwrap_err();
        assert!(matches!(err, RecorderError::NotRecording));
    }

    #[test]
    fn failed_ledger_write_is_reported() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::default();
        store.fail_writes.set(true);
        let mut ledger = RecordingsLedger::new(&store);
        let mut recorder = recorder(dir.path());

        recorder
            .start("3001234567", RecordingMode::Manual, &consenting(), ALLOWED, |_| {})
            .unwrap();
        let err = recorder.stop(&mut ledger).unwrap_err();
        assert!(matches!(err, RecorderError::Ledger(LedgerError::Storage(_))));
        assert!(ledger.recordings().is_empty());
        assert!(recorder.has_unsaved());

        store.fail_writes.set(false);
        let record = recorder.stop(&mut ledger).unwrap();
        assert_eq!(ledger.recordings(), &[record.clone()]);
        assert_eq!(fs::read(&record.file_path).unwrap(), AUDIO);
        assert_eq!(fs::read_dir(dir.path().join("recordings")).unwrap().count(), 1);
    }

    #[test]
    fn failed_move_keeps_audio_for_retry() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::default();
        let mut ledger = RecordingsLedger::new(&store);
        let mut recorder = recorder(dir.path());
        // A plain file where the recordings directory should go.
        let blocker = dir.path().join("recordings");
        fs::write(&blocker, b"not a directory").unwrap();

        recorder
            .start("3001234567", RecordingMode::Manual, &consenting(), ALLOWED, |_| {})
            .unwrap();
        assert!(matches!(recorder.stop(&mut ledger), Err(RecorderError::Io(_))));
        assert!(!recorder.is_recording());
        assert!(recorder.has_unsaved());
        assert_eq!(fs::read_dir(dir.path().join("staging")).unwrap().count(), 1);
        assert!(ledger.recordings().is_empty());

        let err = recorder
            .start("3009999999", RecordingMode::Manual, &consenting(), ALLOWED, |_| {})
            .unwrap_err();
        assert!(matches!(err, RecorderError::UnsavedRecording));

        fs::remove_file(&blocker).unwrap();
        let record = recorder.stop(&mut ledger).unwrap();
        assert!(!recorder.has_unsaved());
        assert_eq!(fs::read(&record.file_path).unwrap(), AUDIO);
        assert_eq!(fs::read_dir(dir.path().join("staging")).unwrap().count(), 0);
        assert_eq!(ledger.recordings().len(), 1);
    }

    #[test]
    fn cancel_discards_unsaved_audio() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::default();
        store.fail_writes.set(true);
        let mut ledger = RecordingsLedger::new(&store);
        let mut recorder = recorder(dir.path());

        recorder
            .start("3001234567", RecordingMode::Manual, &consenting(), ALLOWED, |_| {})
            .unwrap();
        assert!(recorder.stop(&mut ledger).is_err());

        recorder.cancel().unwrap();
        assert!(!recorder.has_unsaved());
        assert_eq!(fs::read_dir(dir.path().join("recordings")).unwrap().count(), 0);
        assert!(matches!(recorder.stop(&mut ledger), Err(RecorderError::NotRecording)));
    }

    #[test]
    fn elapsed_counter_follows_session() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::default();
        let mut ledger = RecordingsLedger::new(&store);
        let mut recorder = recorder(dir.path());
        assert!(recorder.elapsed_counter().is_none());

        recorder
            .start("3001234567", RecordingMode::Manual, &consenting(), ALLOWED, |_| {})
            .unwrap();
        let counter = recorder.elapsed_counter().unwrap();
        assert!(counter.get() <= recorder.elapsed_secs().unwrap());

        recorder.stop(&mut ledger).unwrap();
        assert!(recorder.elapsed_counter().is_none());
        // Frozen at the final count once the session ends.
        let last = counter.get();
        assert_eq!(counter.get(), last);
    }

    #[test]
    fn cancel_discards_capture() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::default();
        let mut ledger = RecordingsLedger::new(&store);
        let mut recorder = recorder(dir.path());
        let aborted = Arc::clone(&recorder.capture.aborted);

        recorder
            .start("3001234567", RecordingMode::Manual, &consenting(), ALLOWED, |_| {})
            .unwrap();
        recorder.cancel().unwrap();

        assert_eq!(aborted.load(Ordering::SeqCst), 1);
        assert!(!recorder.is_recording());
        assert_eq!(fs::read_dir(dir.path().join("staging")).unwrap().count(), 0);
        assert!(ledger.load().unwrap().is_empty());
        assert!(matches!(recorder.cancel(), Err(RecorderError::NotRecording)));
    }
}
