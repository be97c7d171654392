//! Tauri commands exposed to the webview.
//!
//! Blocking work (SQLite, file moves, HTTP) runs on the async runtime's
//! blocking pool so the UI thread never waits on it.

use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::sync::{Mutex, MutexGuard};
use tauri::{AppHandle, Emitter, Manager, State};

use crate::alerts::{self, AutoRecordDecision, RiskCounts};
use crate::api::{
    CaseReceipt, ReportSummary, ReportsClient, ReqwestTransport, SuspiciousCallRecord,
};
use crate::config::AppConfig;
use crate::error::{
    ExportError, LedgerError, RecorderError, ReportError, StorageError, SubmissionError,
};
use crate::export;
use crate::ledger::{RecordedCallMetadata, RecordingsLedger};
use crate::recorder::{
    CallRecorder, ElapsedCounter, FfmpegCapture, Permissions, RecordingMode, SessionInfo,
};
use crate::report::{self, FieldError, IncidentReportDraft};
use crate::settings::Settings;
use crate::storage::SqliteStore;

pub const RECORDING_TICK_EVENT: &str = "recording-tick";

pub struct AppState {
    config: AppConfig,
    store: SqliteStore,
    settings: Mutex<Settings>,
    ledger: Mutex<RecordingsLedger<SqliteStore>>,
    recorder: Mutex<CallRecorder<FfmpegCapture>>,
    /// Running session's counter, so polling never waits on the recorder.
    elapsed: Mutex<Option<ElapsedCounter>>,
    alerts: Mutex<Vec<SuspiciousCallRecord>>,
    client: ReportsClient<ReqwestTransport>,
}

impl AppState {
    /// Open storage under the configured data directory and read settings
    /// and the recordings list once.
    pub fn open(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        fs::create_dir_all(&config.data_dir)?;
        fs::create_dir_all(config.recordings_dir())?;

        let store = SqliteStore::open(config.db_path())?;
        let settings = Settings::load(&store)?;
        let mut ledger = RecordingsLedger::new(store.clone());
        let recordings = ledger.load()?;
        let transport = ReqwestTransport::new(&config.api)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        info!(
            "app state ready env={:?} recordings={} consent={}",
            config.environment,
            recordings.len(),
            settings.consent_accepted
        );

        Ok(Self {
            recorder: Mutex::new(CallRecorder::new(
                FfmpegCapture::default(),
                config.staging_dir(),
                config.recordings_dir(),
            )),
            elapsed: Mutex::new(None),
            client: ReportsClient::new(transport, config.api.clone()),
            settings: Mutex::new(settings),
            ledger: Mutex::new(ledger),
            alerts: Mutex::new(Vec::new()),
            store,
            config,
        })
    }
}

/// Error payload returned to the webview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    kind: String,
    message: String,
    details: Vec<String>,
    retryable: bool,
}

impl CommandError {
    fn new(kind: &str, message: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            message: message.into(),
            details: Vec::new(),
            retryable: false,
        }
    }
}

impl From<SubmissionError> for CommandError {
    fn from(err: SubmissionError) -> Self {
        let details = match &err {
            SubmissionError::Validation { details, .. } => details.clone(),
            _ => Vec::new(),
        };
        Self {
            kind: err.kind().as_str().to_string(),
            message: err.message().to_string(),
            details,
            retryable: err.is_retryable(),
        }
    }
}

impl From<ReportError> for CommandError {
    fn from(err: ReportError) -> Self {
        let message = err.to_string();
        match err {
            ReportError::Invalid(errors) => Self {
                kind: "invalid_form".to_string(),
                message,
                details: errors.into_iter().map(|e| e.message).collect(),
                retryable: false,
            },
            ReportError::Submission(err) => err.into(),
        }
    }
}

impl From<RecorderError> for CommandError {
    fn from(err: RecorderError) -> Self {
        let kind = match &err {
            RecorderError::PermissionDenied => "permission_denied",
            RecorderError::ConsentRequired => "consent_required",
            RecorderError::AlreadyRecording
            | RecorderError::NotRecording
            | RecorderError::UnsavedRecording => "recording_state",
            _ => "recording",
        };
        Self::new(kind, err.to_string())
    }
}

impl From<LedgerError> for CommandError {
    fn from(err: LedgerError) -> Self {
        Self::new("recordings", err.to_string())
    }
}

impl From<ExportError> for CommandError {
    fn from(err: ExportError) -> Self {
        Self::new("export", err.to_string())
    }
}

impl From<StorageError> for CommandError {
    fn from(err: StorageError) -> Self {
        Self::new("storage", err.to_string())
    }
}

type CommandResult<T> = Result<T, CommandError>;

fn lock<T>(mutex: &Mutex<T>) -> CommandResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| CommandError::new("internal", "Error interno de la aplicación"))
}

/// Run `job` against the managed state on the blocking pool.
async fn blocking<T, F>(app: AppHandle, job: F) -> CommandResult<T>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> CommandResult<T> + Send + 'static,
{
    tauri::async_runtime::spawn_blocking(move || {
        let state = app.state::<AppState>();
        job(state.inner())
    })
    .await
    .map_err(|e| CommandError::new("internal", format!("Error interno de la aplicación: {e}")))?
}

#[tauri::command]
pub fn validate_report(draft: IncidentReportDraft) -> Vec<FieldError> {
    report::validate(&draft)
}

#[tauri::command]
pub async fn submit_report(
    app: AppHandle,
    draft: IncidentReportDraft,
) -> CommandResult<CaseReceipt> {
    blocking(app, move |state| Ok(report::submit(&state.client, &draft)?)).await
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertsView {
    pub alerts: Vec<SuspiciousCallRecord>,
    pub counts: RiskCounts,
}

#[tauri::command]
pub async fn list_alerts(app: AppHandle) -> CommandResult<AlertsView> {
    blocking(app, |state| {
        let alerts = alerts::fetch_alerts(&state.client)?;
        *lock(&state.alerts)? = alerts.clone();
        Ok(AlertsView {
            counts: alerts::risk_counts(&alerts),
            alerts,
        })
    })
    .await
}

/// Look a report up by case number, or by report id when `by_case` is false.
#[tauri::command]
pub async fn lookup_report(
    app: AppHandle,
    key: String,
    by_case: bool,
) -> CommandResult<ReportSummary> {
    blocking(app, move |state| {
        let summary = if by_case {
            state.client.report_by_case(&key)?
        } else {
            state.client.report_status(&key)?
        };
        Ok(summary)
    })
    .await
}

#[tauri::command]
pub async fn load_recordings(app: AppHandle) -> CommandResult<Vec<RecordedCallMetadata>> {
    blocking(app, |state| Ok(lock(&state.ledger)?.load()?)).await
}

#[tauri::command]
pub async fn delete_recording(app: AppHandle, id: String) -> CommandResult<RecordedCallMetadata> {
    blocking(app, move |state| Ok(lock(&state.ledger)?.remove(&id)?)).await
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordingTick {
    elapsed_secs: u64,
}

#[tauri::command]
pub async fn start_recording(
    app: AppHandle,
    phone_number: String,
    mode: RecordingMode,
    permissions: Permissions,
) -> CommandResult<SessionInfo> {
    let emitter = app.clone();
    blocking(app, move |state| {
        let settings = *lock(&state.settings)?;
        let on_tick = move |elapsed_secs| {
            if let Err(e) = emitter.emit(RECORDING_TICK_EVENT, RecordingTick { elapsed_secs }) {
                warn!("failed to emit recording tick: {e}");
            }
        };
        let mut recorder = lock(&state.recorder)?;
        let session = recorder.start(&phone_number, mode, &settings, permissions, on_tick)?;
        *lock(&state.elapsed)? = recorder.elapsed_counter();
        Ok(session)
    })
    .await
}

#[tauri::command]
pub async fn stop_recording(app: AppHandle) -> CommandResult<RecordedCallMetadata> {
    blocking(app, |state| {
        let mut recorder = lock(&state.recorder)?;
        let mut ledger = lock(&state.ledger)?;
        *lock(&state.elapsed)? = None;
        Ok(recorder.stop(&mut ledger)?)
    })
    .await
}

#[tauri::command]
pub async fn cancel_recording(app: AppHandle) -> CommandResult<()> {
    blocking(app, |state| {
        let mut recorder = lock(&state.recorder)?;
        *lock(&state.elapsed)? = None;
        Ok(recorder.cancel()?)
    })
    .await
}

#[tauri::command]
pub fn recording_elapsed(state: State<'_, AppState>) -> CommandResult<Option<u64>> {
    Ok(lock(&state.elapsed)?.as_ref().map(ElapsedCounter::get))
}

#[tauri::command]
pub async fn export_recording(app: AppHandle, id: String) -> CommandResult<String> {
    blocking(app, move |state| {
        let record = lock(&state.ledger)?
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.clone()))?;
        let zip_path = export::export_recording(&record, &state.config.exports_dir())?;
        Ok(zip_path.to_string_lossy().to_string())
    })
    .await
}

#[tauri::command]
pub async fn load_settings(app: AppHandle) -> CommandResult<Settings> {
    blocking(app, |state| Ok(*lock(&state.settings)?)).await
}

#[tauri::command]
pub async fn save_settings(app: AppHandle, settings: Settings) -> CommandResult<Settings> {
    blocking(app, move |state| {
        settings.save(&state.store)?;
        *lock(&state.settings)? = settings;
        info!(
            "settings saved consent={} all={} suspicious={}",
            settings.consent_accepted, settings.record_all_calls, settings.record_suspicious_calls
        );
        Ok(settings)
    })
    .await
}

/// Decide whether an incoming call should be recorded. Uses the last
/// fetched alerts, fetching them first if none are cached.
#[tauri::command]
pub async fn auto_record_decision(
    app: AppHandle,
    phone_number: String,
) -> CommandResult<AutoRecordDecision> {
    blocking(app, move |state| {
        let settings = *lock(&state.settings)?;
        let mut cached = lock(&state.alerts)?;
        if cached.is_empty() && settings.consent_accepted && settings.record_suspicious_calls {
            match alerts::fetch_alerts(&state.client) {
                Ok(fresh) => *cached = fresh,
                Err(e) => warn!("could not refresh alerts for auto-record: {e}"),
            }
        }
        Ok(alerts::auto_record_decision(&settings, &phone_number, &cached))
    })
    .await
}
