//! Error types shared across the crate.
//!
//! Every variant carries a message that can be shown to the user as-is.
//! Transport and I/O details are logged where they happen and never leak
//! into the user-facing text.

use serde::Serialize;
use thiserror::Error;

use crate::report::validation::FieldError;

/// Category tag for a [`SubmissionError`], used by the UI to pick a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    NotFound,
    RateLimited,
    Server,
    Network,
    Rejected,
    InvalidResponse,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Network => "network",
            Self::Rejected => "rejected",
            Self::InvalidResponse => "invalid_response",
            Self::Internal => "internal",
        }
    }
}

/// Failure talking to the reports API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// HTTP 400, or a lookup key that never left the device.
    #[error("{message}")]
    Validation { message: String, details: Vec<String> },

    /// HTTP 401 or 403.
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    /// HTTP 404, or a lookup whose response held no usable report.
    #[error("{message}")]
    NotFound { message: String },

    /// HTTP 429.
    #[error("{message}")]
    RateLimited { message: String },

    /// HTTP 5xx and any other unexpected status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// No response was received (connect failure, timeout).
    #[error("{message}")]
    Network { message: String },

    /// 2xx response with `success: false`.
    #[error("{message}")]
    Rejected { message: String },

    /// 2xx response whose body could not be understood.
    #[error("{message}")]
    InvalidResponse { message: String },

    /// The request could not be built on the device (bad base URL,
    /// unencodable payload). Nothing was sent.
    #[error("{message}")]
    Internal { message: String },
}

impl SubmissionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Server { .. } => ErrorKind::Server,
            Self::Network { .. } => ErrorKind::Network,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::NotFound { message }
            | Self::RateLimited { message }
            | Self::Server { message, .. }
            | Self::Network { message }
            | Self::Rejected { message }
            | Self::InvalidResponse { message }
            | Self::Internal { message } => message,
        }
    }

    /// Whether offering the user a manual retry makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited | ErrorKind::Server | ErrorKind::Network
        )
    }
}

/// Outcome of a failed report submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The form failed local validation; nothing was sent.
    #[error("Error de validación:\n{}", join_messages(.0))]
    Invalid(Vec<FieldError>),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors from the key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the recordings ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("No se encontró la grabación {0}")]
    NotFound(String),

    #[error("Ya existe una grabación con el identificador {0}")]
    DuplicateId(String),

    #[error("No se pudo eliminar la grabación: {0}")]
    DeleteFailed(#[source] std::io::Error),

    #[error("No se pudo guardar la lista de grabaciones: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Error de almacenamiento: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from a recording session.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Se requieren permisos de micrófono y almacenamiento para grabar llamadas")]
    PermissionDenied,

    #[error("Debe aceptar los términos legales antes de grabar llamadas")]
    ConsentRequired,

    #[error("Ya hay una grabación en curso")]
    AlreadyRecording,

    #[error("No hay ninguna grabación en curso")]
    NotRecording,

    #[error("Hay una grabación sin guardar. Deténgala de nuevo para guardarla o descártela")]
    UnsavedRecording,

    #[error("No se pudo iniciar la grabación: {0}")]
    CaptureFailed(String),

    #[error("Hubo un problema al guardar la grabación: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Errors while packaging a recording for sharing.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("El archivo de audio ya no existe: {0}")]
    MissingAudio(String),

    #[error("No se pudo crear el paquete de evidencia: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("No se pudo escribir el paquete de evidencia: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid configuration values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),
}
