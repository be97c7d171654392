//! Shapes returned by the reports API.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::risk::RiskLevel;

/// Server-side lifecycle of a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReportStatus {
    Pending,
    InReview,
    Resolved,
    Closed,
    Unknown(String),
}

impl ReportStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::InReview => "IN_REVIEW",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
            Self::Unknown(raw) => raw,
        }
    }

    /// Label shown to the user.
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pendiente de Revisión",
            Self::InReview => "En Investigación",
            Self::Resolved => "Resuelto",
            Self::Closed => "Cerrado",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InReview)
    }
}

impl From<String> for ReportStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "IN_REVIEW" => Self::InReview,
            "RESOLVED" => Self::Resolved,
            "CLOSED" => Self::Closed,
            "" => Self::Unknown("UNKNOWN".to_string()),
            _ => Self::Unknown(raw),
        }
    }
}

impl From<&str> for ReportStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receipt for an accepted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseReceipt {
    pub case_number: String,
    pub message: String,
}

/// Result of a status lookup by report id or case number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub report_id: Option<String>,
    pub case_number: Option<String>,
    pub status: ReportStatus,
    pub phone_number: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// A reported number as listed on the alerts screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousCallRecord {
    pub id: String,
    pub phone_number: String,
    pub created_at: Option<String>,
    pub description: String,
    pub case_number: Option<String>,
    pub status: ReportStatus,
    pub risk_level: RiskLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(ReportStatus::from("in_review"), ReportStatus::InReview);
        assert_eq!(ReportStatus::from("CLOSED"), ReportStatus::Closed);
        assert_eq!(
            ReportStatus::from("ARCHIVED"),
            ReportStatus::Unknown("ARCHIVED".to_string())
        );
    }

    #[test]
    fn status_serializes_as_wire_string() {
        let json = serde_json::to_string(&ReportStatus::InReview).unwrap();
        assert_eq!(json, "\"IN_REVIEW\"");
        let back: ReportStatus = serde_json::from_str("\"RESOLVED\"").unwrap();
        assert_eq!(back, ReportStatus::Resolved);
    }

    #[test]
    fn labels() {
        assert_eq!(ReportStatus::Pending.label(), "Pendiente de Revisión");
        assert_eq!(ReportStatus::InReview.to_string(), "En Investigación");
        assert!(ReportStatus::Pending.is_open());
        assert!(!ReportStatus::Resolved.is_open());
    }
}
