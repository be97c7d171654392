use serde::{Deserialize, Serialize};

/// The report form as the user filled it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncidentReportDraft {
    pub phone_number: String,
    /// Expected as `DD/MM/YYYY`.
    pub date: String,
    /// Expected as `HH:MM`, 24-hour.
    pub time: String,
    pub description: String,
    pub has_evidence: bool,
    pub anonymous: bool,
    pub reporter_name: String,
    pub reporter_contact: String,
    pub terms_accepted: bool,
}

/// Canonical payload for `POST /reports`.
///
/// Reporter fields are `None`, and therefore absent from the JSON body,
/// for anonymous reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReport {
    pub phone_number: String,
    pub date: String,
    pub time: String,
    pub description: String,
    pub has_evidence: bool,
    pub anonymous: bool,
    pub terms_accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reporter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reporter_contact: Option<String>,
}
