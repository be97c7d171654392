//! Tolerant parsing of report objects.
//!
//! The status endpoints answer with `{ "data": {...} }`, a bare report
//! object, or an array of reports, and field names come in both camelCase
//! and snake_case. Everything that reads a report goes through here.

use serde_json::{Map, Value};

use super::models::{ReportStatus, ReportSummary, SuspiciousCallRecord};
use crate::risk;

const ID_KEYS: &[&str] = &["id", "reportId"];
const CASE_KEYS: &[&str] = &["caseNumber", "case_number"];
const PHONE_KEYS: &[&str] = &["phoneNumber", "phone_number"];
const CREATED_KEYS: &[&str] = &["createdAt", "created_at", "incidentDate"];
const UPDATED_KEYS: &[&str] = &["updatedAt", "updated_at"];

/// Pull the first usable report out of a lookup response.
///
/// Shapes are tried in order: a `data` wrapper (object or array), a bare
/// report object, then a top-level array. A usable report is an object
/// carrying an id or a case number.
pub fn extract_report(raw: &Value) -> Option<ReportSummary> {
    if let Some(data) = raw.get("data") {
        if let Some(report) = usable_object(data) {
            return Some(summary_from(report));
        }
    }
    if let Some(obj) = raw.as_object() {
        if is_usable(obj) {
            return Some(summary_from(obj));
        }
    }
    if let Some(items) = raw.as_array() {
        return items
            .iter()
            .filter_map(Value::as_object)
            .find(|o| is_usable(o))
            .map(summary_from);
    }
    None
}

/// Parse one entry of the `GET /reports` list. Entries without an id are
/// skipped by the caller.
pub fn suspicious_call_from(value: &Value) -> Option<SuspiciousCallRecord> {
    let obj = value.as_object()?;
    let id = first_string(obj, ID_KEYS)?;
    let description = obj
        .get("description")
        .map(value_to_string)
        .unwrap_or_default();

    Some(SuspiciousCallRecord {
        id,
        phone_number: first_string(obj, PHONE_KEYS).unwrap_or_default(),
        created_at: first_string(obj, CREATED_KEYS),
        risk_level: risk::classify(&description),
        description,
        case_number: first_string(obj, CASE_KEYS),
        status: status_of(obj),
    })
}

fn usable_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(obj) if is_usable(obj) => Some(obj),
        Value::Array(items) => items.iter().filter_map(Value::as_object).find(|o| is_usable(o)),
        _ => None,
    }
}

fn is_usable(obj: &Map<String, Value>) -> bool {
    first_string(obj, ID_KEYS).is_some() || first_string(obj, CASE_KEYS).is_some()
}

fn summary_from(obj: &Map<String, Value>) -> ReportSummary {
    ReportSummary {
        report_id: first_string(obj, ID_KEYS),
        case_number: first_string(obj, CASE_KEYS),
        status: status_of(obj),
        phone_number: first_string(obj, PHONE_KEYS),
        description: first_string(obj, &["description"]),
        created_at: first_string(obj, CREATED_KEYS),
        updated_at: first_string(obj, UPDATED_KEYS),
    }
}

fn status_of(obj: &Map<String, Value>) -> ReportStatus {
    first_string(obj, &["status"])
        .map(ReportStatus::from)
        .unwrap_or_else(|| ReportStatus::Unknown("UNKNOWN".to_string()))
}

/// First key holding a non-empty scalar, rendered as a string.
fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .map(value_to_string)
        .find(|s| !s.trim().is_empty())
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => String::new(),
    }
}
