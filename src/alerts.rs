//! Reported-number alerts and the auto-record decision for incoming calls.

use log::info;
use serde::Serialize;

use crate::api::{ReportsClient, SuspiciousCallRecord, Transport, DEFAULT_PAGE_LIMIT};
use crate::error::SubmissionError;
use crate::report::normalize_phone;
use crate::risk::RiskLevel;
use crate::settings::Settings;

/// First page of reported numbers, newest first as served.
pub fn fetch_alerts<T: Transport>(
    client: &ReportsClient<T>,
) -> Result<Vec<SuspiciousCallRecord>, SubmissionError> {
    let records = client.list_reports(1, DEFAULT_PAGE_LIMIT)?;
    info!("loaded {} alerts", records.len());
    Ok(records)
}

/// Whether `phone` matches any reported number, ignoring formatting and
/// the `+57` country code.
pub fn is_reported_number(phone: &str, records: &[SuspiciousCallRecord]) -> bool {
    let wanted = normalize_phone(phone);
    if wanted.is_empty() {
        return false;
    }
    records
        .iter()
        .any(|record| normalize_phone(&record.phone_number) == wanted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoRecordReason {
    NoConsent,
    RecordAllCalls,
    ReportedNumber,
    NotReported,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoRecordDecision {
    pub record: bool,
    pub reason: AutoRecordReason,
}

impl AutoRecordDecision {
    fn record(reason: AutoRecordReason) -> Self {
        Self { record: true, reason }
    }

    fn skip(reason: AutoRecordReason) -> Self {
        Self { record: false, reason }
    }
}

pub fn auto_record_decision(
    settings: &Settings,
    phone: &str,
    records: &[SuspiciousCallRecord],
) -> AutoRecordDecision {
    if !settings.consent_accepted {
        return AutoRecordDecision::skip(AutoRecordReason::NoConsent);
    }
    if settings.record_all_calls {
        return AutoRecordDecision::record(AutoRecordReason::RecordAllCalls);
    }
    if !settings.record_suspicious_calls {
        return AutoRecordDecision::skip(AutoRecordReason::Disabled);
    }
    if is_reported_number(phone, records) {
        AutoRecordDecision::record(AutoRecordReason::ReportedNumber)
    } else {
        AutoRecordDecision::skip(AutoRecordReason::NotReported)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskCounts {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

pub fn risk_counts(records: &[SuspiciousCallRecord]) -> RiskCounts {
    records
        .iter()
        .fold(RiskCounts::default(), |mut counts, record| {
            match record.risk_level {
                RiskLevel::High => counts.high += 1,
                RiskLevel::Medium => counts.medium += 1,
                RiskLevel::Low => counts.low += 1,
            }
            counts
        })
}
