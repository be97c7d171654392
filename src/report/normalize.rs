//! Canonical forms for report fields, applied after validation passes.

use log::debug;

use super::draft::{IncidentReportDraft, NormalizedReport};

const MAX_HOUR: u64 = 23;
const MAX_MINUTE: u64 = 59;

/// Build the payload sent to the reports API.
pub fn normalize(draft: &IncidentReportDraft) -> NormalizedReport {
    let (reporter_name, reporter_contact) = if draft.anonymous {
        (None, None)
    } else {
        (
            non_empty(&draft.reporter_name),
            non_empty(&draft.reporter_contact),
        )
    };

    let report = NormalizedReport {
        phone_number: normalize_phone(&draft.phone_number),
        date: draft.date.trim().to_string(),
        time: normalize_time(&draft.time),
        description: draft.description.trim().to_string(),
        has_evidence: draft.has_evidence,
        anonymous: draft.anonymous,
        terms_accepted: draft.terms_accepted,
        reporter_name,
        reporter_contact,
    };
    debug!(
        "normalized report phone={} date={} time={} anonymous={}",
        report.phone_number, report.date, report.time, report.anonymous
    );
    report
}

/// Digits only, with a leading `57` country code dropped.
///
/// Thirteen digits starting `575` also lose their first two. Validation only
/// admits 10 digits (optionally behind `57`), so [`super::submit`] never
/// reaches that case; it applies to callers normalizing raw numbers, such as
/// alert matching.
pub fn normalize_phone(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    let has_country_code = (digits.len() == 12 && digits.starts_with("57"))
        || (digits.len() == 13 && digits.starts_with("575"));
    if has_country_code {
        digits[2..].to_string()
    } else {
        digits
    }
}

/// Render a loosely typed time as zero-padded `HH:MM`.
///
/// `930` and `0930` become `09:30`, `9:3` becomes `09:03`, and out of range
/// parts are clamped, so `25:61` becomes `23:59`. Input that fits none of
/// these shapes is returned with everything but digits and `:` removed.
pub fn normalize_time(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();

    if cleaned.contains(':') {
        let mut parts = cleaned.split(':');
        let hours = parts.next().unwrap_or_default();
        let minutes = parts.next().unwrap_or_default();
        return render_time(hours, minutes);
    }

    match cleaned.len() {
        3 => render_time(&cleaned[..1], &cleaned[1..]),
        4 => render_time(&cleaned[..2], &cleaned[2..]),
        _ => cleaned,
    }
}

fn render_time(hours: &str, minutes: &str) -> String {
    format!(
        "{:02}:{:02}",
        clamp_part(hours, MAX_HOUR),
        clamp_part(minutes, MAX_MINUTE)
    )
}

// Digits too long to parse are past any bound, so they clamp to the max.
fn clamp_part(part: &str, max: u64) -> u64 {
    if part.is_empty() {
        return 0;
    }
    part.parse::<u64>().map(|v| v.min(max)).unwrap_or(max)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
