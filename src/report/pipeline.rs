use log::info;

use super::draft::IncidentReportDraft;
use super::normalize::normalize;
use super::validation::validate;
use crate::api::{CaseReceipt, ReportsClient, Transport};
use crate::error::ReportError;

/// Validate, normalize and submit a report form.
///
/// A draft with any field error is returned as [`ReportError::Invalid`]
/// without contacting the server.
pub fn submit<T: Transport>(
    client: &ReportsClient<T>,
    draft: &IncidentReportDraft,
) -> Result<CaseReceipt, ReportError> {
    let errors = validate(draft);
    if !errors.is_empty() {
        return Err(ReportError::Invalid(errors));
    }

    let report = normalize(draft);
    info!(
        "submitting report anonymous={} has_evidence={}",
        report.anonymous, report.has_evidence
    );
    Ok(client.create_report(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::api::ApiResponse;
    use crate::config::ApiConfig;
    use crate::error::{ErrorKind, SubmissionError};
    use crate::report::validation::ReportField;
    use serde_json::json;

    fn draft() -> IncidentReportDraft {
        IncidentReportDraft {
            phone_number: "57 321 456 7890".to_string(),
            date: "25/03/2024".to_string(),
            time: "1030".to_string(),
            description: "Se identifican como banco y piden claves".to_string(),
            has_evidence: true,
            anonymous: true,
            reporter_name: String::new(),
            reporter_contact: String::new(),
            terms_accepted: true,
        }
    }

    #[test]
    fn invalid_draft_never_reaches_network() {
        let transport = ScriptedTransport::new(vec![]);
        let client = ReportsClient::new(&transport, ApiConfig::default());

        let mut bad = draft();
        bad.date.clear();
        bad.terms_accepted = false;

        match submit(&client, &bad) {
            Err(ReportError::Invalid(errors)) => {
                let fields: Vec<ReportField> = errors.iter().map(|e| e.field).collect();
                assert!(fields.contains(&ReportField::Date));
                assert!(fields.contains(&ReportField::TermsAccepted));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn time_must_be_valid_before_normalizing() {
        let transport = ScriptedTransport::new(vec![]);
        let client = ReportsClient::new(&transport, ApiConfig::default());
        let err = submit(&client, &draft()).unwrap_err();
        assert!(matches!(err, ReportError::Invalid(ref e) if e[0].field == ReportField::Time));
    }

    #[test]
    fn valid_anonymous_draft_is_sent_normalized() {
        let transport = ScriptedTransport::new(vec![Ok(ApiResponse::new(
            201,
            json!({"success": true, "data": {"caseNumber": "EXT-2024-000777"}, "message": "ok"}),
        ))]);
        let client = ReportsClient::new(&transport, ApiConfig::default());

        let mut good = draft();
        good.time = "10:30".to_string();
        let receipt = submit(&client, &good).unwrap();
        assert_eq!(receipt.case_number, "EXT-2024-000777");

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["phoneNumber"], "3214567890");
        assert_eq!(body["time"], "10:30");
        assert!(body.get("reporterName").is_none());
        assert!(body.get("reporterContact").is_none());
    }

    #[test]
    fn submission_errors_pass_through() {
        let transport = ScriptedTransport::new(vec![Ok(ApiResponse::new(429, json!({})))]);
        let client = ReportsClient::new(&transport, ApiConfig::default());

        let mut good = draft();
        good.time = "10:30".to_string();
        match submit(&client, &good) {
            Err(ReportError::Submission(err @ SubmissionError::RateLimited { .. })) => {
                assert_eq!(err.kind(), ErrorKind::RateLimited);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
