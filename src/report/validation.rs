//! Client-side form validation.
//!
//! Every rule runs independently and all failures are returned together so
//! the form can highlight each field at once.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::draft::IncidentReportDraft;

pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const REPORTER_NAME_MIN_CHARS: usize = 2;
pub const REPORTER_NAME_MAX_CHARS: usize = 100;
pub const REPORTER_CONTACT_MIN_CHARS: usize = 7;
pub const REPORTER_CONTACT_MAX_CHARS: usize = 50;

lazy_static! {
    /// Colombian mobile: `3` plus nine digits, optionally after `57`/`+57`.
    static ref COLOMBIAN_MOBILE: Regex = Regex::new(r"^(\+?57)?3[0-9]{9}$").unwrap();

    /// `DD/MM/YYYY`, shape only.
    static ref DATE_DDMMYYYY: Regex = Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").unwrap();

    /// 24-hour `HH:MM`; a single-digit hour is accepted.
    static ref TIME_24H: Regex = Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

/// Form fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportField {
    PhoneNumber,
    Date,
    Time,
    Description,
    TermsAccepted,
    ReporterName,
    ReporterContact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: ReportField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: ReportField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a draft. An empty result means it may be normalized and sent.
pub fn validate(draft: &IncidentReportDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let phone = draft.phone_number.trim();
    if phone.is_empty() {
        errors.push(FieldError::new(
            ReportField::PhoneNumber,
            "El número telefónico es obligatorio",
        ));
    } else if !is_colombian_mobile(phone) {
        errors.push(FieldError::new(
            ReportField::PhoneNumber,
            "Formato de teléfono colombiano inválido. Debe tener 10 dígitos o incluir +57",
        ));
    }

    let date = draft.date.trim();
    if date.is_empty() {
        errors.push(FieldError::new(ReportField::Date, "La fecha es obligatoria"));
    } else if !DATE_DDMMYYYY.is_match(date) {
        errors.push(FieldError::new(
            ReportField::Date,
            "La fecha debe tener el formato DD/MM/AAAA",
        ));
    }

    let time = draft.time.trim();
    if time.is_empty() {
        errors.push(FieldError::new(ReportField::Time, "La hora es obligatoria"));
    } else if !TIME_24H.is_match(time) {
        errors.push(FieldError::new(
            ReportField::Time,
            "La hora debe tener el formato HH:MM (24 horas)",
        ));
    }

    let description_len = draft.description.trim().chars().count();
    if description_len < DESCRIPTION_MIN_CHARS {
        errors.push(FieldError::new(
            ReportField::Description,
            "La descripción debe tener al menos 10 caracteres",
        ));
    } else if description_len > DESCRIPTION_MAX_CHARS {
        errors.push(FieldError::new(
            ReportField::Description,
            "La descripción no puede exceder 1000 caracteres",
        ));
    }

    if !draft.terms_accepted {
        errors.push(FieldError::new(
            ReportField::TermsAccepted,
            "Debe aceptar los términos y condiciones",
        ));
    }

    if !draft.anonymous {
        let name_len = draft.reporter_name.trim().chars().count();
        if name_len < REPORTER_NAME_MIN_CHARS {
            errors.push(FieldError::new(
                ReportField::ReporterName,
                "El nombre debe tener al menos 2 caracteres si no es anónimo",
            ));
        } else if name_len > REPORTER_NAME_MAX_CHARS {
            errors.push(FieldError::new(
                ReportField::ReporterName,
                "El nombre no puede exceder 100 caracteres",
            ));
        }

        let contact_len = draft.reporter_contact.trim().chars().count();
        if contact_len < REPORTER_CONTACT_MIN_CHARS {
            errors.push(FieldError::new(
                ReportField::ReporterContact,
                "El contacto debe tener al menos 7 caracteres si no es anónimo",
            ));
        } else if contact_len > REPORTER_CONTACT_MAX_CHARS {
            errors.push(FieldError::new(
                ReportField::ReporterContact,
                "El contacto no puede exceder 50 caracteres",
            ));
        }
    }

    if errors.is_empty() {
        debug!("report draft passed validation");
    } else {
        warn!("report draft failed validation fields={:?}", fields(&errors));
    }

    errors
}

/// Accepts `3001234567`, `573001234567`, `+57 300 123 4567`,
/// `(300) 123-4567` and similar punctuated forms.
pub fn is_colombian_mobile(input: &str) -> bool {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
        .collect();
    if COLOMBIAN_MOBILE.is_match(&compact) {
        return true;
    }

    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.len() == 10 && digits.starts_with('3')
}

fn fields(errors: &[FieldError]) -> Vec<ReportField> {
    errors.iter().map(|e| e.field).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> IncidentReportDraft {
        IncidentReportDraft {
            phone_number: "+57 300 123 4567".to_string(),
            date: "25/03/2024".to_string(),
            time: "14:30".to_string(),
            description: "Llamada exigiendo dinero a cambio de no hacer daño".to_string(),
            has_evidence: true,
            anonymous: false,
            reporter_name: "Ana Pérez".to_string(),
            reporter_contact: "ana@example.com".to_string(),
            terms_accepted: true,
        }
    }

    #[test]
    fn valid_draft_has_no_errors() {
        assert!(validate(&valid_draft()).is_empty());
    }

    #[test]
    fn empty_draft_reports_every_required_field() {
        let errors = validate(&IncidentReportDraft::default());
        let fields = fields(&errors);
        for field in [
            ReportField::PhoneNumber,
            ReportField::Date,
            ReportField::Time,
            ReportField::Description,
            ReportField::TermsAccepted,
            ReportField::ReporterName,
            ReportField::ReporterContact,
        ] {
            assert!(fields.contains(&field), "missing error for {field:?}");
        }
    }

    #[test]
    fn phone_formats() {
        for ok in [
            "3001234567",
            "573001234567",
            "+573001234567",
            "+57 300 123 4567",
            "300-123-4567",
            "(300) 123 4567",
        ] {
            assert!(is_colombian_mobile(ok), "{ok} should be accepted");
        }
        for bad in ["2001234567", "30012345", "+1 300 123 4567", "5830012345678", "abc"] {
            assert!(!is_colombian_mobile(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn date_is_shape_only() {
        let mut draft = valid_draft();
        draft.date = "31/02/2099".to_string();
        assert!(validate(&draft).is_empty());

        draft.date = "2024-03-25".to_string();
        let errors = validate(&draft);
        assert_eq!(fields(&errors), vec![ReportField::Date]);
    }

    #[test]
    fn time_bounds() {
        let mut draft = valid_draft();
        for ok in ["00:00", "23:59", "9:05"] {
            draft.time = ok.to_string();
            assert!(validate(&draft).is_empty(), "{ok} should pass");
        }
        for bad in ["24:00", "12:60", "1230", "noon"] {
            draft.time = bad.to_string();
            assert_eq!(fields(&validate(&draft)), vec![ReportField::Time], "{bad}");
        }
    }

    #[test]
    fn description_length_is_trimmed_chars() {
        let mut draft = valid_draft();
        draft.description = "   corta    ".to_string();
        assert_eq!(fields(&validate(&draft)), vec![ReportField::Description]);

        draft.description = "ñ".repeat(DESCRIPTION_MAX_CHARS);
        assert!(validate(&draft).is_empty());

        draft.description = "ñ".repeat(DESCRIPTION_MAX_CHARS + 1);
        assert_eq!(fields(&validate(&draft)), vec![ReportField::Description]);
    }

    #[test]
    fn terms_must_be_accepted() {
        let mut draft = valid_draft();
        draft.terms_accepted = false;
        assert_eq!(fields(&validate(&draft)), vec![ReportField::TermsAccepted]);
    }

    #[test]
    fn anonymous_skips_reporter_fields() {
        let mut draft = valid_draft();
        draft.anonymous = true;
        draft.reporter_name.clear();
        draft.reporter_contact.clear();
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn reporter_bounds() {
        let mut draft = valid_draft();
        draft.reporter_name = "A".to_string();
        draft.reporter_contact = "x".repeat(REPORTER_CONTACT_MAX_CHARS + 1);
        assert_eq!(
            fields(&validate(&draft)),
            vec![ReportField::ReporterName, ReportField::ReporterContact]
        );
    }
}
