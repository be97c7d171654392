//! Incident report submission: validate the form, normalize it, send it.

pub mod draft;
pub mod normalize;
pub mod pipeline;
pub mod validation;

pub use draft::{IncidentReportDraft, NormalizedReport};
pub use normalize::{normalize, normalize_phone, normalize_time};
pub use pipeline::submit;
pub use validation::{validate, FieldError, ReportField};
