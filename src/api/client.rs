//! Reports API client.
//!
//! Every failure is mapped to a [`SubmissionError`] with a message fit for
//! the user; nothing is retried automatically.

use log::{info, warn};
use reqwest::Url;
use serde_json::Value;

use super::extract::{extract_report, suspicious_call_from};
use super::models::{CaseReceipt, ReportSummary, SuspiciousCallRecord};
use super::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};
use crate::config::{ApiConfig, RateLimit};
use crate::error::SubmissionError;
use crate::logging;
use crate::report::NormalizedReport;

const REPORTS_PATH: &[&str] = &["reports"];
const STATUS_PATH: &[&str] = &["reports", "status"];
const CASE_PATH: &[&str] = &["reports", "case"];

pub const DEFAULT_PAGE_LIMIT: u32 = 20;

pub struct ReportsClient<T> {
    transport: T,
    config: ApiConfig,
}

impl<T: Transport> ReportsClient<T> {
    pub fn new(transport: T, config: ApiConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `POST /reports`. Returns the server-assigned case number.
    pub fn create_report(&self, report: &NormalizedReport) -> Result<CaseReceipt, SubmissionError> {
        let url = self.endpoint(REPORTS_PATH, &[], &[])?;
        let body = serde_json::to_value(report).map_err(|e| {
            warn!("failed to encode report: {e}");
            internal_error()
        })?;

        let response = self.send(
            Method::Post,
            url,
            Some(body),
            Some(&self.config.rate_limits.reports),
        )?;
        let body = success_body(&response)?;

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Reporte enviado exitosamente")
            .to_string();
        let case_number = body
            .pointer("/data/caseNumber")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SubmissionError::InvalidResponse {
                message: "El servidor no devolvió un número de caso".to_string(),
            })?
            .to_string();

        info!("report accepted case_number={case_number}");
        Ok(CaseReceipt {
            case_number,
            message,
        })
    }

    /// `GET /reports?page=&limit=`, each entry annotated with its risk level.
    pub fn list_reports(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Vec<SuspiciousCallRecord>, SubmissionError> {
        let query = [("page", page.max(1).to_string()), ("limit", limit.max(1).to_string())];
        let url = self.endpoint(REPORTS_PATH, &[], &query)?;
        let response = self.send(
            Method::Get,
            url,
            None,
            Some(&self.config.rate_limits.queries),
        )?;
        let body = success_body(&response)?;

        let items = body
            .pointer("/data/reports")
            .and_then(Value::as_array)
            .or_else(|| body.get("data").and_then(Value::as_array))
            .or_else(|| body.as_array())
            .ok_or_else(|| SubmissionError::InvalidResponse {
                message: "La lista de reportes no tiene el formato esperado".to_string(),
            })?;

        let records: Vec<SuspiciousCallRecord> =
            items.iter().filter_map(suspicious_call_from).collect();
        if records.len() != items.len() {
            warn!(
                "skipped {} report entries without an id",
                items.len() - records.len()
            );
        }
        Ok(records)
    }

    /// `GET /reports/status/{id}`.
    pub fn report_status(&self, report_id: &str) -> Result<ReportSummary, SubmissionError> {
        self.lookup(STATUS_PATH, report_id)
    }

    /// `GET /reports/case/{caseNumber}`.
    pub fn report_by_case(&self, case_number: &str) -> Result<ReportSummary, SubmissionError> {
        self.lookup(CASE_PATH, case_number)
    }

    fn lookup(&self, path: &[&str], key: &str) -> Result<ReportSummary, SubmissionError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SubmissionError::Validation {
                message: "Por favor ingrese un número de caso o ID de reporte".to_string(),
                details: Vec::new(),
            });
        }

        let url = self.endpoint(path, &[key], &[])?;
        let response = self.send(
            Method::Get,
            url,
            None,
            Some(&self.config.rate_limits.queries),
        )?;
        let body = response.body.as_ref().ok_or_else(|| SubmissionError::InvalidResponse {
            message: "Respuesta vacía del servidor".to_string(),
        })?;

        extract_report(body).ok_or_else(|| SubmissionError::NotFound {
            message: "No se encontró información del reporte".to_string(),
        })
    }

    fn endpoint(
        &self,
        path: &[&str],
        keys: &[&str],
        query: &[(&str, String)],
    ) -> Result<String, SubmissionError> {
        let mut url = Url::parse(self.config.base_url.trim_end_matches('/')).map_err(|e| {
            warn!("invalid API base URL {}: {e}", self.config.base_url);
            internal_error()
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                warn!("API base URL cannot carry a path: {}", self.config.base_url);
                internal_error()
            })?
            .pop_if_empty()
            .extend(path)
            .extend(keys);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url.to_string())
    }

    fn send(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
        rate_limit: Option<&RateLimit>,
    ) -> Result<ApiResponse, SubmissionError> {
        let log_requests = self.config.log_requests;
        let method_name = method.to_string();
        logging::log_request(log_requests, &method_name, &url);

        // Report submissions carry the user's content and get the longer budget.
        let timeout = match method {
            Method::Post => self.config.upload_timeout(),
            Method::Get => self.config.request_timeout(),
        };

        let request = ApiRequest {
            method,
            url: url.clone(),
            body,
            timeout,
        };

        let response = match self.transport.execute(request) {
            Ok(response) => response,
            Err(err) => {
                logging::log_failure(&method_name, &url, None, &err.to_string());
                return Err(map_transport_error(&err));
            }
        };
        logging::log_response(log_requests, &method_name, &url, response.status);

        if response.is_success() {
            return Ok(response);
        }

        let detail = response
            .body
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default();
        logging::log_failure(&method_name, &url, Some(response.status), &detail);
        Err(map_status(response.status, response.body.as_ref(), rate_limit))
    }
}

/// Map a non-2xx status and its body to a user-facing error.
pub fn map_status(
    status: u16,
    body: Option<&Value>,
    rate_limit: Option<&RateLimit>,
) -> SubmissionError {
    let server_message = body
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string);

    match status {
        400 => {
            let details = validation_details(body);
            if details.is_empty() {
                SubmissionError::Validation {
                    message: server_message
                        .unwrap_or_else(|| "Los datos enviados no son válidos".to_string()),
                    details,
                }
            } else {
                SubmissionError::Validation {
                    message: format!("Error de validación:\n{}", details.join("\n")),
                    details,
                }
            }
        }
        401 => SubmissionError::Unauthorized {
            status,
            message: "No autorizado para realizar esta acción".to_string(),
        },
        403 => SubmissionError::Unauthorized {
            status,
            message: "No tiene permisos para realizar esta acción".to_string(),
        },
        404 => SubmissionError::NotFound {
            message: server_message.unwrap_or_else(|| "Reporte no encontrado".to_string()),
        },
        429 => {
            let base = "Demasiadas peticiones. Espere unos minutos antes de intentar de nuevo";
            let message = match rate_limit {
                Some(limit) => format!("{base} ({})", limit.message),
                None => base.to_string(),
            };
            SubmissionError::RateLimited { message }
        }
        500 => SubmissionError::Server {
            status,
            message: "Error interno del servidor. Intente de nuevo más tarde".to_string(),
        },
        502..=504 => SubmissionError::Server {
            status,
            message: "Servicio temporalmente no disponible. Intente de nuevo más tarde"
                .to_string(),
        },
        _ => SubmissionError::Server {
            status,
            message: server_message.unwrap_or_else(|| format!("Error del servidor ({status})")),
        },
    }
}

fn map_transport_error(err: &TransportError) -> SubmissionError {
    let message = match err {
        TransportError::Timeout => {
            "La solicitud tardó demasiado. Verifique su conexión a internet"
        }
        TransportError::Connect(_) | TransportError::Other(_) => {
            "Error de conexión. Verifique su conexión a internet"
        }
    };
    SubmissionError::Network {
        message: message.to_string(),
    }
}

fn validation_details(body: Option<&Value>) -> Vec<String> {
    body.and_then(|b| b.get("errors"))
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|err| match err {
                    Value::String(s) => s.clone(),
                    Value::Object(obj) => obj
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("Error de validación")
                        .to_string(),
                    _ => "Error de validación".to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn success_body(response: &ApiResponse) -> Result<&Value, SubmissionError> {
    let body = response.body.as_ref().ok_or_else(|| SubmissionError::InvalidResponse {
        message: "Respuesta inválida del servidor".to_string(),
    })?;
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Error desconocido")
            .to_string();
        return Err(SubmissionError::Rejected { message });
    }
    Ok(body)
}

fn internal_error() -> SubmissionError {
    SubmissionError::Internal {
        message: "Error interno de la aplicación".to_string(),
    }
}
