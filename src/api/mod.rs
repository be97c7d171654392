//! Client for the remote reports API.

pub mod client;
pub mod extract;
pub mod models;
pub mod transport;

pub use client::{map_status, ReportsClient, DEFAULT_PAGE_LIMIT};
pub use extract::extract_report;
pub use models::{CaseReceipt, ReportStatus, ReportSummary, SuspiciousCallRecord};
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport, TransportError};
