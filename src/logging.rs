//! Logger setup and request tracing helpers.

use log::{debug, warn};

/// Initialize the process-wide logger. Safe to call more than once.
pub fn init() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

/// Log an outgoing API request when request logging is enabled.
pub fn log_request(enabled: bool, method: &str, url: &str) {
    if enabled {
        debug!("api request method={method} url={url}");
    }
}

/// Log an API response when request logging is enabled.
pub fn log_response(enabled: bool, method: &str, url: &str, status: u16) {
    if enabled {
        debug!("api response method={method} url={url} status={status}");
    }
}

/// Log a failed API exchange. Always on: failures are worth keeping.
pub fn log_failure(method: &str, url: &str, status: Option<u16>, detail: &str) {
    match status {
        Some(status) => {
            warn!("api error method={method} url={url} status={status} detail={detail}")
        }
        None => warn!("api error method={method} url={url} no response detail={detail}"),
    }
}
