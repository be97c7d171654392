//! Display formatting and file naming for recordings.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// `M:SS`, minutes unpadded.
pub fn format_duration(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Binary-prefix size with at most one decimal, e.g. `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    // floor(log1024(bytes)) in integers, capped at the largest unit.
    let mut exponent = 0;
    while exponent < SIZE_UNITS.len() - 1 && bytes >= 1u64 << (10 * (exponent + 1)) {
        exponent += 1;
    }
    let value = bytes as f64 / (1u64 << (10 * exponent)) as f64;

    let rendered = format!("{value:.1}");
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{rendered} {}", SIZE_UNITS[exponent])
}

/// `call_recording_YYYYMMDD_HHMMSS_<epoch millis>.m4a`.
pub fn recording_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!(
        "call_recording_{:04}{:02}{:02}_{:02}{:02}{:02}_{}.m4a",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        now.timestamp_millis()
    )
}

/// `DD/MM/YYYY`.
pub fn display_date(now: &DateTime<Local>) -> String {
    now.format("%d/%m/%Y").to_string()
}

/// 12-hour clock as used in Colombia, e.g. `3:07:09 p. m.`.
pub fn display_time(now: &DateTime<Local>) -> String {
    let (is_pm, hour) = now.hour12();
    let suffix = if is_pm { "p. m." } else { "a. m." };
    format!("{}:{:02}:{:02} {}", hour, now.minute(), now.second(), suffix)
}
