//! Packaging a recording for sharing.

use chrono::Utc;
use log::info;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;

use crate::error::ExportError;
use crate::ledger::RecordedCallMetadata;

/// Write `<exports_dir>/evidencia-<id>-<unix secs>.zip` holding a
/// `recording.md` summary and the audio under `audio/`.
pub fn export_recording(
    record: &RecordedCallMetadata,
    exports_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let audio_path = Path::new(&record.file_path);
    if !audio_path.is_file() {
        return Err(ExportError::MissingAudio(record.file_path.clone()));
    }

    fs::create_dir_all(exports_dir)?;
    let zip_path = exports_dir.join(format!(
        "evidencia-{}-{}.zip",
        record.id,
        Utc::now().timestamp()
    ));
    let mut zip_writer = zip::ZipWriter::new(File::create(&zip_path)?);
    let options = FileOptions::default();

    zip_writer.start_file("recording.md", options)?;
    zip_writer.write_all(recording_markdown(record).as_bytes())?;

    zip_writer.start_file(format!("audio/{}", record.file_name), options)?;
    io::copy(&mut File::open(audio_path)?, &mut zip_writer)?;

    zip_writer.finish()?;
    info!("exported recording id={} to {}", record.id, zip_path.display());
    Ok(zip_path)
}

fn recording_markdown(record: &RecordedCallMetadata) -> String {
    let mut markdown = String::new();
    markdown.push_str("# Grabación de llamada\n\n");
    markdown.push_str(&format!("- Número: {}\n", record.phone_number));
    markdown.push_str(&format!("- Fecha: {}\n", record.date));
    markdown.push_str(&format!("- Hora: {}\n", record.time));
    markdown.push_str(&format!("- Duración: {}\n", record.duration));
    markdown.push_str(&format!("- Tamaño: {}\n", record.file_size));
    markdown.push_str(&format!("- Archivo: `{}`\n", record.file_name));
    markdown
}
