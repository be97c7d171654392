use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use crate::error::RecorderError;

const SHUTDOWN_POLL: Duration = Duration::from_millis(100);
const SHUTDOWN_ATTEMPTS: u32 = 30;

/// One ffmpeg input, e.g. `{ format: "pulse", input: "default" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSource {
    pub label: String,
    pub format: String,
    pub input: String,
}

impl RecordingSource {
    /// The default microphone for the current platform.
    pub fn platform_default() -> Self {
        let (format, input) = if cfg!(target_os = "macos") {
            ("avfoundation", ":0")
        } else if cfg!(target_os = "windows") {
            ("dshow", "audio=default")
        } else {
            ("pulse", "default")
        };
        Self {
            label: "Micrófono".to_string(),
            format: format.to_string(),
            input: input.to_string(),
        }
    }
}

/// Something that can record audio into a file.
pub trait AudioCapture: Send {
    fn start(&self, output: &Path) -> Result<Box<dyn ActiveCapture>, RecorderError>;
}

/// A capture in progress.
pub trait ActiveCapture: Send {
    /// Finish the file and return its path.
    fn stop(self: Box<Self>) -> Result<PathBuf, RecorderError>;

    /// Stop and throw the partial file away.
    fn abort(self: Box<Self>);
}

/// Records through an `ffmpeg` child process.
#[derive(Debug, Clone)]
pub struct FfmpegCapture {
    sources: Vec<RecordingSource>,
}

impl FfmpegCapture {
    pub fn new(sources: Vec<RecordingSource>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[RecordingSource] {
        &self.sources
    }

    fn command(&self, output: &Path) -> Command {
        let mut command = Command::new("ffmpeg");
        command.arg("-y");

        for source in &self.sources {
            command.arg("-f").arg(&source.format);
            command.arg("-i").arg(&source.input);
        }

        if self.sources.len() > 1 {
            let inputs: String = (0..self.sources.len()).map(|i| format!("[{i}:a]")).collect();
            command.arg("-filter_complex").arg(format!(
                "{inputs}amix=inputs={}:duration=longest:dropout_transition=2",
                self.sources.len()
            ));
        }

        command
            .args(["-ac", "1", "-ar", "44100", "-c:a", "aac", "-b:a", "96k"])
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl Default for FfmpegCapture {
    fn default() -> Self {
        Self::new(vec![RecordingSource::platform_default()])
    }
}

impl AudioCapture for FfmpegCapture {
    fn start(&self, output: &Path) -> Result<Box<dyn ActiveCapture>, RecorderError> {
        if self.sources.is_empty() {
            return Err(RecorderError::CaptureFailed(
                "se requiere al menos una fuente de audio".to_string(),
            ));
        }
        if !find_executable("ffmpeg") {
            return Err(RecorderError::CaptureFailed(
                "no se encontró ffmpeg en el PATH".to_string(),
            ));
        }

        let child = self
            .command(output)
            .spawn()
            .map_err(|e| RecorderError::CaptureFailed(format!("ffmpeg: {e}")))?;
        info!("ffmpeg capture started pid={} output={}", child.id(), output.display());

        Ok(Box::new(FfmpegSession {
            child,
            output: output.to_path_buf(),
        }))
    }
}

struct FfmpegSession {
    child: Child,
    output: PathBuf,
}

impl ActiveCapture for FfmpegSession {
    fn stop(mut self: Box<Self>) -> Result<PathBuf, RecorderError> {
        if let Some(mut stdin) = self.child.stdin.take() {
            let _ = stdin.write_all(b"q\n");
        }
        wait_for_shutdown(&mut self.child);

        if !self.output.is_file() {
            return Err(RecorderError::CaptureFailed(
                "ffmpeg no produjo ningún archivo de audio".to_string(),
            ));
        }
        Ok(self.output)
    }

    fn abort(mut self: Box<Self>) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        if self.output.exists() {
            if let Err(e) = fs::remove_file(&self.output) {
                warn!("failed to remove aborted capture {}: {e}", self.output.display());
            }
        }
    }
}

fn find_executable(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Give ffmpeg up to three seconds to finalize the container, then kill it.
fn wait_for_shutdown(child: &mut Child) {
    for _ in 0..SHUTDOWN_ATTEMPTS {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("ffmpeg exited with {status}");
                return;
            }
            Ok(None) => thread::sleep(SHUTDOWN_POLL),
            Err(_) => return,
        }
    }

    warn!("ffmpeg did not exit after stop request, killing pid={}", child.id());
    let _ = child.kill();
    let _ = child.wait();
}
