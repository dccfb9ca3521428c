use super::tool::{AudioMetadata, AudioTool};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// ffmpeg/ffprobe implementation of the audio tool.
///
/// Merging uses the concat demuxer with stream copy: no re-encode, input
/// order preserved. The demuxer needs a list file, which is this tool's own
/// scratch concern and is removed before returning.
pub struct FfmpegAudioTool {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegAudioTool {
    pub fn new(ffmpeg_path: impl Into<String>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

#[async_trait]
impl AudioTool for FfmpegAudioTool {
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), String> {
        let list_path = output.with_extension("ffconcat");
        let mut listing = String::from("ffconcat version 1.0\n");
        for input in inputs {
            listing.push_str(&format!("file '{}'\n", input.display()));
        }
        tokio::fs::write(&list_path, listing)
            .await
            .map_err(|e| format!("failed to write concat list: {e}"))?;

        let run = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c", "copy"])
            .arg(output)
            .output()
            .await;

        if let Err(e) = tokio::fs::remove_file(&list_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %list_path.display(),
                    error = %e,
                    "failed to remove concat list"
                );
            }
        }

        let done = run.map_err(|e| format!("failed to spawn {}: {e}", self.ffmpeg_path))?;
        if !done.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.ffmpeg_path,
                done.status,
                stderr_tail(&done.stderr)
            ));
        }
        Ok(())
    }

    async fn probe(&self, input: &Path) -> Result<AudioMetadata, String> {
        let done = Command::new(&self.ffprobe_path)
            .args(["-hide_banner", "-loglevel", "error"])
            .args(["-print_format", "json", "-show_format"])
            .arg(input)
            .output()
            .await
            .map_err(|e| format!("failed to spawn {}: {e}", self.ffprobe_path))?;

        if !done.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.ffprobe_path,
                done.status,
                stderr_tail(&done.stderr)
            ));
        }

        let report: serde_json::Value = serde_json::from_slice(&done.stdout)
            .map_err(|e| format!("unparseable ffprobe output: {e}"))?;
        // ffprobe reports duration as a decimal string inside "format".
        let duration_secs = report
            .get("format")
            .and_then(|format| format.get("duration"))
            .and_then(serde_json::Value::as_str)
            .and_then(|text| text.parse::<f64>().ok());

        Ok(AudioMetadata { duration_secs })
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.trim().lines().last().unwrap_or("").to_string()
}
