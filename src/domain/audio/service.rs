use super::error::AudioPipelineError;
use crate::infrastructure::audio::AudioTool;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// The one codec/container the pipeline handles: the TTS collaborator emits
/// MP3 and concatenation is lossless, so the merged asset stays MP3 too.
const AUDIO_MIME: &str = "audio/mpeg";

/// Stitches per-line synthesis buffers into one playable asset.
///
/// Invocations are independent: the only shared state is the scratch
/// directory namespace, and every scratch name carries a random component, so
/// concurrent calls (even with a reused process id) never collide.
pub struct AudioPipeline {
    tool: Arc<dyn AudioTool>,
    scratch_dir: PathBuf,
}

impl AudioPipeline {
    pub fn new(tool: Arc<dyn AudioTool>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Concatenate the usable buffers, in order, into one asset.
    ///
    /// `None` entries (lines whose synthesis failed upstream) are skipped;
    /// with nothing left the call fails with `NoValidInput` before any file
    /// is created. A tool failure is fatal and not retried here. Every
    /// scratch file created by the call is removed on exit, success or
    /// failure.
    pub async fn stitch_audio(
        &self,
        buffers: &[Option<Vec<u8>>],
        process_id: &str,
    ) -> Result<Vec<u8>, AudioPipelineError> {
        let usable: Vec<&[u8]> = buffers.iter().filter_map(|b| b.as_deref()).collect();
        if usable.is_empty() {
            return Err(AudioPipelineError::NoValidInput);
        }

        let start = std::time::Instant::now();
        let mut scratch = ScratchGuard::new();

        let mut inputs = Vec::with_capacity(usable.len());
        for (index, buffer) in usable.iter().enumerate() {
            let path = self.scratch_path(process_id, &format!("part{index}"));
            scratch.track(path.clone());
            tokio::fs::write(&path, buffer).await?;
            inputs.push(path);
        }

        let output = self.scratch_path(process_id, "merged");
        scratch.track(output.clone());

        self.tool
            .merge(&inputs, &output)
            .await
            .map_err(AudioPipelineError::ExternalTool)?;

        let merged = tokio::fs::read(&output).await?;

        tracing::info!(
            process_id,
            segment_count = inputs.len(),
            skipped = buffers.len() - inputs.len(),
            merged_bytes = merged.len(),
            latency_ms = start.elapsed().as_millis(),
            "Audio stitched"
        );

        Ok(merged)
    }

    /// Best-effort duration probe in seconds. Any failure (scratch write,
    /// tool error, absent or non-numeric duration) degrades to 0.0; duration
    /// is metadata enrichment, never worth failing a generation over.
    pub async fn audio_duration_secs(&self, buffer: &[u8]) -> f64 {
        let mut scratch = ScratchGuard::new();
        let path = self.scratch_path("probe", "input");
        scratch.track(path.clone());

        if let Err(e) = tokio::fs::write(&path, buffer).await {
            tracing::warn!(error = %e, "Duration probe skipped: scratch write failed");
            return 0.0;
        }

        match self.tool.probe(&path).await {
            Ok(metadata) => match metadata.duration_secs {
                Some(secs) => secs,
                None => {
                    tracing::warn!("Duration probe reported no duration field");
                    0.0
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Duration probe failed");
                0.0
            }
        }
    }

    /// Encode an asset as a `data:audio/mpeg;base64,...` URI for text-based
    /// transports. Pure function, no I/O.
    pub fn encode_base64(&self, buffer: &[u8]) -> String {
        format!("data:{AUDIO_MIME};base64,{}", BASE64.encode(buffer))
    }

    fn scratch_path(&self, process_id: &str, label: &str) -> PathBuf {
        // Retried requests reuse process ids; the uuid keeps names unique.
        let name = format!("{}-{label}-{}.mp3", sanitize(process_id), Uuid::new_v4());
        self.scratch_dir.join(name)
    }
}

fn sanitize(process_id: &str) -> String {
    process_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Tracks every scratch path of one pipeline call and removes them when the
/// call exits, however it exits. Paths are tracked before first use, so a
/// partial write is cleaned up too; a path that was never actually created
/// (the merge failed before producing output) is silently fine.
struct ScratchGuard {
    paths: Vec<PathBuf>,
}

impl ScratchGuard {
    fn new() -> Self {
        Self { paths: Vec::new() }
    }

    fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to remove scratch file"
                    );
                }
            }
        }
    }
}
