use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Structured metadata reported by the probe capability.
#[derive(Debug, Clone, Default)]
pub struct AudioMetadata {
    pub duration_secs: Option<f64>,
}

/// External audio-processing collaborator.
/// Abstracts the underlying tool (ffmpeg/ffprobe in production) so tests can
/// substitute a fake without spawning a real binary.
///
/// Implementations are responsible for:
/// - Lossless, order-preserving concatenation of the input files
/// - Cleaning up any scratch files of their own making
#[async_trait]
pub trait AudioTool: Send + Sync {
    /// Concatenate `inputs` in order into `output`.
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), String>;

    /// Probe a single file for metadata.
    async fn probe(&self, input: &Path) -> Result<AudioMetadata, String>;
}
