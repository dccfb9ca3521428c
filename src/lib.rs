//! Podcast generation core: a versioned prompt registry and an audio
//! stitching pipeline.
//!
//! The surrounding service owns transport, auth, scraping and the concrete
//! LLM/TTS provider clients; this crate owns prompt versioning/compilation,
//! structured-output validation and the ffmpeg-backed audio pipeline.

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::audio::{AudioPipeline, AudioPipelineError};
pub use domain::dialogue::DialogueLine;
pub use domain::prompt::{
    ChatMessage, CompiledPrompt, MessageRole, NewPromptVersion, Prompt, PromptDefinition,
    PromptRegistry, PromptServiceError,
};
pub use error::{AppError, AppResult};
