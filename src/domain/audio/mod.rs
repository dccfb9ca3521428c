pub mod error;
pub mod service;

pub use error::AudioPipelineError;
pub use service::AudioPipeline;
