use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum AudioPipelineError {
    #[error("no usable audio buffers to stitch")]
    NoValidInput,
    #[error("audio tool failed: {0}")]
    ExternalTool(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AudioPipelineError> for AppError {
    fn from(err: AudioPipelineError) -> Self {
        match err {
            AudioPipelineError::NoValidInput => {
                AppError::BadRequest("no usable audio buffers to stitch".to_string())
            }
            AudioPipelineError::ExternalTool(msg) => AppError::ExternalService(msg),
            AudioPipelineError::Io(e) => AppError::Internal(e.to_string()),
            AudioPipelineError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
