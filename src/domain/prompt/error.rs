use super::schema::ValidationError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum PromptServiceError {
    #[error("prompt not found")]
    NotFound,
    #[error("activation conflict: {0}")]
    ActivationConflict(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for PromptServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(_) => PromptServiceError::NotFound,
            AppError::Conflict(msg) => PromptServiceError::ActivationConflict(msg),
            AppError::BadRequest(msg) => PromptServiceError::Invalid(msg),
            _ => PromptServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<PromptServiceError> for AppError {
    fn from(err: PromptServiceError) -> Self {
        match err {
            PromptServiceError::NotFound => AppError::NotFound("Prompt not found".to_string()),
            PromptServiceError::ActivationConflict(msg) => AppError::Conflict(msg),
            PromptServiceError::Validation(e) => AppError::BadRequest(e.to_string()),
            PromptServiceError::Invalid(msg) => AppError::BadRequest(msg),
            PromptServiceError::Dependency(msg) => AppError::Internal(msg),
            PromptServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
