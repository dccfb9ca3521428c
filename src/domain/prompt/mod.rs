pub mod compiled;
pub mod defaults;
pub mod error;
pub mod model;
pub mod schema;
pub mod service;
pub mod template;

pub use compiled::{CompiledPrompt, Prompt};
pub use error::PromptServiceError;
pub use model::{ChatMessage, MessageRole, NewPromptVersion, PromptDefinition};
pub use schema::{SchemaValidator, ValidationError, Violation};
pub use service::PromptRegistry;
