use crate::domain::prompt::{NewPromptVersion, PromptDefinition};
use crate::error::AppResult;
use async_trait::async_trait;

/// Storage collaborator for versioned prompt definitions.
/// Abstracts the underlying store (Postgres in production, in-memory in tests).
///
/// Implementations are responsible for:
/// - Assigning version numbers (max per key + 1, starting at 1)
/// - Keeping at most one active version per key after every mutation,
///   including under concurrent calls: `insert_version` with `activate` and
///   `activate` must be atomic, never two independent writes
#[async_trait]
pub trait PromptRepository: Send + Sync {
    /// Fetch one version of a key
    async fn find(&self, prompt_key: &str, version: i32) -> AppResult<Option<PromptDefinition>>;

    /// Fetch the active version of a key, if any
    async fn find_active(&self, prompt_key: &str) -> AppResult<Option<PromptDefinition>>;

    /// The active definition for every distinct key
    async fn list_active(&self) -> AppResult<Vec<PromptDefinition>>;

    /// Every version of one key, newest first
    async fn list_versions(&self, prompt_key: &str) -> AppResult<Vec<PromptDefinition>>;

    /// Insert the next version for a key. When `activate` is set, the insert
    /// and the deactivation of all sibling versions happen as one atomic
    /// unit; otherwise sibling rows are left untouched.
    async fn insert_version(
        &self,
        prompt_key: &str,
        fields: NewPromptVersion,
        activate: bool,
    ) -> AppResult<PromptDefinition>;

    /// Atomically deactivate every version of a key, then activate the named
    /// one. Returns `false` with state untouched when the (key, version)
    /// pair does not exist.
    async fn activate(&self, prompt_key: &str, version: i32) -> AppResult<bool>;

    /// Administrative removal of every version of a key. Returns the number
    /// of rows removed.
    async fn delete_key(&self, prompt_key: &str) -> AppResult<u64>;
}
