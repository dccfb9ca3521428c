use super::compiled::Prompt;
use super::error::PromptServiceError;
use super::model::{NewPromptVersion, PromptDefinition};
use crate::infrastructure::repositories::PromptRepository;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Versioning, activation and compilation over stored prompt definitions.
///
/// Reads of explicit `(key, version)` pairs may be served from an optional
/// cache: those rows are immutable once written. Active-version resolution
/// always re-reads the store, so a `set_active` elsewhere is visible on the
/// next `get` at the cost of one extra query.
pub struct PromptRegistry {
    repo: Arc<dyn PromptRepository>,
    cache: Option<Cache<(String, i32), PromptDefinition>>,
}

impl PromptRegistry {
    pub fn new(repo: Arc<dyn PromptRepository>, cache_enabled: bool) -> Self {
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(256)
                    .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                    .build(),
            )
        } else {
            None
        };

        Self { repo, cache }
    }

    /// Fetch a prompt with compile capability. `version` omitted means the
    /// active version; fails with `NotFound` when no matching row exists,
    /// including a key that exists but has nothing active.
    pub async fn get(
        &self,
        prompt_key: &str,
        version: Option<i32>,
    ) -> Result<Prompt, PromptServiceError> {
        Ok(Prompt::new(self.fetch(prompt_key, version).await?))
    }

    /// Like `get`, but plain data for display-only consumers.
    pub async fn get_details(
        &self,
        prompt_key: &str,
        version: Option<i32>,
    ) -> Result<PromptDefinition, PromptServiceError> {
        self.fetch(prompt_key, version).await
    }

    /// Create the next version for a key (1 if none exist). With `activate`,
    /// the insert and the deactivation of every sibling version are one
    /// atomic unit in the store; without it, sibling rows, including the
    /// currently active one, are untouched.
    pub async fn create_version(
        &self,
        prompt_key: &str,
        fields: NewPromptVersion,
        activate: bool,
    ) -> Result<Prompt, PromptServiceError> {
        let definition = self.repo.insert_version(prompt_key, fields, activate).await?;

        tracing::info!(
            prompt_key = %definition.prompt_key,
            version = definition.version,
            activated = activate,
            created_by = %definition.created_by,
            "Prompt version created"
        );

        Ok(Prompt::new(definition))
    }

    /// Atomically deactivate every version of `prompt_key`, then activate the
    /// named one. All-or-nothing: when the pair does not exist the previous
    /// active version is left untouched.
    pub async fn set_active(
        &self,
        prompt_key: &str,
        version: i32,
    ) -> Result<(), PromptServiceError> {
        let switched = self.repo.activate(prompt_key, version).await?;
        if !switched {
            return Err(PromptServiceError::ActivationConflict(format!(
                "version {version} of '{prompt_key}' does not exist"
            )));
        }

        tracing::info!(prompt_key, version, "Prompt version activated");
        Ok(())
    }

    /// The active definition for every distinct key.
    pub async fn list_all(&self) -> Result<Vec<PromptDefinition>, PromptServiceError> {
        Ok(self.repo.list_active().await?)
    }

    /// Every version of one key, active or not, newest first.
    pub async fn list_versions(
        &self,
        prompt_key: &str,
    ) -> Result<Vec<PromptDefinition>, PromptServiceError> {
        Ok(self.repo.list_versions(prompt_key).await?)
    }

    /// Administrative removal of a key with all its versions.
    pub async fn delete_key(&self, prompt_key: &str) -> Result<u64, PromptServiceError> {
        // Evict cached copies first; versioned rows are only immutable while
        // they exist.
        if let Some(cache) = &self.cache {
            for definition in self.repo.list_versions(prompt_key).await? {
                cache
                    .invalidate(&(definition.prompt_key, definition.version))
                    .await;
            }
        }

        let removed = self.repo.delete_key(prompt_key).await?;
        tracing::info!(prompt_key, removed, "Prompt key deleted");
        Ok(removed)
    }

    async fn fetch(
        &self,
        prompt_key: &str,
        version: Option<i32>,
    ) -> Result<PromptDefinition, PromptServiceError> {
        match version {
            Some(version) => {
                if let Some(cache) = &self.cache {
                    if let Some(hit) = cache.get(&(prompt_key.to_string(), version)).await {
                        return Ok(hit);
                    }
                }

                let definition = self
                    .repo
                    .find(prompt_key, version)
                    .await?
                    .ok_or(PromptServiceError::NotFound)?;

                if let Some(cache) = &self.cache {
                    cache
                        .insert((prompt_key.to_string(), version), definition.clone())
                        .await;
                }
                Ok(definition)
            }
            None => self
                .repo
                .find_active(prompt_key)
                .await?
                .ok_or(PromptServiceError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::InMemoryPromptRepository;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(created_by: &str) -> NewPromptVersion {
        NewPromptVersion {
            template: "Summarize {article_html}".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"article_html": {"type": "string"}},
                "required": ["article_html"]
            }),
            output_schema: json!({"type": "object"}),
            system_instructions: String::new(),
            user_instructions: String::new(),
            temperature: Some(0.4),
            max_tokens: None,
            created_by: created_by.to_string(),
        }
    }

    fn registry() -> PromptRegistry {
        PromptRegistry::new(Arc::new(InMemoryPromptRepository::new()), false)
    }

    #[tokio::test]
    async fn versions_are_monotonic_from_one() {
        let registry = registry();
        for expected in 1..=4 {
            let prompt = registry
                .create_version("script-gen", fields("admin"), false)
                .await
                .unwrap();
            assert_eq!(prompt.definition().version, expected);
        }
    }

    #[tokio::test]
    async fn activating_create_deactivates_siblings() {
        let registry = registry();
        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();
        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();

        let versions = registry.list_versions("script-gen").await.unwrap();
        let active: Vec<i32> = versions
            .iter()
            .filter(|d| d.is_active)
            .map(|d| d.version)
            .collect();
        assert_eq!(active, vec![2]);
    }

    #[tokio::test]
    async fn non_activating_create_leaves_active_row_untouched() {
        let registry = registry();
        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();
        registry
            .create_version("script-gen", fields("admin"), false)
            .await
            .unwrap();

        let active = registry.get_details("script-gen", None).await.unwrap();
        assert_eq!(active.version, 1);
        assert!(active.is_active);
    }

    #[tokio::test]
    async fn set_active_swaps_the_single_active_version() {
        let registry = registry();
        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();
        registry
            .create_version("script-gen", fields("admin"), false)
            .await
            .unwrap();

        registry.set_active("script-gen", 2).await.unwrap();

        let versions = registry.list_versions("script-gen").await.unwrap();
        let active: Vec<i32> = versions
            .iter()
            .filter(|d| d.is_active)
            .map(|d| d.version)
            .collect();
        assert_eq!(active, vec![2]);
    }

    #[tokio::test]
    async fn set_active_on_missing_version_rolls_back_entirely() {
        let registry = registry();
        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();

        let err = registry.set_active("script-gen", 9).await.unwrap_err();
        assert!(matches!(err, PromptServiceError::ActivationConflict(_)));

        let active = registry.get_details("script-gen", None).await.unwrap();
        assert_eq!(active.version, 1);
        assert!(active.is_active);
    }

    #[tokio::test]
    async fn get_without_version_requires_an_active_row() {
        let registry = registry();
        registry
            .create_version("script-gen", fields("admin"), false)
            .await
            .unwrap();

        // Key exists but nothing was ever activated.
        let err = registry.get("script-gen", None).await.unwrap_err();
        assert!(matches!(err, PromptServiceError::NotFound));

        let err = registry.get("no-such-key", None).await.unwrap_err();
        assert!(matches!(err, PromptServiceError::NotFound));

        assert!(registry.get("script-gen", Some(1)).await.is_ok());
        let err = registry.get("script-gen", Some(2)).await.unwrap_err();
        assert!(matches!(err, PromptServiceError::NotFound));
    }

    #[tokio::test]
    async fn list_all_returns_one_active_definition_per_key() {
        let registry = registry();
        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();
        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();
        registry
            .create_version("summarize", fields("admin"), true)
            .await
            .unwrap();
        registry
            .create_version("drafts-only", fields("admin"), false)
            .await
            .unwrap();

        let all = registry.list_all().await.unwrap();
        let keys: Vec<&str> = all.iter().map(|d| d.prompt_key.as_str()).collect();
        assert_eq!(keys, vec!["script-gen", "summarize"]);
        assert!(all.iter().all(|d| d.is_active));
    }

    #[tokio::test]
    async fn delete_key_removes_every_version() {
        let registry = registry();
        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();
        registry
            .create_version("script-gen", fields("admin"), false)
            .await
            .unwrap();

        assert_eq!(registry.delete_key("script-gen").await.unwrap(), 2);
        assert!(registry.list_versions("script-gen").await.unwrap().is_empty());
        let err = registry.get("script-gen", Some(1)).await.unwrap_err();
        assert!(matches!(err, PromptServiceError::NotFound));
    }

    #[tokio::test]
    async fn cached_registry_never_serves_stale_active_reads() {
        let repo = Arc::new(InMemoryPromptRepository::new());
        let registry = PromptRegistry::new(repo, true);

        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();
        registry
            .create_version("script-gen", fields("admin"), false)
            .await
            .unwrap();

        // Warm the versioned-row cache, then flip activation.
        assert_eq!(
            registry.get_details("script-gen", Some(1)).await.unwrap().version,
            1
        );
        registry.set_active("script-gen", 2).await.unwrap();

        let active = registry.get_details("script-gen", None).await.unwrap();
        assert_eq!(active.version, 2);
    }

    #[tokio::test]
    async fn cached_delete_evicts_versioned_rows() {
        let repo = Arc::new(InMemoryPromptRepository::new());
        let registry = PromptRegistry::new(repo, true);

        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();
        registry.get_details("script-gen", Some(1)).await.unwrap();

        registry.delete_key("script-gen").await.unwrap();
        let err = registry.get_details("script-gen", Some(1)).await.unwrap_err();
        assert!(matches!(err, PromptServiceError::NotFound));
    }

    #[tokio::test]
    async fn concurrent_activations_leave_exactly_one_active() {
        let repo = Arc::new(InMemoryPromptRepository::new());
        let registry = Arc::new(PromptRegistry::new(repo, false));

        registry
            .create_version("script-gen", fields("admin"), true)
            .await
            .unwrap();
        for _ in 0..4 {
            registry
                .create_version("script-gen", fields("admin"), false)
                .await
                .unwrap();
        }

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    registry.set_active("script-gen", (i % 5) + 1).await
                })
            })
            .collect();
        for task in futures::future::join_all(tasks).await {
            task.unwrap().unwrap();
        }

        let versions = registry.list_versions("script-gen").await.unwrap();
        let active_count = versions.iter().filter(|d| d.is_active).count();
        assert_eq!(active_count, 1);
    }

    #[tokio::test]
    async fn concurrent_creates_assign_distinct_consecutive_versions() {
        let repo = Arc::new(InMemoryPromptRepository::new());
        let registry = Arc::new(PromptRegistry::new(repo, false));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    registry
                        .create_version("script-gen", fields("admin"), false)
                        .await
                })
            })
            .collect();
        for task in futures::future::join_all(tasks).await {
            task.unwrap().unwrap();
        }

        let mut versions: Vec<i32> = registry
            .list_versions("script-gen")
            .await
            .unwrap()
            .iter()
            .map(|d| d.version)
            .collect();
        versions.sort_unstable();
        assert_eq!(versions, (1..=8).collect::<Vec<i32>>());
    }
}
