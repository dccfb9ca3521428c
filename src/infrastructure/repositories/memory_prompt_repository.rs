use super::prompt_repository::PromptRepository;
use crate::domain::prompt::{NewPromptVersion, PromptDefinition};
use crate::error::AppResult;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory implementation of the prompt store, used by tests and local
/// tooling. A single mutex over the row set makes every mutation atomic, so
/// the one-active-version invariant holds under concurrent callers for free.
#[derive(Default)]
pub struct InMemoryPromptRepository {
    rows: Mutex<HashMap<String, Vec<PromptDefinition>>>,
}

impl InMemoryPromptRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PromptRepository for InMemoryPromptRepository {
    async fn find(&self, prompt_key: &str, version: i32) -> AppResult<Option<PromptDefinition>> {
        let rows = self.rows.lock();
        Ok(rows
            .get(prompt_key)
            .and_then(|versions| versions.iter().find(|d| d.version == version))
            .cloned())
    }

    async fn find_active(&self, prompt_key: &str) -> AppResult<Option<PromptDefinition>> {
        let rows = self.rows.lock();
        Ok(rows
            .get(prompt_key)
            .and_then(|versions| versions.iter().find(|d| d.is_active))
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<PromptDefinition>> {
        let rows = self.rows.lock();
        let mut active: Vec<PromptDefinition> = rows
            .values()
            .flat_map(|versions| versions.iter().filter(|d| d.is_active))
            .cloned()
            .collect();
        active.sort_by(|a, b| a.prompt_key.cmp(&b.prompt_key));
        Ok(active)
    }

    async fn list_versions(&self, prompt_key: &str) -> AppResult<Vec<PromptDefinition>> {
        let rows = self.rows.lock();
        let mut versions: Vec<PromptDefinition> =
            rows.get(prompt_key).cloned().unwrap_or_default();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    async fn insert_version(
        &self,
        prompt_key: &str,
        fields: NewPromptVersion,
        activate: bool,
    ) -> AppResult<PromptDefinition> {
        let mut rows = self.rows.lock();
        let versions = rows.entry(prompt_key.to_string()).or_default();

        let next = versions.iter().map(|d| d.version).max().unwrap_or(0) + 1;
        if activate {
            for existing in versions.iter_mut() {
                existing.is_active = false;
            }
        }

        let definition = PromptDefinition {
            id: Uuid::new_v4(),
            prompt_key: prompt_key.to_string(),
            version: next,
            template: fields.template,
            input_schema: fields.input_schema,
            output_schema: fields.output_schema,
            system_instructions: fields.system_instructions,
            user_instructions: fields.user_instructions,
            temperature: fields.temperature,
            max_tokens: fields.max_tokens,
            is_active: activate,
            created_by: fields.created_by,
            created_at: Utc::now(),
        };
        versions.push(definition.clone());
        Ok(definition)
    }

    async fn activate(&self, prompt_key: &str, version: i32) -> AppResult<bool> {
        let mut rows = self.rows.lock();
        let Some(versions) = rows.get_mut(prompt_key) else {
            return Ok(false);
        };
        if !versions.iter().any(|d| d.version == version) {
            return Ok(false);
        }
        for existing in versions.iter_mut() {
            existing.is_active = existing.version == version;
        }
        Ok(true)
    }

    async fn delete_key(&self, prompt_key: &str) -> AppResult<u64> {
        let mut rows = self.rows.lock();
        Ok(rows.remove(prompt_key).map(|v| v.len() as u64).unwrap_or(0))
    }
}
