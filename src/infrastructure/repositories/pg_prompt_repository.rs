use super::prompt_repository::PromptRepository;
use crate::domain::prompt::{NewPromptVersion, PromptDefinition};
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Postgres implementation of the prompt store, over a `prompt_definitions`
/// table with a unique index on `(prompt_key, version)`.
///
/// Mutations for one key serialize on a per-key advisory transaction lock, so
/// version assignment and the one-active-version invariant hold under
/// concurrent writers without relying on serializable isolation.
pub struct PgPromptRepository {
    pool: Arc<DbPool>,
}

impl PgPromptRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromptRepository for PgPromptRepository {
    async fn find(&self, prompt_key: &str, version: i32) -> AppResult<Option<PromptDefinition>> {
        let pool = self.pool.as_ref();
        let definition = sqlx::query_as::<_, PromptDefinition>(
            r#"
            SELECT id, prompt_key, version, template, input_schema, output_schema,
                   system_instructions, user_instructions, temperature, max_tokens,
                   is_active, created_by, created_at
            FROM prompt_definitions
            WHERE prompt_key = $1 AND version = $2
            "#,
        )
        .bind(prompt_key)
        .bind(version)
        .fetch_optional(pool)
        .await?;

        Ok(definition)
    }

    async fn find_active(&self, prompt_key: &str) -> AppResult<Option<PromptDefinition>> {
        let pool = self.pool.as_ref();
        let definition = sqlx::query_as::<_, PromptDefinition>(
            r#"
            SELECT id, prompt_key, version, template, input_schema, output_schema,
                   system_instructions, user_instructions, temperature, max_tokens,
                   is_active, created_by, created_at
            FROM prompt_definitions
            WHERE prompt_key = $1 AND is_active = true
            "#,
        )
        .bind(prompt_key)
        .fetch_optional(pool)
        .await?;

        Ok(definition)
    }

    async fn list_active(&self) -> AppResult<Vec<PromptDefinition>> {
        let pool = self.pool.as_ref();
        let definitions = sqlx::query_as::<_, PromptDefinition>(
            r#"
            SELECT id, prompt_key, version, template, input_schema, output_schema,
                   system_instructions, user_instructions, temperature, max_tokens,
                   is_active, created_by, created_at
            FROM prompt_definitions
            WHERE is_active = true
            ORDER BY prompt_key
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(definitions)
    }

    async fn list_versions(&self, prompt_key: &str) -> AppResult<Vec<PromptDefinition>> {
        let pool = self.pool.as_ref();
        let definitions = sqlx::query_as::<_, PromptDefinition>(
            r#"
            SELECT id, prompt_key, version, template, input_schema, output_schema,
                   system_instructions, user_instructions, temperature, max_tokens,
                   is_active, created_by, created_at
            FROM prompt_definitions
            WHERE prompt_key = $1
            ORDER BY version DESC
            "#,
        )
        .bind(prompt_key)
        .fetch_all(pool)
        .await?;

        Ok(definitions)
    }

    async fn insert_version(
        &self,
        prompt_key: &str,
        fields: NewPromptVersion,
        activate: bool,
    ) -> AppResult<PromptDefinition> {
        let mut tx = self.pool.begin().await?;

        // Serialize writers for this key so max(version) + 1 stays monotonic.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(prompt_key)
            .execute(&mut *tx)
            .await?;

        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM prompt_definitions WHERE prompt_key = $1",
        )
        .bind(prompt_key)
        .fetch_one(&mut *tx)
        .await?;

        if activate {
            sqlx::query("UPDATE prompt_definitions SET is_active = false WHERE prompt_key = $1")
                .bind(prompt_key)
                .execute(&mut *tx)
                .await?;
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

        sqlx::query(
            r#"
            INSERT INTO prompt_definitions (
                id, prompt_key, version, template, input_schema, output_schema,
                system_instructions, user_instructions, temperature, max_tokens,
                is_active, created_by, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(definition.id)
        .bind(&definition.prompt_key)
        .bind(definition.version)
        .bind(&definition.template)
        .bind(&definition.input_schema)
        .bind(&definition.output_schema)
        .bind(&definition.system_instructions)
        .bind(&definition.user_instructions)
        .bind(definition.temperature)
        .bind(definition.max_tokens)
        .bind(definition.is_active)
        .bind(&definition.created_by)
        .bind(definition.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("Prompt version already exists".to_string());
                }
            }
            AppError::Database(e)
        })?;

        tx.commit().await?;
        Ok(definition)
    }

    async fn activate(&self, prompt_key: &str, version: i32) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(prompt_key)
            .execute(&mut *tx)
            .await?;

        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM prompt_definitions
                WHERE prompt_key = $1 AND version = $2
            )
            "#,
        )
        .bind(prompt_key)
        .bind(version)
        .fetch_one(&mut *tx)
        .await?;

        if !exists {
            tx.rollback().await?;
            return Ok(false);
        }

        // Deactivate-all-then-activate-one as a single statement.
        sqlx::query(
            "UPDATE prompt_definitions SET is_active = (version = $2) WHERE prompt_key = $1",
        )
        .bind(prompt_key)
        .bind(version)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_key(&self, prompt_key: &str) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query("DELETE FROM prompt_definitions WHERE prompt_key = $1")
            .bind(prompt_key)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
