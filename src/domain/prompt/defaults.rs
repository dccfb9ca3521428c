//! Built-in prompt definitions.
//!
//! Fresh deployments seed these as version 1 of their keys; operators iterate
//! on them through the registry afterwards, so the constants here are only
//! the starting point, never the source of truth for a running system.

use super::error::PromptServiceError;
use super::model::NewPromptVersion;
use super::service::PromptRegistry;
use serde_json::{json, Value};

/// Well-known prompt keys.
pub mod keys {
    /// Two-host dialogue script generation from scraped article HTML.
    pub const SCRIPT_GEN: &str = "script-gen";
    /// Short episode description from the same article.
    pub const EPISODE_SUMMARY: &str = "episode-summary";
}

const SEED_AUTHOR: &str = "system";

const SCRIPT_GEN_TEMPLATE: &str = r#"Here is the article to cover, as scraped HTML:

{article_html}

Turn it into a dialogue between the two hosts. Alternate speakers, open with
a one-line hook, and close with a short sign-off. Every line must be natural
spoken language with no markup."#;

const SCRIPT_GEN_SYSTEM: &str = "You are the script writer for a two-host financial news podcast. \
The hosts are called Alex and Sam; Alex frames the story, Sam pushes on what it means for listeners. \
Keep the tone conversational and concrete, and never invent numbers that are not in the article.";

const EPISODE_SUMMARY_TEMPLATE: &str = r#"Write the episode description for a podcast episode covering this article:

{article_html}"#;

const EPISODE_SUMMARY_SYSTEM: &str = "You write tight, factual podcast episode descriptions. \
Two sentences, no hype, no emoji.";

/// Output contract shared by every script-producing prompt: an ordered list
/// of speaker/line pairs. Orchestrators composing their own prompts should
/// reuse this so the audio pipeline's expectations hold.
pub fn dialogue_script_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "lines": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "speaker": {"type": "string"},
                        "line": {"type": "string"}
                    },
                    "required": ["speaker", "line"]
                }
            }
        },
        "required": ["lines"]
    })
}

fn article_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "article_html": {"type": "string"}
        },
        "required": ["article_html"]
    })
}

fn script_gen() -> NewPromptVersion {
    NewPromptVersion {
        template: SCRIPT_GEN_TEMPLATE.to_string(),
        input_schema: article_input_schema(),
        output_schema: dialogue_script_schema(),
        system_instructions: SCRIPT_GEN_SYSTEM.to_string(),
        user_instructions: String::new(),
        temperature: Some(0.7),
        max_tokens: Some(4096),
        created_by: SEED_AUTHOR.to_string(),
    }
}

fn episode_summary() -> NewPromptVersion {
    NewPromptVersion {
        template: EPISODE_SUMMARY_TEMPLATE.to_string(),
        input_schema: article_input_schema(),
        output_schema: json!({
            "type": "object",
            "properties": {"summary": {"type": "string"}},
            "required": ["summary"]
        }),
        system_instructions: EPISODE_SUMMARY_SYSTEM.to_string(),
        user_instructions: String::new(),
        temperature: Some(0.3),
        max_tokens: Some(512),
        created_by: SEED_AUTHOR.to_string(),
    }
}

/// Insert version 1 of any built-in key that does not exist yet, activated.
/// Keys that already have versions are left completely untouched, whatever
/// their activation state.
pub async fn seed_defaults(registry: &PromptRegistry) -> Result<(), PromptServiceError> {
    let seeds = [
        (keys::SCRIPT_GEN, script_gen()),
        (keys::EPISODE_SUMMARY, episode_summary()),
    ];

    for (key, fields) in seeds {
        if registry.list_versions(key).await?.is_empty() {
            registry.create_version(key, fields, true).await?;
            tracing::info!(prompt_key = key, "Seeded built-in prompt");
        }
    }

    Ok(())
}
