//! The compile capability attached to registry reads.
//!
//! A `Prompt` is a definition plus the ability to turn a placeholder map into
//! an LLM-ready message list and to check the model's free-form reply against
//! the stored output contract.

use super::error::PromptServiceError;
use super::model::{ChatMessage, PromptDefinition};
use super::schema::{SchemaValidator, ValidationError};
use super::template;
use serde_json::Value;

/// A prompt definition with compile capability, as returned by
/// `PromptRegistry::get` and `PromptRegistry::create_version`.
#[derive(Debug, Clone)]
pub struct Prompt {
    definition: PromptDefinition,
}

impl Prompt {
    pub(crate) fn new(definition: PromptDefinition) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &PromptDefinition {
        &self.definition
    }

    pub fn into_definition(self) -> PromptDefinition {
        self.definition
    }

    /// Validate `placeholders` against the input schema, then render the
    /// template and assemble the message list.
    ///
    /// The schema check runs first and aborts the compile outright; nothing
    /// renders on invalid input.
    pub fn compile(&self, placeholders: &Value) -> Result<CompiledPrompt, PromptServiceError> {
        let input_validator = SchemaValidator::compile(&self.definition.input_schema);
        input_validator.validate(placeholders)?;

        let map = placeholders.as_object().cloned().unwrap_or_default();
        let rendered = template::render(&self.definition.template, &map);

        let messages = vec![
            ChatMessage::system(self.system_content()),
            ChatMessage::user(self.user_content(&rendered)),
        ];

        Ok(CompiledPrompt {
            messages,
            output_validator: SchemaValidator::compile(&self.definition.output_schema),
        })
    }

    /// System instructions plus the in-band output contract: the reply schema
    /// travels inside the message so the model has it without any
    /// provider-specific structured-output feature.
    fn system_content(&self) -> String {
        let schema = serde_json::to_string_pretty(&self.definition.output_schema)
            .unwrap_or_else(|_| self.definition.output_schema.to_string());
        let contract = format!(
            "Reply with a single JSON value conforming to this schema:\n```json\n{schema}\n```\nDo not include any text outside the JSON."
        );
        if self.definition.system_instructions.is_empty() {
            contract
        } else {
            format!("{}\n\n{contract}", self.definition.system_instructions)
        }
    }

    fn user_content(&self, rendered: &str) -> String {
        if self.definition.user_instructions.is_empty() {
            rendered.to_string()
        } else {
            format!("{}\n\n{rendered}", self.definition.user_instructions)
        }
    }
}

/// A compiled prompt: the message list for the LLM call and the validator for
/// its reply.
#[derive(Debug, Clone)]
pub struct CompiledPrompt {
    messages: Vec<ChatMessage>,
    output_validator: SchemaValidator,
}

impl CompiledPrompt {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn to_messages(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    /// Extract and validate structured output from a raw model reply.
    ///
    /// The first fenced ```json block wins; without one the whole reply is
    /// parsed. A reply that parses as neither passes through as a plain
    /// string so the schema check reports a type error at the root instead of
    /// a JSON syntax error.
    pub fn validate(&self, raw: &str) -> Result<Value, ValidationError> {
        self.validate_value(parse_model_reply(raw))
    }

    /// Validate an already-structured value against the output schema.
    pub fn validate_value(&self, value: Value) -> Result<Value, ValidationError> {
        self.output_validator.validate(&value)?;
        Ok(value)
    }
}

fn parse_model_reply(raw: &str) -> Value {
    let fence = regex::Regex::new(r"(?s)```json\s*(.*?)```").unwrap();
    let candidate = match fence.captures(raw) {
        Some(captures) => captures[1].to_string(),
        None => raw.to_string(),
    };
    serde_json::from_str(candidate.trim()).unwrap_or_else(|_| Value::String(raw.to_string()))
}
