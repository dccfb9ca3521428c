//! Bridge from stored structural schema descriptions to runtime validators.
//!
//! Prompt rows carry their input/output contracts as JSON documents
//! (`{"type": "object", "properties": {...}, "required": [...]}`); this module
//! compiles those documents into validators used both for placeholder checking
//! before a template renders and for shape-checking model output.

use serde_json::Value;
use std::collections::HashSet;

/// One offending location in the validated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSONPath-style location, e.g. `$.lines[2].speaker`.
    pub path: String,
    pub message: String,
}

/// Schema violation carrying every offending path, not just the first.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let detail = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.path, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "schema validation failed: {detail}")
    }
}

impl std::error::Error for ValidationError {}

/// Runtime validator compiled from a structural schema description.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    root: Node,
}

impl SchemaValidator {
    /// Compile a schema document into a validator.
    ///
    /// An unknown or missing `type` compiles to a validator that accepts
    /// everything. That is a compatibility policy, not an oversight: stored
    /// schemas predate some of the kinds this interpreter knows about, and a
    /// prompt must never stop compiling because its schema uses a kind we do
    /// not check.
    pub fn compile(schema: &Value) -> Self {
        Self {
            root: Node::compile(schema),
        }
    }

    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        self.root.check(value, "$", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Any,
    Str,
    Number,
    Integer,
    Boolean,
    Array(Box<Node>),
    Object { properties: Vec<Property> },
}

#[derive(Debug, Clone)]
struct Property {
    name: String,
    required: bool,
    node: Node,
}

impl Node {
    fn compile(schema: &Value) -> Node {
        match schema.get("type").and_then(Value::as_str) {
            Some("string") => Node::Str,
            Some("number") => Node::Number,
            Some("integer") => Node::Integer,
            Some("boolean") => Node::Boolean,
            Some("array") => {
                let items = schema
                    .get("items")
                    .map(Node::compile)
                    .unwrap_or(Node::Any);
                Node::Array(Box::new(items))
            }
            Some("object") => {
                let required: HashSet<&str> = schema
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|names| names.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                let properties = schema
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(name, sub)| Property {
                                name: name.clone(),
                                required: required.contains(name.as_str()),
                                node: Node::compile(sub),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                Node::Object { properties }
            }
            _ => Node::Any,
        }
    }

    fn check(&self, value: &Value, path: &str, violations: &mut Vec<Violation>) {
        match self {
            Node::Any => {}
            Node::Str => {
                if !value.is_string() {
                    violations.push(mismatch(path, "string", value));
                }
            }
            Node::Number => {
                if !value.is_number() {
                    violations.push(mismatch(path, "number", value));
                }
            }
            Node::Integer => {
                if value.as_i64().is_none() && value.as_u64().is_none() {
                    violations.push(mismatch(path, "integer", value));
                }
            }
            Node::Boolean => {
                if !value.is_boolean() {
                    violations.push(mismatch(path, "boolean", value));
                }
            }
            Node::Array(items) => match value.as_array() {
                Some(elements) => {
                    for (index, element) in elements.iter().enumerate() {
                        items.check(element, &format!("{path}[{index}]"), violations);
                    }
                }
                None => violations.push(mismatch(path, "array", value)),
            },
            Node::Object { properties } => match value.as_object() {
                Some(map) => {
                    for property in properties {
                        match map.get(&property.name) {
                            Some(sub) => {
                                property.node.check(
                                    sub,
                                    &format!("{path}.{}", property.name),
                                    violations,
                                );
                            }
                            None if property.required => violations.push(Violation {
                                path: format!("{path}.{}", property.name),
                                message: "missing required field".to_string(),
                            }),
                            None => {}
                        }
                    }
                }
                None => violations.push(mismatch(path, "object", value)),
            },
        }
    }
}

fn mismatch(path: &str, expected: &str, got: &Value) -> Violation {
    Violation {
        path: path.to_string(),
        message: format!("expected {expected}, got {}", kind_of(got)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn paths(err: ValidationError) -> Vec<String> {
        err.violations.into_iter().map(|v| v.path).collect()
    }

    #[test]
    fn accepts_matching_object() {
        let validator = SchemaValidator::compile(&json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "score": {"type": "number"}
            },
            "required": ["title"]
        }));

        assert!(validator.validate(&json!({"title": "Markets", "score": 0.9})).is_ok());
        // Optional property may be absent entirely.
        assert!(validator.validate(&json!({"title": "Markets"})).is_ok());
    }

    #[test]
    fn reports_missing_required_field() {
        let validator = SchemaValidator::compile(&json!({
            "type": "object",
            "properties": {"title": {"type": "string"}},
            "required": ["title"]
        }));

        let err = validator.validate(&json!({})).unwrap_err();
        assert_eq!(paths(err), vec!["$.title".to_string()]);
    }

    #[test]
    fn reports_every_offending_path_in_nested_arrays() {
        let validator = SchemaValidator::compile(&json!({
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
        }));

        let err = validator
            .validate(&json!({
                "lines": [
                    {"speaker": "Alex", "line": "Hello"},
                    {"speaker": 7},
                    {"speaker": "Sam", "line": "Hi"}
                ]
            }))
            .unwrap_err();
        let mut got = paths(err);
        got.sort();
        assert_eq!(
            got,
            vec!["$.lines[1].line".to_string(), "$.lines[1].speaker".to_string()]
        );
    }

    #[test]
    fn integer_rejects_fractional_numbers() {
        let validator = SchemaValidator::compile(&json!({"type": "integer"}));
        assert!(validator.validate(&json!(3)).is_ok());
        assert!(validator.validate(&json!(3.5)).is_err());

        let number = SchemaValidator::compile(&json!({"type": "number"}));
        assert!(number.validate(&json!(3.5)).is_ok());
    }

    #[test]
    fn unknown_type_is_permissive() {
        let validator = SchemaValidator::compile(&json!({"type": "timestamp"}));
        assert!(validator.validate(&json!("2026-01-01")).is_ok());
        assert!(validator.validate(&json!({"anything": ["goes"]})).is_ok());

        let untyped = SchemaValidator::compile(&json!({}));
        assert!(untyped.validate(&json!(null)).is_ok());
    }

    #[test]
    fn top_level_type_mismatch_names_the_root() {
        let validator = SchemaValidator::compile(&json!({"type": "object", "properties": {}}));
        let err = validator.validate(&json!("not an object")).unwrap_err();
        assert_eq!(paths(err), vec!["$".to_string()]);
    }

    #[test]
    fn error_message_lists_paths() {
        let validator = SchemaValidator::compile(&json!({
            "type": "object",
            "properties": {"a": {"type": "boolean"}},
            "required": ["a"]
        }));
        let err = validator.validate(&json!({"a": "yes"})).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("$.a"), "got: {rendered}");
        assert!(rendered.contains("expected boolean"), "got: {rendered}");
    }
}
