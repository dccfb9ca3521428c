//! Placeholder interpolation for stored templates.
//!
//! Rendering is best-effort by design: the input schema check runs before any
//! template renders, so an unknown `{name}` here means the schema chose not to
//! require it, and it renders as the empty string rather than failing.

use serde_json::{Map, Value};

/// Render `template`, substituting every `{name}` reference from
/// `placeholders`. Pure function: same inputs, same output.
pub fn render(template: &str, placeholders: &Map<String, Value>) -> String {
    let reference = regex::Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    reference
        .replace_all(template, |caps: &regex::Captures| {
            placeholders
                .get(&caps[1])
                .map(render_value)
                .unwrap_or_default()
        })
        .into_owned()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Compound values render as compact JSON; a template that wants
        // prettier output should take pre-rendered string placeholders.
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn substitutes_named_placeholders() {
        let rendered = render(
            "Summarize {article_title} in {word_count} words.",
            &map(json!({"article_title": "Fed Holds Rates", "word_count": 120})),
        );
        assert_eq!(rendered, "Summarize Fed Holds Rates in 120 words.");
    }

    #[test]
    fn undefined_placeholder_renders_empty() {
        let rendered = render("Hello {name}{punctuation}", &map(json!({"name": "Ada"})));
        assert_eq!(rendered, "Hello Ada");
    }

    #[test]
    fn repeated_references_render_identically() {
        let placeholders = map(json!({"ticker": "ACME"}));
        let rendered = render("{ticker} and {ticker} again", &placeholders);
        assert_eq!(rendered, "ACME and ACME again");
        // Idempotent: rendering twice with the same inputs changes nothing.
        assert_eq!(render("{ticker} and {ticker} again", &placeholders), rendered);
    }

    #[test]
    fn compound_values_render_as_json() {
        let rendered = render(
            "Context: {tags}",
            &map(json!({"tags": ["markets", "rates"]})),
        );
        assert_eq!(rendered, r#"Context: ["markets","rates"]"#);
    }

    #[test]
    fn null_and_scalars() {
        let rendered = render(
            "{a}|{b}|{c}",
            &map(json!({"a": null, "b": true, "c": 4.5})),
        );
        assert_eq!(rendered, "|true|4.5");
    }

    #[test]
    fn text_without_references_passes_through() {
        let rendered = render("No braces here.", &Map::new());
        assert_eq!(rendered, "No braces here.");
    }
}
