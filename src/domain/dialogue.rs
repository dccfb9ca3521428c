use serde::{Deserialize, Serialize};

/// One speaker/utterance pair of a generated script. Produced by the LLM
/// step, synthesized one buffer per line, and stitched in this order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DialogueLine {
    pub speaker: String,
    pub line: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_from_validated_model_output() {
        let value = serde_json::json!({
            "lines": [
                {"speaker": "Alex", "line": "Markets rallied today."},
                {"speaker": "Sam", "line": "Let's unpack why."}
            ]
        });

        #[derive(Deserialize)]
        struct Script {
            lines: Vec<DialogueLine>,
        }

        let script: Script = serde_json::from_value(value).unwrap();
        assert_eq!(script.lines.len(), 2);
        assert_eq!(script.lines[0].speaker, "Alex");
        assert_eq!(script.lines[1].line, "Let's unpack why.");
    }
}
