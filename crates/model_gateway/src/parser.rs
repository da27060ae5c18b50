//! Parser module for LLM response parsing.
//!
//! Models wrap JSON in markdown fences or surround it with prose; this
//! module isolates the first complete JSON object and deserializes it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use defi_agent_core::{Error, Result};

/// Return the first balanced `{...}` object in `text`, ignoring braces inside strings.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the JSON object embedded in `text` into `T`.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let object = extract_json_object(text)
        .ok_or_else(|| Error::malformed_output("no JSON object found in model output"))?;

    serde_json::from_str(object)
        .map_err(|e| Error::malformed_output(format!("unexpected JSON shape: {}", e)))
}

/// Parse the embedded JSON object as an untyped value.
pub fn parse_json_object(text: &str) -> Result<Value> {
    let value: Value = parse_json(text)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(Error::malformed_output("model output is not a JSON object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Shape {
        name: String,
    }

    #[test]
    fn test_extracts_fenced_json() {
        let text = "Here you go:\n```json\n{\"name\": \"aave\", \"nested\": {\"a\": 1}}\n```\nDone.";
        let shape: Shape = parse_json(text).unwrap();
        assert_eq!(shape.name, "aave");
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"{"name": "curly } brace \" {"} trailing {"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"name": "curly } brace \" {"}"#)
        );
    }

    #[test]
    fn test_malformed_output() {
        assert!(matches!(
            parse_json::<Shape>("no json here"),
            Err(Error::MalformedOutput(_))
        ));
        assert!(matches!(
            parse_json::<Shape>("{\"other\": 1}"),
            Err(Error::MalformedOutput(_))
        ));
        assert!(matches!(
            parse_json::<Shape>("{\"name\": \"unterminated\""),
            Err(Error::MalformedOutput(_))
        ));
    }
}
