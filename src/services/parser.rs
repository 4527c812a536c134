use serde_json::Value;

use super::sanitize::truncate_chars;

/// Longest slice of model text kept in a parse error for diagnostics.
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Model returned malformed JSON ({reason}): {snippet}")]
    Malformed { snippet: String, reason: String },
}

/// Strip markdown code fences from the model text and parse it as JSON.
///
/// No semantic checks happen here; any well-formed JSON value is returned.
pub fn parse(raw: &str) -> Result<Value, ParseError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned).map_err(|e| ParseError::Malformed {
        snippet: truncate_chars(cleaned, SNIPPET_CHARS),
        reason: e.to_string(),
    })
}

/// Remove a leading ```lang fence and a trailing ``` fence, plus the
/// whitespace around them.
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text
}
