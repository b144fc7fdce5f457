// Post-assembly check: envelope/routing keys must never show up inside a
// `request.contents[i]` entry. Opaque tool payloads are exempt.
use serde_json::Value;
use thiserror::Error;

use crate::constants::is_reserved_content_field;
use crate::error::TranslateError;
use crate::proxy::common::json_tree::{self, JsonPath};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("reserved field '{field}' leaked into {path}")]
pub struct LeakViolation {
    pub path: String,
    pub field: String,
}

impl From<LeakViolation> for TranslateError {
    fn from(violation: LeakViolation) -> Self {
        TranslateError::ScopeViolation {
            path: violation.path,
            field: violation.field,
        }
    }
}

// Client-controlled subtrees that may legitimately carry any key.
fn opaque_roots(entry: &Value) -> Vec<JsonPath> {
    let Some(parts) = entry.get("parts").and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut roots = Vec::new();
    for (k, part) in parts.iter().enumerate() {
        if part.get("functionResponse").is_some() {
            roots.push(
                JsonPath::root()
                    .key("parts")
                    .index(k)
                    .key("functionResponse")
                    .key("response"),
            );
        }
        if part.get("functionCall").is_some() {
            roots.push(
                JsonPath::root()
                    .key("parts")
                    .index(k)
                    .key("functionCall")
                    .key("args"),
            );
        }
    }
    roots
}

/// Checks one contents entry. Returns the first reserved key found, with a
/// path relative to the envelope.
pub fn verify_content_entry(index: usize, entry: &Value) -> Result<(), LeakViolation> {
    let opaque = opaque_roots(entry);
    let hits = json_tree::walk_matching(entry, is_reserved_content_field, &opaque);
    match hits.first() {
        None => Ok(()),
        Some(path) => Err(LeakViolation {
            path: if path.is_empty() {
                format!("request.contents.{}", index)
            } else {
                format!("request.contents.{}.{}", index, path)
            },
            field: path.last_key().unwrap_or_default().to_string(),
        }),
    }
}

/// Verifies every `request.contents` entry of an assembled envelope.
pub fn verify_envelope(envelope: &Value) -> Result<(), LeakViolation> {
    let Some(contents) = envelope
        .get("request")
        .and_then(|r| r.get("contents"))
        .and_then(Value::as_array)
    else {
        return Ok(());
    };
    for (index, entry) in contents.iter().enumerate() {
        if let Err(violation) = verify_content_entry(index, entry) {
            tracing::error!("[Leak-Guard] {}", violation);
            return Err(violation);
        }
    }
    tracing::trace!("[Leak-Guard] {} contents entries clean", contents.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_envelope_passes() {
        let envelope = json!({
            "model": "gemini-3-flash",
            "request": {
                "sessionId": "sid-1",
                "contents": [
                    {"role": "user", "parts": [{"text": "set \"safetySettings\" and model please"}]},
                    {"role": "model", "parts": [{"functionCall": {
                        "name": "cfg",
                        "args": {"model": "x", "request": {}}
                    }}]},
                    {"role": "user", "parts": [{"functionResponse": {
                        "name": "cfg",
                        "response": {"result": {"safetySettings": [], "project": "p"}}
                    }}]}
                ]
            }
        });
        assert!(verify_envelope(&envelope).is_ok());
    }

    #[test]
    fn direct_reserved_key_is_reported() {
        let envelope = json!({
            "request": {
                "contents": [
                    {"role": "user", "parts": [{"text": "ok"}]},
                    {"role": "user", "parts": [{"text": "x"}], "generationConfig": {}}
                ]
            }
        });
        assert_eq!(
            verify_envelope(&envelope).unwrap_err(),
            LeakViolation {
                path: "request.contents.1.generationConfig".to_string(),
                field: "generationConfig".to_string(),
            }
        );
    }

    #[test]
    fn reserved_key_inside_part_structure_is_reported() {
        let entry = json!({"role": "user", "parts": [{"text": "x", "sessionId": "leak"}]});
        let err = verify_content_entry(0, &entry).unwrap_err();
        assert_eq!(err.field, "sessionId");
        assert_eq!(err.path, "request.contents.0.parts.0.sessionId");
    }

    #[test]
    fn missing_contents_is_not_a_violation() {
        assert!(verify_envelope(&json!({"request": {}})).is_ok());
    }
}
