use serde_json::{json, Value};

use super::models::{GeminiRequest, V1InternalRequest};
use crate::error::{TranslateError, TranslateResult};
use crate::proxy::common::json_schema::{self, CleanStats};
use crate::proxy::common::json_tree::{self, JsonPath};
use crate::proxy::common::model_mapping::TargetDialect;
use crate::proxy::config::TranslatorConfig;
use crate::proxy::routing::RoutingMetadata;

/// What a stamping pass changed. A second pass over the same envelope
/// reports all zeros/false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StampStats {
    pub moved_tool_config: bool,
    pub renamed_system_instruction: bool,
    pub removed_safety_settings: bool,
    pub removed_max_output_tokens: bool,
    pub schema: CleanStats,
}

/// Builds the Antigravity envelope around a typed Gemini request and applies
/// the envelope normalization pass.
pub fn assemble_envelope(
    inner: GeminiRequest,
    dialect: &TargetDialect,
    routing: &RoutingMetadata,
    config: &TranslatorConfig,
) -> TranslateResult<Value> {
    let envelope = V1InternalRequest {
        project: routing.project.clone(),
        request_id: routing.request_id.clone(),
        request: GeminiRequest {
            session_id: Some(routing.session_id.clone()),
            ..inner
        },
        model: dialect.model.clone(),
        user_agent: routing.user_agent.clone(),
        request_type: routing.request_type.clone(),
    };
    let mut value = serde_json::to_value(&envelope)?;
    stamp_envelope(&mut value, dialect, routing, config)?;
    Ok(value)
}

/// Wraps an already Gemini-shaped body (`{contents, tools, ...}`) into the
/// envelope. Stray routing keys in `body` are replaced, not nested. A body
/// that already carries a `request` object is an envelope and is re-stamped.
pub fn wrap_request(
    body: &Value,
    dialect: &TargetDialect,
    routing: &RoutingMetadata,
    config: &TranslatorConfig,
) -> TranslateResult<Value> {
    let Some(inner) = body.as_object() else {
        return Err(TranslateError::InvalidDocument(
            "request body must be a JSON object".to_string(),
        ));
    };
    if inner.get("request").is_some_and(Value::is_object) {
        tracing::debug!("[Antigravity-Wrap] Body is already an envelope, re-stamping");
        let mut envelope = body.clone();
        stamp_envelope(&mut envelope, dialect, routing, config)?;
        return Ok(envelope);
    }
    let mut inner = inner.clone();
    let mut envelope = json!({});
    // toolConfig is handled by the stamping pass like any other stray key.
    if let Some(tool_config) = inner.remove("toolConfig") {
        envelope["toolConfig"] = tool_config;
    }
    for key in ["model", "userAgent", "requestType", "project", "requestId"] {
        inner.remove(key);
    }
    envelope["request"] = Value::Object(inner);
    stamp_envelope(&mut envelope, dialect, routing, config)?;
    Ok(envelope)
}

/// Envelope normalization pass. Only touches envelope-level keys and the
/// named `request.*` subtrees; `request.contents` is never visited.
/// Idempotent.
pub fn stamp_envelope(
    envelope: &mut Value,
    dialect: &TargetDialect,
    routing: &RoutingMetadata,
    config: &TranslatorConfig,
) -> TranslateResult<StampStats> {
    let mut stats = StampStats::default();
    if !envelope.get("request").is_some_and(Value::is_object) {
        return Err(TranslateError::InvalidDocument(
            "envelope is missing a `request` object".to_string(),
        ));
    }
    let Some(root) = envelope.as_object_mut() else {
        return Err(TranslateError::InvalidDocument(
            "envelope must be a JSON object".to_string(),
        ));
    };

    root.insert("model".to_string(), json!(dialect.model));
    root.insert("userAgent".to_string(), json!(routing.user_agent));
    root.insert("requestType".to_string(), json!(routing.request_type));
    root.insert("project".to_string(), json!(routing.project));
    root.insert("requestId".to_string(), json!(routing.request_id));
    let stray_tool_config = root.remove("toolConfig");

    json_tree::set_at(
        envelope,
        &JsonPath::from_keys(&["request", "sessionId"]),
        json!(routing.session_id),
    );

    if let Some(tool_config) = stray_tool_config {
        let target = JsonPath::from_keys(&["request", "toolConfig"]);
        if json_tree::get(envelope, &target).is_none() {
            json_tree::set_at(envelope, &target, tool_config);
            stats.moved_tool_config = true;
        } else {
            tracing::debug!(
                "[Antigravity-Wrap] Dropping top-level toolConfig, request.toolConfig already set"
            );
        }
    }

    stats.renamed_system_instruction = json_tree::rename_key_at(
        envelope,
        &JsonPath::from_keys(&["request", "system_instruction"]),
        "systemInstruction",
    );

    if !config.forward_safety_settings {
        stats.removed_safety_settings =
            json_tree::delete_at(envelope, &JsonPath::from_keys(&["request", "safetySettings"]))
                .is_some();
    }

    if let Some(tools) = json_tree::get_mut(envelope, &JsonPath::from_keys(&["request", "tools"])) {
        stats.schema = json_schema::clean_tools(tools, dialect.schema_profile);
    }

    if !dialect.supports_max_output_tokens {
        stats.removed_max_output_tokens = json_tree::delete_at(
            envelope,
            &JsonPath::from_keys(&["request", "generationConfig", "maxOutputTokens"]),
        )
        .is_some();
    }

    tracing::debug!(
        "[Antigravity-Wrap] model={} profile={} stats={:?}",
        dialect.model,
        dialect.schema_profile.as_str(),
        stats
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::common::model_mapping::resolve_dialect;
    use crate::proxy::mappers::gemini::models::GeminiContent;

    fn routing() -> RoutingMetadata {
        RoutingMetadata {
            user_agent: "antigravity".to_string(),
            request_type: "agent".to_string(),
            project: "bold-wave-12345".to_string(),
            request_id: "agent-fixed".to_string(),
            session_id: "sid-0123456789abcdef".to_string(),
        }
    }

    #[test]
    fn assemble_places_routing_at_envelope_level() {
        let inner = GeminiRequest {
            contents: vec![GeminiContent::text("user", "hello")],
            generation_config: Some(json!({"maxOutputTokens": 1000, "temperature": 0.5})),
            safety_settings: Some(json!([
                {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "OFF"}
            ])),
            ..GeminiRequest::default()
        };
        let envelope = assemble_envelope(
            inner,
            &resolve_dialect("gemini-3-flash"),
            &routing(),
            &TranslatorConfig::default(),
        )
        .unwrap();

        assert_eq!(envelope["model"], "gemini-3-flash");
        assert_eq!(envelope["userAgent"], "antigravity");
        assert_eq!(envelope["requestType"], "agent");
        assert_eq!(envelope["project"], "bold-wave-12345");
        assert_eq!(envelope["requestId"], "agent-fixed");
        assert_eq!(envelope["request"]["sessionId"], "sid-0123456789abcdef");
        assert!(envelope["request"].get("safetySettings").is_none());
        assert!(envelope["request"]["generationConfig"].get("maxOutputTokens").is_none());
        assert_eq!(envelope["request"]["generationConfig"]["temperature"], 0.5);
        assert_eq!(
            envelope["request"]["contents"],
            json!([{"role": "user", "parts": [{"text": "hello"}]}])
        );
    }

    #[test]
    fn claude_keeps_max_output_tokens() {
        let inner = GeminiRequest {
            generation_config: Some(json!({"maxOutputTokens": 1000})),
            ..GeminiRequest::default()
        };
        let envelope = assemble_envelope(
            inner,
            &resolve_dialect("claude-sonnet-4-5"),
            &routing(),
            &TranslatorConfig::default(),
        )
        .unwrap();
        assert_eq!(envelope["request"]["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn forwarded_safety_settings_survive() {
        let inner = GeminiRequest {
            safety_settings: Some(json!([])),
            ..GeminiRequest::default()
        };
        let cfg = TranslatorConfig {
            forward_safety_settings: true,
            ..TranslatorConfig::default()
        };
        let envelope =
            assemble_envelope(inner, &resolve_dialect("gemini-3-flash"), &routing(), &cfg).unwrap();
        assert_eq!(envelope["request"]["safetySettings"], json!([]));
    }

    #[test]
    fn wrap_moves_stray_fields_into_place() {
        let body = json!({
            "model": "stale",
            "contents": [],
            "system_instruction": {"role": "user", "parts": [{"text": "sys"}]},
            "toolConfig": {"functionCallingConfig": {"mode": "AUTO"}},
            "safetySettings": []
        });
        let envelope = wrap_request(
            &body,
            &resolve_dialect("gemini-3-flash"),
            &routing(),
            &TranslatorConfig::default(),
        )
        .unwrap();

        assert_eq!(envelope["model"], "gemini-3-flash");
        assert!(envelope.get("toolConfig").is_none());
        assert_eq!(
            envelope["request"]["toolConfig"],
            json!({"functionCallingConfig": {"mode": "AUTO"}})
        );
        assert!(envelope["request"].get("system_instruction").is_none());
        assert_eq!(envelope["request"]["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(envelope["request"].get("model").is_none());
        assert!(envelope["request"].get("safetySettings").is_none());
    }

    #[test]
    fn existing_request_tool_config_wins() {
        let mut envelope = json!({
            "toolConfig": {"functionCallingConfig": {"mode": "NONE"}},
            "request": {"contents": [], "toolConfig": {"functionCallingConfig": {"mode": "ANY"}}}
        });
        let stats = stamp_envelope(
            &mut envelope,
            &resolve_dialect("gemini-3-flash"),
            &routing(),
            &TranslatorConfig::default(),
        )
        .unwrap();
        assert!(!stats.moved_tool_config);
        assert!(envelope.get("toolConfig").is_none());
        assert_eq!(envelope["request"]["toolConfig"]["functionCallingConfig"]["mode"], "ANY");
    }

    #[test]
    fn stamping_twice_is_a_noop() {
        let mut envelope = json!({
            "request": {
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "tools": [{"functionDeclarations": [{
                    "name": "f",
                    "parametersJsonSchema": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {}
                    }
                }]}],
                "generationConfig": {"maxOutputTokens": 10}
            }
        });
        let dialect = resolve_dialect("gemini-3-flash");
        let cfg = TranslatorConfig::default();
        let first = stamp_envelope(&mut envelope, &dialect, &routing(), &cfg).unwrap();
        assert_eq!(first.schema.renamed, 1);
        assert_eq!(first.schema.stripped, 1);
        let snapshot = envelope.clone();

        let second = stamp_envelope(&mut envelope, &dialect, &routing(), &cfg).unwrap();
        assert_eq!(second, StampStats::default());
        assert_eq!(envelope, snapshot);
    }

    #[test]
    fn wrapping_an_envelope_does_not_nest_it() {
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
            "toolConfig": {"functionCallingConfig": {"mode": "AUTO"}},
            "generationConfig": {"maxOutputTokens": 10, "temperature": 0.2}
        });
        let dialect = resolve_dialect("gemini-3-flash");
        let cfg = TranslatorConfig::default();
        let once = wrap_request(&body, &dialect, &routing(), &cfg).unwrap();
        let twice = wrap_request(&once, &dialect, &routing(), &cfg).unwrap();

        assert_eq!(twice, once);
        assert!(twice["request"].get("request").is_none());
        assert_eq!(twice["request"]["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(twice["request"]["toolConfig"]["functionCallingConfig"]["mode"], "AUTO");
    }

    #[test]
    fn rejects_non_envelopes() {
        let dialect = resolve_dialect("gemini-3-flash");
        let cfg = TranslatorConfig::default();
        assert!(matches!(
            stamp_envelope(&mut json!({"contents": []}), &dialect, &routing(), &cfg),
            Err(TranslateError::InvalidDocument(_))
        ));
        assert!(matches!(
            wrap_request(&json!([1]), &dialect, &routing(), &cfg),
            Err(TranslateError::InvalidDocument(_))
        ));
    }
}
