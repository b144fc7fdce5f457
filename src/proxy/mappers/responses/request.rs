use serde_json::{json, Map, Value};

use super::contents::build_contents;
use super::models::ResponsesRequest;
use super::normalize::NormalizedConversation;
use crate::proxy::common::json_schema::VENDOR_SCHEMA_KEY;
use crate::proxy::common::model_mapping::TargetDialect;
use crate::proxy::config::TranslatorConfig;
use crate::proxy::mappers::gemini::models::{GeminiContent, GeminiPart, GeminiRequest};

// Hosted tools the Antigravity route cannot declare as functions.
const BUILTIN_TOOL_TYPES: &[&str] = &[
    "web_search",
    "web_search_preview",
    "file_search",
    "code_interpreter",
    "computer_use_preview",
    "image_generation",
    "local_shell",
    "mcp",
];

/// Assembles the Gemini-shaped inner request. Session and routing fields are
/// left for the envelope stage.
pub fn build_gemini_request(
    req: &ResponsesRequest,
    conversation: &NormalizedConversation,
    dialect: &TargetDialect,
    config: &TranslatorConfig,
) -> GeminiRequest {
    let tools = build_tools(req.tools.as_deref());
    let tool_config = tools
        .as_ref()
        .and_then(|_| req.tool_choice.as_ref())
        .and_then(build_tool_config);

    GeminiRequest {
        session_id: None,
        contents: build_contents(&conversation.turns, dialect),
        system_instruction: build_system_instruction(
            req.instructions.as_deref(),
            &conversation.instructions,
        ),
        tools,
        tool_config,
        generation_config: build_generation_config(req, config),
        safety_settings: Some(config.safety_threshold.build_safety_settings()),
    }
}

pub fn build_system_instruction(
    instructions: Option<&str>,
    message_instructions: &[String],
) -> Option<GeminiContent> {
    let parts: Vec<GeminiPart> = instructions
        .into_iter()
        .chain(message_instructions.iter().map(String::as_str))
        .filter(|text| !text.trim().is_empty())
        .map(|text| GeminiPart::Text {
            text: text.to_string(),
        })
        .collect();

    if parts.is_empty() {
        return None;
    }
    Some(GeminiContent {
        role: "user".to_string(),
        parts,
    })
}

fn function_declaration(tool: &Value) -> Option<Value> {
    let tool_type = tool.get("type").and_then(Value::as_str).unwrap_or("function");
    if tool_type != "function" {
        if BUILTIN_TOOL_TYPES.contains(&tool_type) {
            tracing::debug!("[Responses-Tools] Skipping built-in tool '{}'", tool_type);
        } else {
            tracing::warn!("[Responses-Tools] Skipping unsupported tool type '{}'", tool_type);
        }
        return None;
    }

    // Chat-style tools nest the declaration under `function`.
    let def = tool.get("function").filter(|f| f.is_object()).unwrap_or(tool);
    let Some(name) = def.get("name").and_then(Value::as_str).filter(|n| !n.is_empty()) else {
        tracing::warn!("[Responses-Tools] Skipping function tool without a name");
        return None;
    };

    let mut decl = Map::new();
    decl.insert("name".to_string(), json!(name));
    if let Some(description) = def.get("description").and_then(Value::as_str) {
        decl.insert("description".to_string(), json!(description));
    }
    let schema = def
        .get("parameters")
        .or_else(|| def.get(VENDOR_SCHEMA_KEY))
        .filter(|s| s.is_object())
        .cloned()
        .unwrap_or_else(|| json!({"type": "object", "properties": {}}));
    decl.insert(VENDOR_SCHEMA_KEY.to_string(), schema);
    Some(Value::Object(decl))
}

/// Collects function tools into a single `functionDeclarations` entry with
/// schemas under `parametersJsonSchema`. Cleaning happens at the envelope.
pub fn build_tools(tools: Option<&[Value]>) -> Option<Vec<Value>> {
    let declarations: Vec<Value> = tools?.iter().filter_map(function_declaration).collect();
    if declarations.is_empty() {
        return None;
    }
    Some(vec![json!({ "functionDeclarations": declarations })])
}

pub fn build_tool_config(tool_choice: &Value) -> Option<Value> {
    let calling_config = match tool_choice {
        Value::String(mode) => match mode.as_str() {
            "auto" => json!({"mode": "AUTO"}),
            "none" => json!({"mode": "NONE"}),
            "required" => json!({"mode": "ANY"}),
            other => {
                tracing::warn!("[Responses-Tools] Ignoring unknown tool_choice '{}'", other);
                return None;
            }
        },
        Value::Object(choice) => {
            let name = choice
                .get("name")
                .or_else(|| choice.get("function").and_then(|f| f.get("name")))
                .and_then(Value::as_str)?;
            json!({"mode": "ANY", "allowedFunctionNames": [name]})
        }
        _ => return None,
    };
    Some(json!({ "functionCallingConfig": calling_config }))
}

pub fn effort_to_budget(effort: &str) -> Option<u32> {
    match effort.to_ascii_lowercase().as_str() {
        "minimal" => Some(1024),
        "low" => Some(4096),
        "medium" => Some(12288),
        "high" => Some(24576),
        _ => None,
    }
}

pub fn build_generation_config(req: &ResponsesRequest, config: &TranslatorConfig) -> Option<Value> {
    let mut gen_config = Map::new();

    if let Some(max) = req.max_output_tokens {
        gen_config.insert("maxOutputTokens".to_string(), json!(max));
    }
    if let Some(temperature) = req.temperature {
        gen_config.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(top_p) = req.top_p {
        gen_config.insert("topP".to_string(), json!(top_p));
    }

    if let Some(effort) = req.reasoning.as_ref().and_then(|r| r.effort.as_deref()) {
        match effort_to_budget(effort) {
            Some(budget) => {
                let capped = budget.min(config.max_thinking_budget);
                if capped != budget {
                    tracing::info!(
                        "[Responses-Request] Capping thinking_budget from {} to {}",
                        budget,
                        capped
                    );
                }
                gen_config.insert(
                    "thinkingConfig".to_string(),
                    json!({"includeThoughts": true, "thinkingBudget": capped}),
                );
            }
            None => tracing::debug!("[Responses-Request] Unknown reasoning effort '{}'", effort),
        }
    }

    if gen_config.is_empty() {
        None
    } else {
        Some(Value::Object(gen_config))
    }
}
