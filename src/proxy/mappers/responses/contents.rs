use serde_json::{json, Value};

use super::normalize::{CanonicalTurn, Part, TurnRole};
use crate::proxy::common::model_mapping::TargetDialect;
use crate::proxy::mappers::gemini::models::{
    FunctionCall, FunctionResponse, GeminiContent, GeminiPart,
};

pub fn role_name(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
        // Gemini takes function results on the user side of the exchange.
        TurnRole::FunctionResult => "user",
    }
}

/// Arguments arrive as a raw JSON string; anything that is not a JSON object
/// becomes `{}`.
pub fn parse_call_args(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(_) | Err(_) => {
            if !raw.trim().is_empty() {
                tracing::debug!(
                    "[Responses-Contents] Call arguments are not a JSON object, using {{}}"
                );
            }
            json!({})
        }
    }
}

fn render_part(part: &Part, dialect: &TargetDialect) -> GeminiPart {
    let id_for = |call_id: &str| dialect.emit_call_ids.then(|| call_id.to_string());
    match part {
        Part::Text { text } => GeminiPart::Text { text: text.clone() },
        Part::FunctionCall {
            name,
            call_id,
            arguments,
        } => GeminiPart::FunctionCall {
            function_call: FunctionCall {
                id: id_for(call_id),
                name: name.clone(),
                args: parse_call_args(arguments),
            },
        },
        Part::FunctionResponse {
            name,
            call_id,
            response,
        } => GeminiPart::FunctionResponse {
            function_response: FunctionResponse {
                id: id_for(call_id),
                name: name.clone(),
                response: json!({ "result": response }),
            },
        },
    }
}

/// One `contents` entry per turn, in turn order; parts keep their order.
pub fn build_contents(turns: &[CanonicalTurn], dialect: &TargetDialect) -> Vec<GeminiContent> {
    turns
        .iter()
        .map(|turn| GeminiContent {
            role: role_name(turn.role).to_string(),
            parts: turn.parts.iter().map(|p| render_part(p, dialect)).collect(),
        })
        .collect()
}
