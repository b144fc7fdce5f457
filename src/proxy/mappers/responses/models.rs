use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Top-level Responses-style request. `input` stays raw so one bad item can be
/// skipped without rejecting the whole document; the optional fields decode
/// leniently for the same reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesRequest {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default)]
    pub input: Value,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningConfig>,
}

// Null, wrong-typed or out-of-range values become None instead of failing
// the whole request.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.filter(|v| !v.is_null()).and_then(|v| {
        match serde_json::from_value::<T>(v.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("[Responses-Request] Ignoring malformed field value {}: {}", v, e);
                None
            }
        }
    }))
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient::<D, T>(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageRole {
    System,
    Developer,
    User,
    Assistant,
}

impl MessageRole {
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "system" => Some(MessageRole::System),
            "developer" => Some(MessageRole::Developer),
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }

    pub fn is_instruction(self) -> bool {
        matches!(self, MessageRole::System | MessageRole::Developer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    InputText,
    OutputText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub kind: BlockKind,
    pub text: String,
}

/// Function output as received: raw text still to be parsed, or a value the
/// client already sent structured.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionOutput {
    Raw(String),
    Structured(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversationItem {
    Message {
        role: MessageRole,
        content: Vec<ContentBlock>,
    },
    FunctionCall {
        name: String,
        call_id: String,
        arguments: String,
    },
    FunctionCallOutput {
        call_id: String,
        output: FunctionOutput,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedItem {
    #[error("input[{index}] is not an object")]
    NotAnObject { index: usize },
    #[error("input[{index}] has unsupported type '{kind}'")]
    UnsupportedKind { index: usize, kind: String },
    #[error("input[{index}] ({kind}) is missing '{field}'")]
    MissingField {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },
    #[error("input[{index}] has unknown role '{role}'")]
    UnknownRole { index: usize, role: String },
}

fn str_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

impl ConversationItem {
    /// Lenient decoding of one `input[index]` entry.
    pub fn from_value(index: usize, item: &Value) -> Result<Self, MalformedItem> {
        if !item.is_object() {
            return Err(MalformedItem::NotAnObject { index });
        }
        let kind = match str_field(item, "type") {
            Some(kind) => kind,
            // Easy-input messages omit `type`.
            None if item.get("role").is_some() => "message",
            None => {
                return Err(MalformedItem::MissingField {
                    index,
                    kind: "item",
                    field: "type",
                })
            }
        };

        match kind {
            "message" => Self::message_from_value(index, item),
            "function_call" => {
                let name = str_field(item, "name").ok_or(MalformedItem::MissingField {
                    index,
                    kind: "function_call",
                    field: "name",
                })?;
                let call_id = str_field(item, "call_id")
                    .or_else(|| str_field(item, "id"))
                    .ok_or(MalformedItem::MissingField {
                        index,
                        kind: "function_call",
                        field: "call_id",
                    })?;
                let arguments = match item.get("arguments") {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => "{}".to_string(),
                    Some(other) => other.to_string(),
                };
                Ok(ConversationItem::FunctionCall {
                    name: name.to_string(),
                    call_id: call_id.to_string(),
                    arguments,
                })
            }
            "function_call_output" | "custom_tool_call_output" => {
                let call_id = str_field(item, "call_id").ok_or(MalformedItem::MissingField {
                    index,
                    kind: "function_call_output",
                    field: "call_id",
                })?;
                let output = match item.get("output") {
                    Some(Value::String(s)) => FunctionOutput::Raw(s.clone()),
                    Some(Value::Null) | None => {
                        return Err(MalformedItem::MissingField {
                            index,
                            kind: "function_call_output",
                            field: "output",
                        })
                    }
                    Some(other) => FunctionOutput::Structured(other.clone()),
                };
                Ok(ConversationItem::FunctionCallOutput {
                    call_id: call_id.to_string(),
                    output,
                })
            }
            other => Err(MalformedItem::UnsupportedKind {
                index,
                kind: other.to_string(),
            }),
        }
    }

    fn message_from_value(index: usize, item: &Value) -> Result<Self, MalformedItem> {
        let raw_role = str_field(item, "role").ok_or(MalformedItem::MissingField {
            index,
            kind: "message",
            field: "role",
        })?;
        let role = MessageRole::parse(raw_role).ok_or_else(|| MalformedItem::UnknownRole {
            index,
            role: raw_role.to_string(),
        })?;
        let default_kind = if role == MessageRole::Assistant {
            BlockKind::OutputText
        } else {
            BlockKind::InputText
        };

        let content = match item.get("content") {
            Some(Value::String(text)) => vec![ContentBlock {
                kind: default_kind,
                text: text.clone(),
            }],
            Some(Value::Array(blocks)) => blocks
                .iter()
                .filter_map(|block| {
                    let kind = match str_field(block, "type") {
                        Some("input_text") => BlockKind::InputText,
                        Some("output_text") => BlockKind::OutputText,
                        Some("text") | None => default_kind,
                        Some(other) => {
                            tracing::debug!(
                                "[Responses-Input] input[{}]: skipping non-text block '{}'",
                                index,
                                other
                            );
                            return None;
                        }
                    };
                    let text = str_field(block, "text")?;
                    Some(ContentBlock {
                        kind,
                        text: text.to_string(),
                    })
                })
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(MalformedItem::MissingField {
                    index,
                    kind: "message",
                    field: "content",
                })
            }
        };

        Ok(ConversationItem::Message { role, content })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParsedInput {
    pub items: Vec<ConversationItem>,
    pub malformed: Vec<MalformedItem>,
}

impl ResponsesRequest {
    /// Decodes `input` into conversation items. A bare string is one user
    /// message; malformed entries are collected, not fatal.
    pub fn parse_input(&self) -> ParsedInput {
        let mut parsed = ParsedInput::default();
        match &self.input {
            Value::String(text) => parsed.items.push(ConversationItem::Message {
                role: MessageRole::User,
                content: vec![ContentBlock {
                    kind: BlockKind::InputText,
                    text: text.clone(),
                }],
            }),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    match ConversationItem::from_value(index, item) {
                        Ok(item) => parsed.items.push(item),
                        Err(e) => {
                            tracing::warn!("[Responses-Input] Skipping malformed item: {}", e);
                            parsed.malformed.push(e);
                        }
                    }
                }
            }
            Value::Null => {}
            other => {
                tracing::warn!(
                    "[Responses-Input] Ignoring input of unexpected JSON type: {}",
                    json_type_name(other)
                );
            }
        }
        parsed
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
