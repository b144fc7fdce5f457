use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum OutputPayload {
    Structured(Value),
    Text(String),
}

impl OutputPayload {
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputPayload::Structured(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            OutputPayload::Structured(v) => v,
            OutputPayload::Text(s) => Value::String(s),
        }
    }
}

/// Function outputs arrive as raw strings. Valid JSON becomes structured data;
/// anything else stays a string leaf. Never fails.
pub fn parse_raw_output(raw: &str) -> OutputPayload {
    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) => OutputPayload::Structured(parsed),
        Err(_) => OutputPayload::Text(raw.to_string()),
    }
}
