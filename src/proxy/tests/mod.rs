
use serde_json::{json, Value};

use crate::constants::RESERVED_CONTENT_FIELDS;
use crate::proxy::config::TranslatorConfig;
use crate::proxy::mappers::responses::{transform_responses_request, TranslationOutput};
use crate::proxy::routing::RoutingMetadata;

pub(crate) fn fixed_routing() -> RoutingMetadata {
    RoutingMetadata {
        user_agent: "antigravity".to_string(),
        request_type: "agent".to_string(),
        project: "swift-core-a1b2c".to_string(),
        request_id: "agent-00000000-0000-0000-0000-000000000000".to_string(),
        session_id: "sid-feedfacecafebeef".to_string(),
    }
}

pub(crate) fn translate(model: &str, body: &Value) -> TranslationOutput {
    transform_responses_request(model, body, &TranslatorConfig::default(), &fixed_routing())
        .expect("translation should succeed")
}

pub(crate) fn contents(envelope: &Value) -> &Vec<Value> {
    envelope["request"]["contents"]
        .as_array()
        .expect("request.contents must be an array")
}

/// Direct-key check over every contents entry, independent of the leak guard.
pub(crate) fn assert_no_reserved_fields(envelope: &Value) {
    for (i, entry) in contents(envelope).iter().enumerate() {
        let obj = entry.as_object().expect("contents entry must be an object");
        for field in RESERVED_CONTENT_FIELDS {
            assert!(
                !obj.contains_key(*field),
                "request.contents[{}] has reserved field '{}': {}",
                i,
                field,
                entry
            );
        }
        assert!(obj.contains_key("role"), "request.contents[{}] missing role", i);
    }
}

/// Small builder for Responses `input` arrays.
#[derive(Default)]
pub(crate) struct InputBuilder {
    items: Vec<Value>,
    tools: Vec<Value>,
}

impl InputBuilder {
    pub(crate) fn developer(mut self, text: &str) -> Self {
        self.items.push(json!({"role": "developer", "content": text}));
        self
    }

    pub(crate) fn user(mut self, text: &str) -> Self {
        self.items.push(json!({
            "role": "user",
            "content": [{"type": "input_text", "text": text}]
        }));
        self
    }

    pub(crate) fn assistant(mut self, text: &str) -> Self {
        self.items.push(json!({
            "role": "assistant",
            "content": [{"type": "output_text", "text": text}]
        }));
        self
    }

    pub(crate) fn call(mut self, name: &str, call_id: &str, args: Value) -> Self {
        self.items.push(json!({
            "type": "function_call",
            "name": name,
            "call_id": call_id,
            "arguments": args.to_string()
        }));
        self
    }

    pub(crate) fn output(mut self, call_id: &str, output: &str) -> Self {
        self.items.push(json!({
            "type": "function_call_output",
            "call_id": call_id,
            "output": output
        }));
        self
    }

    pub(crate) fn raw(mut self, item: Value) -> Self {
        self.items.push(item);
        self
    }

    pub(crate) fn tool(mut self, tool: Value) -> Self {
        self.tools.push(tool);
        self
    }

    pub(crate) fn build(self, model: &str) -> Value {
        let mut body = json!({
            "model": model,
            "stream": true,
            "max_output_tokens": 32000,
            "input": self.items
        });
        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools);
        }
        body
    }
}

pub(crate) fn read_file_tool() -> Value {
    json!({
        "type": "function",
        "name": "read_file",
        "description": "Read a file",
        "parameters": {
            "type": "object",
            "properties": {"path": {"type": "string"}},
            "required": ["path"]
        }
    })
}
