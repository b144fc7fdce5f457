pub const DEFAULT_USER_AGENT: &str = "antigravity";
pub const DEFAULT_REQUEST_TYPE: &str = "agent";
pub const REQUEST_ID_PREFIX: &str = "agent";

pub const DEFAULT_MAX_THINKING_BUDGET: u32 = 24576;

/// Envelope-level and routing keys that must never appear inside a
/// `request.contents[i]` entry outside of opaque tool payloads.
pub const RESERVED_CONTENT_FIELDS: &[&str] = &[
    "safetySettings",
    "model",
    "userAgent",
    "requestType",
    "requestId",
    "sessionId",
    "sessionID",
    "systemInstruction",
    "system_instruction",
    "toolConfig",
    "generationConfig",
    "project",
    "request",
];

pub fn is_reserved_content_field(key: &str) -> bool {
    RESERVED_CONTENT_FIELDS.contains(&key)
}
