// Target-model classification for the Antigravity backend
use super::json_schema::SchemaProfile;

pub const MODEL_GEMINI_3_FLASH: &str = "gemini-3-flash";
pub const MODEL_GEMINI_3_PRO_HIGH: &str = "gemini-3-pro-high";
pub const MODEL_GEMINI_3_PRO_PREVIEW: &str = "gemini-3-pro-preview";
pub const MODEL_GEMINI_25_FLASH: &str = "gemini-2.5-flash";
pub const MODEL_CLAUDE_SONNET_45: &str = "claude-sonnet-4-5";
pub const MODEL_CLAUDE_SONNET_45_THINKING: &str = "claude-sonnet-4-5-thinking";
pub const MODEL_CLAUDE_OPUS_45_THINKING: &str = "claude-opus-4-5-thinking";

// Gemini models that go through the Antigravity (narrow) schema dialect.
const NARROW_SCHEMA_GEMINI_MODELS: &[&str] = &[MODEL_GEMINI_3_PRO_HIGH];

pub fn is_claude_model(model: &str) -> bool {
    model.to_lowercase().contains("claude")
}

pub fn select_schema_profile(model: &str) -> SchemaProfile {
    let lower = model.to_lowercase();
    if lower.contains("claude") || NARROW_SCHEMA_GEMINI_MODELS.iter().any(|m| lower.contains(m)) {
        SchemaProfile::Antigravity
    } else {
        SchemaProfile::Gemini
    }
}

/// Per-target behaviour resolved once per request and threaded through the
/// pipeline instead of re-matching model names at each call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDialect {
    pub model: String,
    pub schema_profile: SchemaProfile,
    pub is_claude: bool,
    // Gemini-family targets reject an explicit output limit on this route.
    pub supports_max_output_tokens: bool,
    // Antigravity's Claude bridge pairs calls and results by `id`.
    pub emit_call_ids: bool,
}

pub fn resolve_dialect(model: &str) -> TargetDialect {
    let is_claude = is_claude_model(model);
    TargetDialect {
        model: model.to_string(),
        schema_profile: select_schema_profile(model),
        is_claude,
        supports_max_output_tokens: is_claude,
        emit_call_ids: is_claude,
    }
}
