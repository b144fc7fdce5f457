use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::{DEFAULT_MAX_THINKING_BUDGET, DEFAULT_REQUEST_TYPE, DEFAULT_USER_AGENT};

pub const HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_CIVIC_INTEGRITY",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyThreshold {
    #[default]
    Off,
    #[serde(alias = "LOW")]
    BlockLowAndAbove,
    #[serde(alias = "MEDIUM")]
    BlockMediumAndAbove,
    #[serde(alias = "HIGH")]
    BlockOnlyHigh,
    #[serde(alias = "NONE")]
    BlockNone,
}

impl SafetyThreshold {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "OFF" => Some(SafetyThreshold::Off),
            "LOW" | "BLOCK_LOW_AND_ABOVE" => Some(SafetyThreshold::BlockLowAndAbove),
            "MEDIUM" | "BLOCK_MEDIUM_AND_ABOVE" => Some(SafetyThreshold::BlockMediumAndAbove),
            "HIGH" | "BLOCK_ONLY_HIGH" => Some(SafetyThreshold::BlockOnlyHigh),
            "NONE" | "BLOCK_NONE" => Some(SafetyThreshold::BlockNone),
            _ => None,
        }
    }

    pub fn to_gemini_threshold(self) -> &'static str {
        match self {
            SafetyThreshold::Off => "OFF",
            SafetyThreshold::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
            SafetyThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            SafetyThreshold::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            SafetyThreshold::BlockNone => "BLOCK_NONE",
        }
    }

    pub fn build_safety_settings(self) -> Value {
        let threshold = self.to_gemini_threshold();
        Value::Array(
            HARM_CATEGORIES
                .iter()
                .map(|category| json!({ "category": category, "threshold": threshold }))
                .collect(),
        )
    }
}

/// Per-call translator settings. Passed explicitly into the pipeline; nothing
/// here is cached process-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_type")]
    pub request_type: String,
    #[serde(default)]
    pub project: Option<String>,
    // Antigravity rejects safetySettings inside the wrapped request.
    #[serde(default = "default_false")]
    pub forward_safety_settings: bool,
    #[serde(default)]
    pub safety_threshold: SafetyThreshold,
    #[serde(default = "default_max_thinking_budget")]
    pub max_thinking_budget: u32,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_type: default_request_type(),
            project: None,
            forward_safety_settings: false,
            safety_threshold: SafetyThreshold::Off,
            max_thinking_budget: default_max_thinking_budget(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_type() -> String {
    DEFAULT_REQUEST_TYPE.to_string()
}

fn default_false() -> bool {
    false
}

fn default_max_thinking_budget() -> u32 {
    DEFAULT_MAX_THINKING_BUDGET
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_deserializes_to_defaults() {
        let cfg: TranslatorConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg, TranslatorConfig::default());
        assert_eq!(cfg.user_agent, "antigravity");
        assert_eq!(cfg.request_type, "agent");
        assert_eq!(cfg.max_thinking_budget, 24576);
        assert!(!cfg.forward_safety_settings);
    }

    #[test]
    fn safety_threshold_accepts_short_and_long_names() {
        assert_eq!(SafetyThreshold::parse("low"), Some(SafetyThreshold::BlockLowAndAbove));
        assert_eq!(
            SafetyThreshold::parse("BLOCK_ONLY_HIGH"),
            Some(SafetyThreshold::BlockOnlyHigh)
        );
        assert_eq!(SafetyThreshold::parse("bogus"), None);

        let cfg: TranslatorConfig =
            serde_json::from_value(json!({"safety_threshold": "MEDIUM"})).unwrap();
        assert_eq!(cfg.safety_threshold, SafetyThreshold::BlockMediumAndAbove);
    }

    #[test]
    fn safety_settings_cover_all_categories() {
        let settings = SafetyThreshold::BlockNone.build_safety_settings();
        let arr = settings.as_array().unwrap();
        assert_eq!(arr.len(), 5);
        assert!(arr.iter().all(|s| s["threshold"] == "BLOCK_NONE"));
        assert_eq!(arr[0]["category"], "HARM_CATEGORY_HARASSMENT");
    }
}
