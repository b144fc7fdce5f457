use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{TranslateError, TranslateResult};
use crate::proxy::config::{SafetyThreshold, TranslatorConfig};

pub const ENV_USER_AGENT: &str = "GEPHYR_USER_AGENT";
pub const ENV_REQUEST_TYPE: &str = "GEPHYR_REQUEST_TYPE";
pub const ENV_PROJECT: &str = "GEPHYR_PROJECT";
pub const ENV_FORWARD_SAFETY_SETTINGS: &str = "GEPHYR_FORWARD_SAFETY_SETTINGS";
pub const ENV_SAFETY_THRESHOLD: &str = "GEMINI_SAFETY_THRESHOLD";

/// Loads the translator config from a JSON file. A missing file yields the
/// defaults. Environment overrides are applied on top either way.
pub fn load_translator_config(path: &Path) -> TranslateResult<TranslatorConfig> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str::<TranslatorConfig>(&content).map_err(|e| {
            TranslateError::Config(format!(
                "failed_to_parse_config_file {}: {}",
                path.display(),
                e
            ))
        })?
    } else {
        info!(
            "Config file {} not found, using translator defaults",
            path.display()
        );
        TranslatorConfig::default()
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

pub fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn apply_env_overrides(config: &mut TranslatorConfig) {
    if let Some(user_agent) = non_empty_env(ENV_USER_AGENT) {
        info!("Using user agent from environment: {}", user_agent);
        config.user_agent = user_agent;
    }

    if let Some(request_type) = non_empty_env(ENV_REQUEST_TYPE) {
        info!("Using request type from environment: {}", request_type);
        config.request_type = request_type;
    }

    if let Some(project) = non_empty_env(ENV_PROJECT) {
        info!("Using project from environment");
        config.project = Some(project);
    }

    if let Ok(raw) = std::env::var(ENV_FORWARD_SAFETY_SETTINGS) {
        match parse_env_bool(&raw) {
            Some(parsed) => {
                config.forward_safety_settings = parsed;
                info!("Using forward_safety_settings from environment: {}", parsed);
            }
            None => warn!("Ignoring invalid forward_safety_settings value: {}", raw),
        }
    }

    if let Ok(raw) = std::env::var(ENV_SAFETY_THRESHOLD) {
        match SafetyThreshold::parse(&raw) {
            Some(threshold) => config.safety_threshold = threshold,
            None => warn!("Ignoring invalid safety threshold value: {}", raw),
        }
    }
}
