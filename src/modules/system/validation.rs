use crate::constants::DEFAULT_MAX_THINKING_BUDGET;
use crate::proxy::config::TranslatorConfig;
use std::fmt;
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub field: String,
    pub message: String,
    pub actual_value: Option<String>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual_value {
            Some(val) => write!(f, "  • {}: {} (got: {})", self.field, self.message, val),
            None => write!(f, "  • {}: {}", self.field, self.message),
        }
    }
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: None,
        }
    }

    fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            actual_value: Some(value.to_string()),
        }
    }
}

pub fn validate_translator_config(config: &TranslatorConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.user_agent.trim().is_empty() {
        errors.push(ConfigError::new("user_agent", "must not be empty"));
    }
    if config.request_type.trim().is_empty() {
        errors.push(ConfigError::new("request_type", "must not be empty"));
    }
    if let Some(project) = &config.project {
        if project.trim().is_empty() {
            errors.push(ConfigError::new(
                "project",
                "must be omitted or non-empty",
            ));
        }
    }
    if config.max_thinking_budget == 0 || config.max_thinking_budget > DEFAULT_MAX_THINKING_BUDGET
    {
        errors.push(ConfigError::with_value(
            "max_thinking_budget",
            format!("must be between 1 and {}", DEFAULT_MAX_THINKING_BUDGET),
            config.max_thinking_budget,
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Joins validation errors into one message, as logged at startup.
pub fn format_config_errors(errors: &[ConfigError]) -> String {
    format!(
        "configuration_validation_failed:\n{}",
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_translator_config(&TranslatorConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_invalid_field() {
        let cfg = TranslatorConfig {
            user_agent: " ".to_string(),
            request_type: String::new(),
            project: Some(String::new()),
            max_thinking_budget: 100_000,
            ..TranslatorConfig::default()
        };
        let errors = validate_translator_config(&cfg).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["user_agent", "request_type", "project", "max_thinking_budget"]
        );
        assert_eq!(errors[3].actual_value.as_deref(), Some("100000"));

        let message = format_config_errors(&errors);
        assert!(message.starts_with("configuration_validation_failed:"));
        assert!(message.contains("max_thinking_budget: must be between 1 and 24576 (got: 100000)"));
    }

    #[test]
    fn zero_budget_is_rejected() {
        let cfg = TranslatorConfig {
            max_thinking_budget: 0,
            ..TranslatorConfig::default()
        };
        assert_eq!(validate_translator_config(&cfg).unwrap_err().len(), 1);
    }
}
