use rand::Rng;

use crate::constants::REQUEST_ID_PREFIX;
use crate::proxy::config::TranslatorConfig;
use crate::proxy::mappers::responses::models::ConversationItem;
use crate::proxy::session_manager::SessionManager;

/// Envelope-level routing values. Opaque strings to the translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingMetadata {
    pub user_agent: String,
    pub request_type: String,
    pub project: String,
    pub request_id: String,
    pub session_id: String,
}

/// Supplies routing values for one translation. `config` is the same
/// `TranslatorConfig` the pipeline was called with.
pub trait RoutingMetadataProvider {
    fn routing_metadata(
        &self,
        model: &str,
        items: &[ConversationItem],
        config: &TranslatorConfig,
    ) -> RoutingMetadata;
}

/// Fixed metadata, e.g. when the caller has already resolved everything.
impl RoutingMetadataProvider for RoutingMetadata {
    fn routing_metadata(
        &self,
        _model: &str,
        _items: &[ConversationItem],
        _config: &TranslatorConfig,
    ) -> RoutingMetadata {
        self.clone()
    }
}

/// Default provider: values from the pipeline's config, a fresh request id,
/// and a session fingerprint of the conversation.
#[derive(Debug, Clone, Default)]
pub struct ConfigRoutingProvider {
    session_id: Option<String>,
}

impl ConfigRoutingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

impl RoutingMetadataProvider for ConfigRoutingProvider {
    fn routing_metadata(
        &self,
        model: &str,
        items: &[ConversationItem],
        config: &TranslatorConfig,
    ) -> RoutingMetadata {
        let project = match config.project.as_deref() {
            Some(project) if !project.trim().is_empty() => project.to_string(),
            _ => {
                let mock = generate_mock_project_id();
                tracing::debug!(
                    "[Routing] No project configured for {}, using placeholder {}",
                    model,
                    mock
                );
                mock
            }
        };
        let session_id = self
            .session_id
            .clone()
            .unwrap_or_else(|| SessionManager::extract_responses_session_id(items));

        RoutingMetadata {
            user_agent: config.user_agent.clone(),
            request_type: config.request_type.clone(),
            project,
            request_id: generate_request_id(),
            session_id,
        }
    }
}

pub fn generate_request_id() -> String {
    format!("{}-{}", REQUEST_ID_PREFIX, uuid::Uuid::new_v4())
}

pub fn generate_mock_project_id() -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let adjectives = ["useful", "bright", "swift", "calm", "bold"];
    let nouns = ["fuze", "wave", "spark", "flow", "core"];

    let mut rng = rand::thread_rng();
    let adj = adjectives[rng.gen_range(0..adjectives.len())];
    let noun = nouns[rng.gen_range(0..nouns.len())];

    // 5 random base36 characters
    let suffix: String = (0..5)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect();

    format!("{}-{}-{}", adj, noun, suffix)
}
