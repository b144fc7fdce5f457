pub mod common;
pub mod config;
pub mod mappers;
pub mod routing;
pub mod session_manager;

pub use config::{SafetyThreshold, TranslatorConfig};
pub use mappers::responses::{transform_responses_request, TranslationOutput};
pub use routing::{ConfigRoutingProvider, RoutingMetadata, RoutingMetadataProvider};

#[cfg(test)]
pub mod tests;
