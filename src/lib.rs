pub mod constants;
pub mod error;
pub mod modules;
pub mod proxy;
#[cfg(test)]
mod test_utils;

pub use error::{TranslateError, TranslateResult};
pub use modules::system::logger::init_logger;
pub use proxy::config::{SafetyThreshold, TranslatorConfig};
pub use proxy::mappers::responses::normalize::NormalizeReport;
pub use proxy::mappers::responses::transform_responses_request as translate_responses_request;
pub use proxy::mappers::responses::TranslationOutput;
pub use proxy::routing::{ConfigRoutingProvider, RoutingMetadata, RoutingMetadataProvider};
