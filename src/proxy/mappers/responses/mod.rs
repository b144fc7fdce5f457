// Responses -> Gemini -> Antigravity request translation
pub mod contents;
pub mod models;
pub mod normalize;
pub mod request;

use serde_json::Value;

use crate::error::{TranslateError, TranslateResult};
use crate::proxy::common::model_mapping::resolve_dialect;
use crate::proxy::config::TranslatorConfig;
use crate::proxy::mappers::gemini::leak_guard;
use crate::proxy::mappers::gemini::wrapper::assemble_envelope;
use crate::proxy::routing::RoutingMetadataProvider;

pub use models::ResponsesRequest;
pub use normalize::{normalize, NormalizeReport};

#[derive(Debug, Clone)]
pub struct TranslationOutput {
    pub envelope: Value,
    pub report: NormalizeReport,
}

/// Translates one Responses-style request body into an Antigravity envelope.
///
/// `mapped_model` overrides the body's `model` when non-empty. Bad items,
/// unmatched outputs and non-JSON outputs are tolerated and reported, and
/// malformed optional fields are dropped. Only a non-object body, a missing
/// target model or a reserved key inside `request.contents` fails.
pub fn transform_responses_request(
    mapped_model: &str,
    body: &Value,
    config: &TranslatorConfig,
    routing: &dyn RoutingMetadataProvider,
) -> TranslateResult<TranslationOutput> {
    if !body.is_object() {
        return Err(TranslateError::InvalidDocument(
            "request body must be a JSON object".to_string(),
        ));
    }
    let req: ResponsesRequest = serde_json::from_value(body.clone())
        .map_err(|e| TranslateError::InvalidDocument(e.to_string()))?;

    let model = if mapped_model.is_empty() {
        req.model.as_str()
    } else {
        mapped_model
    };
    if model.is_empty() {
        return Err(TranslateError::InvalidDocument(
            "no target model: body has no `model` and none was mapped".to_string(),
        ));
    }
    let dialect = resolve_dialect(model);

    let parsed = req.parse_input();
    let mut conversation = normalize(&parsed.items);
    conversation.report.malformed_items = parsed.malformed.len();

    let inner = request::build_gemini_request(&req, &conversation, &dialect, config);
    let meta = routing.routing_metadata(&dialect.model, &parsed.items, config);

    let envelope = assemble_envelope(inner, &dialect, &meta, config)?;
    leak_guard::verify_envelope(&envelope)?;

    tracing::info!(
        "[Responses-Request] model={} profile={} contents={} request_id={}",
        dialect.model,
        dialect.schema_profile.as_str(),
        conversation.turns.len(),
        meta.request_id
    );

    Ok(TranslationOutput {
        envelope,
        report: conversation.report,
    })
}
