// Conversation normalizer: linearizes Responses input items into ordered turns
// and pairs function outputs with their calls by call id.
use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::models::{ConversationItem, FunctionOutput, MessageRole};
use crate::proxy::common::utils::{parse_raw_output, OutputPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
    FunctionResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text {
        text: String,
    },
    FunctionCall {
        name: String,
        call_id: String,
        arguments: String,
    },
    FunctionResponse {
        name: String,
        call_id: String,
        // Opaque from here on: never cleaned, renamed, or inspected.
        response: Value,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTurn {
    pub role: TurnRole,
    pub parts: Vec<Part>,
}

/// Recoverable problems seen while normalizing. None of these fail the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub malformed_items: usize,
    /// Outputs whose call id was never seen.
    pub orphan_outputs: Vec<String>,
    /// Second and later outputs for an already-answered call.
    pub duplicate_outputs: Vec<String>,
    /// Calls reusing an id that is already in use.
    pub duplicate_calls: Vec<String>,
    /// Outputs for a call whose group was already closed by a later turn.
    pub stale_outputs: Vec<String>,
    /// Calls that never received an output.
    pub dangling_calls: Vec<String>,
    /// Raw outputs that were not valid JSON and were kept as text.
    pub text_outputs: usize,
}

impl NormalizeReport {
    pub fn dropped_outputs(&self) -> usize {
        self.orphan_outputs.len() + self.duplicate_outputs.len() + self.stale_outputs.len()
    }

    pub fn is_clean(&self) -> bool {
        self.malformed_items == 0
            && self.dropped_outputs() == 0
            && self.duplicate_calls.is_empty()
            && self.dangling_calls.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedConversation {
    /// System/developer texts in input order; never part of `turns`.
    pub instructions: Vec<String>,
    pub turns: Vec<CanonicalTurn>,
    pub report: NormalizeReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState {
    AwaitingCalls,
    CollectingCalls,
    CollectingOutputs,
}

struct Normalizer {
    state: GroupState,
    current: Option<CanonicalTurn>,
    // Unanswered calls of the current call group, in call order.
    open_calls: Vec<(String, String)>,
    open_index: HashMap<String, String>,
    resolved: HashSet<String>,
    closed: HashSet<String>,
    out: NormalizedConversation,
}

impl Normalizer {
    fn new() -> Self {
        Self {
            state: GroupState::AwaitingCalls,
            current: None,
            open_calls: Vec::new(),
            open_index: HashMap::new(),
            resolved: HashSet::new(),
            closed: HashSet::new(),
            out: NormalizedConversation::default(),
        }
    }

    fn flush_turn(&mut self) {
        if let Some(turn) = self.current.take() {
            if !turn.parts.is_empty() {
                self.out.turns.push(turn);
            }
        }
    }

    // Calls still open when their group ends stay as call-only parts.
    fn close_call_group(&mut self) {
        for (call_id, name) in self.open_calls.drain(..) {
            tracing::debug!(
                "[Responses-Normalize] Call {} ({}) closed without output",
                call_id,
                name
            );
            self.out.report.dangling_calls.push(call_id.clone());
            self.closed.insert(call_id);
        }
        self.open_index.clear();
    }

    fn message(&mut self, role: MessageRole, texts: Vec<String>) {
        if role.is_instruction() {
            self.out.instructions.extend(texts.into_iter().filter(|t| !t.is_empty()));
            return;
        }

        self.flush_turn();
        self.close_call_group();
        self.state = GroupState::AwaitingCalls;

        let parts: Vec<Part> = texts
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(|text| Part::Text { text })
            .collect();
        if parts.is_empty() {
            return;
        }
        let role = match role {
            MessageRole::Assistant => TurnRole::Model,
            _ => TurnRole::User,
        };
        self.out.turns.push(CanonicalTurn { role, parts });
    }

    fn function_call(&mut self, name: String, call_id: String, arguments: String) {
        if self.open_index.contains_key(&call_id)
            || self.resolved.contains(&call_id)
            || self.closed.contains(&call_id)
        {
            tracing::warn!(
                "[Responses-Normalize] Duplicate call id {} for {}, skipping call",
                call_id,
                name
            );
            self.out.report.duplicate_calls.push(call_id);
            return;
        }

        if self.state != GroupState::CollectingCalls {
            self.flush_turn();
            self.close_call_group();
            self.current = Some(CanonicalTurn {
                role: TurnRole::Model,
                parts: Vec::new(),
            });
            self.state = GroupState::CollectingCalls;
        }

        self.open_calls.push((call_id.clone(), name.clone()));
        self.open_index.insert(call_id.clone(), name.clone());
        if let Some(turn) = self.current.as_mut() {
            turn.parts.push(Part::FunctionCall {
                name,
                call_id,
                arguments,
            });
        }
    }

    fn function_output(&mut self, call_id: String, output: FunctionOutput) {
        let Some(name) = self.open_index.remove(&call_id) else {
            self.reject_output(call_id);
            return;
        };
        self.open_calls.retain(|(id, _)| id != &call_id);
        self.resolved.insert(call_id.clone());

        let response = match output {
            FunctionOutput::Structured(value) => value,
            FunctionOutput::Raw(raw) => match parse_raw_output(&raw) {
                OutputPayload::Structured(value) => value,
                OutputPayload::Text(text) => {
                    self.out.report.text_outputs += 1;
                    Value::String(text)
                }
            },
        };

        if self.state != GroupState::CollectingOutputs {
            self.flush_turn();
            self.current = Some(CanonicalTurn {
                role: TurnRole::FunctionResult,
                parts: Vec::new(),
            });
            self.state = GroupState::CollectingOutputs;
        }
        if let Some(turn) = self.current.as_mut() {
            turn.parts.push(Part::FunctionResponse {
                name,
                call_id,
                response,
            });
        }
    }

    fn reject_output(&mut self, call_id: String) {
        if self.resolved.contains(&call_id) {
            tracing::warn!(
                "[Responses-Normalize] Duplicate output for call {}, dropping",
                call_id
            );
            self.out.report.duplicate_outputs.push(call_id);
        } else if self.closed.contains(&call_id) {
            tracing::warn!(
                "[Responses-Normalize] Output for call {} arrived after its turn closed, dropping",
                call_id
            );
            self.out.report.stale_outputs.push(call_id);
        } else {
            tracing::warn!(
                "[Responses-Normalize] Output references unknown call {}, dropping",
                call_id
            );
            self.out.report.orphan_outputs.push(call_id);
        }
    }

    fn finish(mut self) -> NormalizedConversation {
        self.flush_turn();
        self.close_call_group();
        self.out
    }
}

/// Builds ordered turns from conversation items in one pass.
///
/// Consecutive calls share one model turn; consecutive outputs share one
/// function-result turn in arrival order. A user or assistant message closes
/// the open call group, so later outputs for those calls are dropped as stale.
pub fn normalize(items: &[ConversationItem]) -> NormalizedConversation {
    let mut normalizer = Normalizer::new();
    for item in items {
        match item {
            ConversationItem::Message { role, content } => {
                let texts = content.iter().map(|b| b.text.clone()).collect();
                normalizer.message(*role, texts);
            }
            ConversationItem::FunctionCall {
                name,
                call_id,
                arguments,
            } => normalizer.function_call(name.clone(), call_id.clone(), arguments.clone()),
            ConversationItem::FunctionCallOutput { call_id, output } => {
                normalizer.function_output(call_id.clone(), output.clone())
            }
        }
    }

    let out = normalizer.finish();
    if !out.report.is_clean() {
        tracing::info!(
            "[Responses-Normalize] turns={} dropped_outputs={} dangling_calls={} duplicate_calls={}",
            out.turns.len(),
            out.report.dropped_outputs(),
            out.report.dangling_calls.len(),
            out.report.duplicate_calls.len()
        );
    }
    out
}
