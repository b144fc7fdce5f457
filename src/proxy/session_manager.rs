use sha2::{Digest, Sha256};

use crate::proxy::mappers::responses::models::{ConversationItem, MessageRole};

pub struct SessionManager;

impl SessionManager {
    /// Stable `sid-<16 hex>` for a conversation, derived from its first
    /// substantial user text so every turn of one chat maps to one session.
    pub fn extract_responses_session_id(items: &[ConversationItem]) -> String {
        let mut hasher = Sha256::new();

        let mut content_found = false;
        for item in items {
            let ConversationItem::Message {
                role: MessageRole::User,
                content,
            } = item
            else {
                continue;
            };
            let text = content
                .iter()
                .map(|block| block.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            let clean_text = text.trim();
            if clean_text.len() > 10 && !clean_text.contains("<system-reminder>") {
                hasher.update(clean_text.as_bytes());
                content_found = true;
                break;
            }
        }

        if !content_found {
            if let Some(last) = items.last() {
                hasher.update(format!("{:?}", last).as_bytes());
            }
        }

        let hash = format!("{:x}", hasher.finalize());
        let sid = format!("sid-{}", &hash[..16]);
        tracing::debug!(
            "[SessionManager-Responses] Generated fingerprint: {} (content_found: {})",
            sid,
            content_found
        );
        sid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::mappers::responses::models::{BlockKind, ContentBlock};

    fn user(text: &str) -> ConversationItem {
        ConversationItem::Message {
            role: MessageRole::User,
            content: vec![ContentBlock {
                kind: BlockKind::InputText,
                text: text.to_string(),
            }],
        }
    }

    #[test]
    fn same_first_prompt_gives_same_session() {
        let first = vec![user("please refactor the parser module")];
        let mut later = first.clone();
        later.push(user("and now add tests"));

        let a = SessionManager::extract_responses_session_id(&first);
        let b = SessionManager::extract_responses_session_id(&later);
        assert_eq!(a, b);
        assert!(a.starts_with("sid-"));
        assert_eq!(a.len(), 4 + 16);
    }

    #[test]
    fn short_and_reminder_texts_are_skipped() {
        let with_noise = vec![
            user("hi"),
            user("<system-reminder>ctx</system-reminder> please help"),
            user("please refactor the parser module"),
        ];
        let clean = vec![user("please refactor the parser module")];
        assert_eq!(
            SessionManager::extract_responses_session_id(&with_noise),
            SessionManager::extract_responses_session_id(&clean)
        );
    }

    #[test]
    fn different_prompts_differ() {
        assert_ne!(
            SessionManager::extract_responses_session_id(&[user("please refactor the parser")]),
            SessionManager::extract_responses_session_id(&[user("please document the lexer")])
        );
    }

    #[test]
    fn empty_input_still_yields_an_id() {
        let sid = SessionManager::extract_responses_session_id(&[]);
        assert!(sid.starts_with("sid-"));
    }
}
