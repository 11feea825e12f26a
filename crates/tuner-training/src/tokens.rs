//! Token accounting for chat-formatted examples.

use crate::error::{TrainingError, TrainingResult};
use crate::dataset::Role;
use crate::format::role_of;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tiktoken_rs::CoreBPE;

/// Framing tokens the chat format adds around every message.
pub const TOKENS_PER_MESSAGE: usize = 3;
/// Extra token charged when a message carries a `name`.
pub const TOKENS_PER_NAME: usize = 1;
/// Tokens that prime the assistant reply at the end of every example.
pub const REPLY_PRIMING_TOKENS: usize = 3;

/// Message fields whose text is billed.
const COUNTED_FIELDS: [&str; 3] = ["role", "content", "name"];

pub trait TokenCounter {
    fn count(&self, text: &str) -> usize;
}

/// `cl100k_base`, the encoding used by the gpt-3.5-turbo and gpt-4 families.
pub struct Cl100kCounter {
    bpe: CoreBPE,
}

impl Cl100kCounter {
    pub fn new() -> TrainingResult<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| TrainingError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl std::fmt::Debug for Cl100kCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cl100kCounter").finish_non_exhaustive()
    }
}

impl TokenCounter for Cl100kCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Per-example numbers feeding the three distributions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleTokens {
    pub messages: usize,
    pub total: usize,
    pub assistant: usize,
}

/// Total tokens across `messages`, including per-message framing and reply priming.
pub fn count_total_tokens(messages: &[Value], counter: &dyn TokenCounter) -> usize {
    let mut total = 0;
    for message in messages {
        total += TOKENS_PER_MESSAGE;
        for field in COUNTED_FIELDS {
            let Some(value) = message.get(field) else {
                continue;
            };
            if let Some(text) = value.as_str() {
                total += counter.count(text);
            }
            if field == "name" {
                total += TOKENS_PER_NAME;
            }
        }
    }
    total + REPLY_PRIMING_TOKENS
}

/// Tokens in the content of assistant messages only.
pub fn count_assistant_tokens(messages: &[Value], counter: &dyn TokenCounter) -> usize {
    messages
        .iter()
        .filter(|m| role_of(m) == Some(Role::Assistant))
        .filter_map(|m| m.get("content").and_then(Value::as_str))
        .map(|text| counter.count(text))
        .sum()
}

pub fn count_example_tokens(messages: &[Value], counter: &dyn TokenCounter) -> ExampleTokens {
    ExampleTokens {
        messages: messages.len(),
        total: count_total_tokens(messages, counter),
        assistant: count_assistant_tokens(messages, counter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// One token per whitespace-separated word.
    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    #[test]
    fn test_total_includes_framing_and_priming() {
        let messages = vec![
            json!({"role": "user", "content": "how are you"}),
            json!({"role": "assistant", "content": "fine thanks"}),
        ];
        // 2 * (3 framing + 1 role) + 3 + 2 words + 3 priming
        assert_eq!(count_total_tokens(&messages, &WordCounter), 16);
    }

    #[test]
    fn test_name_adds_one_token() {
        let messages = vec![json!({"role": "function", "name": "lookup", "content": "ok"})];
        // 3 framing + role + content + name + 1 name surcharge + 3 priming
        assert_eq!(count_total_tokens(&messages, &WordCounter), 10);
    }

    #[test]
    fn test_non_text_fields_are_not_encoded() {
        let messages = vec![json!({"role": "assistant", "content": null, "weight": 1})];
        assert_eq!(count_total_tokens(&messages, &WordCounter), 7);
    }

    #[test]
    fn test_assistant_tokens_only_count_assistant_content() {
        let messages = vec![
            json!({"role": "system", "content": "be nice"}),
            json!({"role": "user", "content": "say three words"}),
            json!({"role": "assistant", "content": "one two three"}),
            json!({"role": "assistant", "content": "four"}),
        ];
        let tokens = count_example_tokens(&messages, &WordCounter);
        assert_eq!(tokens.messages, 4);
        assert_eq!(tokens.assistant, 4);
    }

    #[test]
    fn test_cl100k_counts_common_words() {
        let counter = Cl100kCounter::new().unwrap();
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("hello"), 1);
        assert!(counter.count("The quick brown fox jumps over the lazy dog.") >= 9);
    }
}
