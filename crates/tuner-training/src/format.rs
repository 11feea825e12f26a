//! Structural checks against the chat fine-tuning format.
//!
//! Each check is independent; one example can trip several categories.
//! Message-level categories count once per offending message, example-level
//! categories once per example.

use crate::dataset::Role;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys a message may carry.
pub const RECOGNIZED_MESSAGE_KEYS: [&str; 5] = ["role", "content", "name", "function_call", "weight"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatErrorKind {
    /// The record is not a JSON object.
    DataType,
    /// `messages` is absent, not an array, or empty.
    MissingMessagesList,
    /// A message lacks `role`, or lacks both `content` and `function_call`.
    MessageMissingKey,
    /// A message carries a key outside [`RECOGNIZED_MESSAGE_KEYS`].
    MessageUnrecognizedKey,
    /// A message's role is not one of [`Role`].
    UnrecognizedRole,
    /// A message has no usable content.
    MissingContent,
    /// No message in the example has the assistant role.
    ExampleMissingAssistantMessage,
}

impl FormatErrorKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::DataType => "data_type",
            Self::MissingMessagesList => "missing_messages_list",
            Self::MessageMissingKey => "message_missing_key",
            Self::MessageUnrecognizedKey => "message_unrecognized_key",
            Self::UnrecognizedRole => "unrecognized_role",
            Self::MissingContent => "missing_content",
            Self::ExampleMissingAssistantMessage => "example_missing_assistant_message",
        }
    }
}

impl std::fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Occurrence count per error category. Categories with no occurrences are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatErrors {
    counts: BTreeMap<FormatErrorKind, usize>,
}

impl FormatErrors {
    pub fn record(&mut self, kind: FormatErrorKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    #[must_use]
    pub fn count(&self, kind: FormatErrorKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormatErrorKind, usize)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl Extend<FormatErrorKind> for FormatErrors {
    fn extend<T: IntoIterator<Item = FormatErrorKind>>(&mut self, iter: T) {
        for kind in iter {
            self.record(kind);
        }
    }
}

/// Mirrors the truthiness the provider's checker applies to field values.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn check_message(fields: &Map<String, Value>, errors: &mut Vec<FormatErrorKind>) {
    let content = fields.get("content");
    let function_call = fields.get("function_call");

    if !fields.contains_key("role") || (content.is_none() && function_call.is_none()) {
        errors.push(FormatErrorKind::MessageMissingKey);
    }

    if fields.keys().any(|key| !RECOGNIZED_MESSAGE_KEYS.contains(&key.as_str())) {
        errors.push(FormatErrorKind::MessageUnrecognizedKey);
    }

    if fields.get("role").and_then(Value::as_str).and_then(Role::parse).is_none() {
        errors.push(FormatErrorKind::UnrecognizedRole);
    }

    // null content is how function-call turns are written; treat it as absent.
    let has_content = content.is_some_and(is_truthy);
    let has_function_call = function_call.is_some_and(is_truthy);
    let content_not_text = content.is_some_and(|c| !c.is_null() && !c.is_string());
    if (!has_content && !has_function_call) || content_not_text {
        errors.push(FormatErrorKind::MissingContent);
    }
}

/// The message list of a record, if the record is shaped well enough to have one.
#[must_use]
pub fn messages_of(example: &Value) -> Option<&[Value]> {
    match example.as_object()?.get("messages")? {
        Value::Array(messages) if !messages.is_empty() => Some(messages.as_slice()),
        _ => None,
    }
}

/// The role string of a message, if any.
#[must_use]
pub fn role_of(message: &Value) -> Option<Role> {
    message.get("role").and_then(Value::as_str).and_then(Role::parse)
}

/// Run every structural check against one record.
#[must_use]
pub fn check_example(example: &Value) -> Vec<FormatErrorKind> {
    if !example.is_object() {
        return vec![FormatErrorKind::DataType];
    }
    let Some(messages) = messages_of(example) else {
        return vec![FormatErrorKind::MissingMessagesList];
    };

    let empty = Map::new();
    let mut errors = Vec::new();
    for message in messages {
        check_message(message.as_object().unwrap_or(&empty), &mut errors);
    }

    if !messages.iter().any(|m| role_of(m) == Some(Role::Assistant)) {
        errors.push(FormatErrorKind::ExampleMissingAssistantMessage);
    }

    errors
}

/// Accumulate error counts over a dataset.
#[must_use]
pub fn check_examples(examples: &[Value]) -> FormatErrors {
    let mut errors = FormatErrors::default();
    for example in examples {
        errors.extend(check_example(example));
    }
    errors
}
