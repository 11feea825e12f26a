use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// System message used when the author does not supply one.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful and friendly assistant.";

/// Stable identifier for a dataset (content hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(pub String);

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Chat roles accepted by the fine-tuning format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::System, Self::User, Self::Assistant, Self::Function];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Function => "function",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a chat-formatted training example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatTurn {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), name: None }
    }
}

/// A single chat-formatted fine-tuning example, as written by the authoring flow.
///
/// Records read back from disk are kept as raw [`Value`]s instead, since the
/// validator has to look at lines that do not fit this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub messages: Vec<ChatTurn>,
}

impl TrainingExample {
    /// Build a system/user/assistant example.
    ///
    /// A missing or blank system message falls back to [`DEFAULT_SYSTEM_MESSAGE`].
    pub fn from_turns(system: Option<&str>, user: &str, assistant: &str) -> TrainingResult<Self> {
        let system = system
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SYSTEM_MESSAGE);

        let example = Self {
            messages: vec![
                ChatTurn::new(Role::System, system),
                ChatTurn::new(Role::User, user),
                ChatTurn::new(Role::Assistant, assistant),
            ],
        };
        example.validate()?;
        Ok(example)
    }

    pub fn validate(&self) -> TrainingResult<()> {
        if self.messages.is_empty() {
            return Err(TrainingError::InvalidExample("example has no messages".to_string()));
        }
        for (idx, turn) in self.messages.iter().enumerate() {
            if turn.content.trim().is_empty() {
                return Err(TrainingError::InvalidExample(format!(
                    "message[{idx}] ({}) content is empty",
                    turn.role
                )));
            }
        }
        if !self.messages.iter().any(|turn| turn.role == Role::Assistant) {
            return Err(TrainingError::InvalidExample(
                "example has no assistant message".to_string(),
            ));
        }
        Ok(())
    }
}

/// Records exactly as loaded from a dataset file, one JSON value per line.
pub type RawDataset = Vec<Value>;

/// Hash every record's compact JSON, newline separated.
#[must_use]
pub fn compute_dataset_id(examples: &[Value]) -> DatasetId {
    let mut hasher = Sha256::new();

    for ex in examples {
        hasher.update(ex.to_string().as_bytes());
        hasher.update(b"\n");
    }

    DatasetId(hex::encode(hasher.finalize()))
}
