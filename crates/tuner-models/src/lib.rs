//! Provider implementations of the fine-tuning API.
//!
//! Currently only OpenAI is supported.

pub mod openai;

pub use openai::{OpenAIFineTuning, OPENAI_API_BASE};
pub use tuner_abstraction::{ApiError, ApiResult, FineTuningApi};
