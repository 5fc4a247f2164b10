use crate::conversation::Message;
use crate::tools::ToolSpec;

pub mod gemini;

pub use gemini::{GeminiConfig, GeminiModel};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model api key is not set; export {env_var}")]
    MissingApiKey { env_var: String },
    #[error("model request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("model request failed with status {code}: {body}")]
    Status { code: u16, body: String },
    #[error("malformed model response: {0}")]
    Malformed(String),
    #[error("model returned no candidates: {reason}")]
    NoCandidates { reason: String },
}

/// One model completion. `message` is always an assistant message with at
/// most one tool call; extra calls the model emitted are counted, not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub message: Message,
    pub dropped_tool_calls: usize,
}

impl ModelReply {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            dropped_tool_calls: 0,
        }
    }
}

/// A chat model that can request tool invocations.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, history: &[Message], tools: &[ToolSpec]) -> Result<ModelReply, ModelError>;
}
