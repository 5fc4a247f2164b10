use crate::provider::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("unknown tool `{tool}`")]
    UnknownTool { tool: String },
    #[error("tool `{tool}` failed: {reason}")]
    ToolExecution { tool: String, reason: String },
    #[error("model invocation failed: {0}")]
    ModelInvocation(#[from] ModelError),
    #[error("tool `{tool}` timed out after {timeout_ms}ms")]
    ToolTimeout { tool: String, timeout_ms: u64 },
    #[error("turn exceeded max tool rounds ({max_tool_rounds})")]
    ToolRoundsExceeded { max_tool_rounds: u32 },
    #[error("turn on thread `{thread_id}` panicked: {reason}")]
    TurnPanicked { thread_id: String, reason: String },
}

impl ConversationError {
    /// Recoverable failures are shown to the model as an error tool result;
    /// the rest abort the turn.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnknownTool { .. } | Self::ToolExecution { .. })
    }
}
