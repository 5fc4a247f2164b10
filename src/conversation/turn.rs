use super::error::ConversationError;
use super::message::{Message, ToolCall};
use crate::provider::LanguageModel;
use crate::runtime::{append_runtime_log, LogLevel};
use crate::tools::{ToolOutput, ToolRegistry};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnLimits {
    pub max_tool_rounds: u32,
    pub tool_timeout: Duration,
}

impl Default for TurnLimits {
    fn default() -> Self {
        Self {
            max_tool_rounds: 1,
            tool_timeout: Duration::from_secs(180),
        }
    }
}

/// Messages one successful turn produced, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub user: Message,
    pub outputs: Vec<Message>,
    pub tool_rounds: u32,
}

impl TurnRecord {
    pub fn into_messages(self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.outputs.len() + 1);
        messages.push(self.user);
        messages.extend(self.outputs);
        messages
    }
}

pub struct TurnExecutor {
    model: Arc<dyn LanguageModel>,
    registry: Arc<ToolRegistry>,
    limits: TurnLimits,
    runtime_log: Option<PathBuf>,
}

impl TurnExecutor {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        registry: Arc<ToolRegistry>,
        limits: TurnLimits,
    ) -> Self {
        Self {
            model,
            registry,
            limits,
            runtime_log: None,
        }
    }

    pub fn with_runtime_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.runtime_log = Some(path.into());
        self
    }

    fn log(&self, level: LogLevel, event: &str, message: &str) {
        if let Some(path) = &self.runtime_log {
            append_runtime_log(path, level, event, message);
        }
    }

    /// Runs one turn against a copy of `history`. Nothing is persisted here;
    /// the caller appends [`TurnRecord::into_messages`] on success.
    pub fn run_turn(
        &self,
        history: &[Message],
        user_text: &str,
    ) -> Result<TurnRecord, ConversationError> {
        let user = Message::user(user_text);
        let mut working = history.to_vec();
        working.push(user.clone());
        let mut outputs = Vec::new();
        let mut tool_rounds = 0;

        loop {
            let reply = self.model.complete(&working, self.registry.specs())?;
            if reply.dropped_tool_calls > 0 {
                self.log(
                    LogLevel::Warn,
                    "model.extra_tool_calls_dropped",
                    &format!("dropped {} extra tool call(s)", reply.dropped_tool_calls),
                );
            }

            let assistant = reply.message;
            let Some(call) = assistant.tool_call().cloned() else {
                if !assistant.content().trim().is_empty() {
                    outputs.push(assistant);
                }
                break;
            };

            if tool_rounds >= self.limits.max_tool_rounds {
                return Err(ConversationError::ToolRoundsExceeded {
                    max_tool_rounds: self.limits.max_tool_rounds,
                });
            }
            tool_rounds += 1;

            let result = self.execute_tool(&call)?;
            working.push(assistant.clone());
            working.push(result.clone());
            outputs.push(assistant);
            outputs.push(result);
        }

        Ok(TurnRecord {
            user,
            outputs,
            tool_rounds,
        })
    }

    /// Runs `call` and wraps the outcome as a tool result. Recoverable
    /// failures become error results; a timeout aborts the turn.
    fn execute_tool(&self, call: &ToolCall) -> Result<Message, ConversationError> {
        self.log(LogLevel::Info, "tool.invoked", &format!("tool={}", call.name));
        match self.invoke(call) {
            Ok(output) => Ok(Message::tool_output(
                &call.name,
                output.content,
                output.featured,
            )),
            Err(err) if err.is_recoverable() => {
                self.log(
                    LogLevel::Warn,
                    "tool.failed",
                    &format!("tool={} error={err}", call.name),
                );
                Ok(Message::tool_error(&call.name, format!("Error: {err}")))
            }
            Err(err) => {
                if matches!(err, ConversationError::ToolTimeout { .. }) {
                    self.log(LogLevel::Error, "tool.timeout", &err.to_string());
                }
                Err(err)
            }
        }
    }

    fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ConversationError> {
        let tool = self
            .registry
            .get(&call.name)
            .ok_or_else(|| ConversationError::UnknownTool {
                tool: call.name.clone(),
            })?;
        let execution_error = |reason: String| ConversationError::ToolExecution {
            tool: call.name.clone(),
            reason,
        };
        tool.spec()
            .check_args(&call.args)
            .map_err(|err| execution_error(err.to_string()))?;

        let (sender, receiver) = mpsc::channel();
        let args = call.args.clone();
        thread::spawn(move || {
            let _ = sender.send(tool.call(&args));
        });

        match receiver.recv_timeout(self.limits.tool_timeout) {
            Ok(result) => result.map_err(|err| execution_error(err.to_string())),
            Err(RecvTimeoutError::Timeout) => Err(ConversationError::ToolTimeout {
                tool: call.name.clone(),
                timeout_ms: self.limits.tool_timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => {
                Err(execution_error("tool worker stopped without a result".to_string()))
            }
        }
    }
}

impl std::fmt::Debug for TurnExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnExecutor")
            .field("registry", &self.registry)
            .field("limits", &self.limits)
            .finish()
    }
}
