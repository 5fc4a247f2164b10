use super::error::ConversationError;
use super::message::Message;
use super::selector::{select_response, NO_OUTPUT_FALLBACK};
use super::store::{lock_thread, ThreadStore};
use super::turn::{TurnExecutor, TurnRecord};
use crate::config::DEFAULT_THREAD_ID;
use crate::runtime::{append_runtime_log, LogLevel};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

pub const PROCESSING_FAILED: &str =
    "I encountered an error processing your request. Please try again.";

fn default_thread_id() -> String {
    DEFAULT_THREAD_ID.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_thread_id")]
    pub thread_id: String,
}

impl ChatRequest {
    pub fn new(thread_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            thread_id: thread_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub thread_id: String,
}

fn surfaced_kind(outputs: &[Message], response: &str) -> &'static str {
    let featured = outputs
        .iter()
        .any(|message| matches!(message, Message::ToolResult { featured: true, .. }));
    if featured {
        "tool_result"
    } else if response == NO_OUTPUT_FALLBACK {
        "fallback"
    } else {
        "commentary"
    }
}

/// The "submit message" operation: one turn per request, serialized per
/// thread, with a uniform failure reply.
#[derive(Debug)]
pub struct ChatService {
    store: ThreadStore,
    executor: TurnExecutor,
    default_thread_id: String,
    runtime_log: Option<PathBuf>,
}

impl ChatService {
    pub fn new(store: ThreadStore, executor: TurnExecutor) -> Self {
        Self {
            store,
            executor,
            default_thread_id: default_thread_id(),
            runtime_log: None,
        }
    }

    pub fn with_default_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.default_thread_id = thread_id.into();
        self
    }

    pub fn with_runtime_log(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.executor = self.executor.with_runtime_log(path.clone());
        self.runtime_log = Some(path);
        self
    }

    pub fn default_thread_id(&self) -> &str {
        &self.default_thread_id
    }

    fn log(&self, level: LogLevel, event: &str, message: &str) {
        if let Some(path) = &self.runtime_log {
            append_runtime_log(path, level, event, message);
        }
    }

    pub fn submit(&self, request: &ChatRequest) -> ChatResponse {
        let thread_id = match request.thread_id.trim() {
            "" => self.default_thread_id.clone(),
            id => id.to_string(),
        };
        self.log(LogLevel::Info, "turn.started", &format!("thread={thread_id}"));

        let response = match self.run_and_persist(&thread_id, &request.message) {
            Ok(record) => {
                let response = select_response(&record.outputs);
                self.log(
                    LogLevel::Info,
                    "turn.completed",
                    &format!(
                        "thread={thread_id} tool_rounds={} surfaced={}",
                        record.tool_rounds,
                        surfaced_kind(&record.outputs, &response)
                    ),
                );
                response
            }
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    "turn.failed",
                    &format!("thread={thread_id} error={err}"),
                );
                PROCESSING_FAILED.to_string()
            }
        };

        ChatResponse {
            response,
            thread_id,
        }
    }

    /// Holds the thread lock across the model and tool calls so turns on one
    /// thread never interleave. A failed or panicking turn leaves the history
    /// untouched.
    fn run_and_persist(
        &self,
        thread_id: &str,
        message: &str,
    ) -> Result<TurnRecord, ConversationError> {
        let handle = self.store.resolve(thread_id);
        let mut thread = lock_thread(&handle);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.executor.run_turn(thread.history(), message)
        }));
        let record = outcome.map_err(|payload| ConversationError::TurnPanicked {
            thread_id: thread_id.to_string(),
            reason: panic_reason(payload.as_ref()),
        })??;
        thread.append(record.clone().into_messages());
        Ok(record)
    }

    pub fn history(&self, thread_id: &str) -> Option<Vec<Message>> {
        self.store.snapshot(thread_id)
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|reason| reason.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
