pub mod error;
pub mod message;
pub mod prompts;
pub mod selector;
pub mod service;
pub mod store;
pub mod turn;

pub use error::ConversationError;
pub use message::{Message, ToolCall};
pub use prompts::SYSTEM_PROMPT;
pub use selector::{select_response, NO_OUTPUT_FALLBACK};
pub use service::{ChatRequest, ChatResponse, ChatService, PROCESSING_FAILED};
pub use store::{Thread, ThreadHandle, ThreadStore};
pub use turn::{TurnExecutor, TurnLimits, TurnRecord};
