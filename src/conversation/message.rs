use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool invocation requested by the model. Only one is ever attached to an
/// assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call: Option<ToolCall>,
    },
    ToolResult {
        tool: String,
        content: String,
        /// Set by the tool itself: the payload is what the user asked for and
        /// outranks model commentary when the turn's reply is chosen.
        #[serde(default)]
        featured: bool,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_call: None,
        }
    }

    pub fn assistant_with_call(content: impl Into<String>, call: ToolCall) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_call: Some(call),
        }
    }

    pub fn tool_output(tool: impl Into<String>, content: impl Into<String>, featured: bool) -> Self {
        Self::ToolResult {
            tool: tool.into(),
            content: content.into(),
            featured,
            is_error: false,
        }
    }

    pub fn tool_error(tool: impl Into<String>, description: impl Into<String>) -> Self {
        Self::ToolResult {
            tool: tool.into(),
            content: description.into(),
            featured: false,
            is_error: true,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::ToolResult { .. } => "tool_result",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::User { content }
            | Self::Assistant { content, .. }
            | Self::ToolResult { content, .. } => content,
        }
    }

    pub fn tool_call(&self) -> Option<&ToolCall> {
        match self {
            Self::Assistant { tool_call, .. } => tool_call.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_serialize_with_role_tag() {
        let mut args = Map::new();
        args.insert("topic".to_string(), json!("machine learning"));
        let message = Message::assistant_with_call("", ToolCall::new("arxiv_search", args));

        let value = serde_json::to_value(&message).expect("serialize");
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["tool_call"]["name"], "arxiv_search");
        assert_eq!(value["tool_call"]["args"]["topic"], "machine learning");

        let plain = serde_json::to_value(Message::assistant("hi")).expect("serialize");
        assert!(plain.get("tool_call").is_none());
    }

    #[test]
    fn tool_errors_are_never_featured() {
        let message = Message::tool_error("read_pdf", "boom");
        match message {
            Message::ToolResult {
                featured, is_error, ..
            } => {
                assert!(!featured);
                assert!(is_error);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }
}
