use super::message::Message;

pub const NO_OUTPUT_FALLBACK: &str = "I'm sorry, I couldn't process your request. Please try again.";

/// Picks the text surfaced to the user from one turn's output messages.
///
/// The last featured tool result wins; otherwise the last non-empty model
/// commentary or non-featured tool result; otherwise [`NO_OUTPUT_FALLBACK`].
pub fn select_response(outputs: &[Message]) -> String {
    let mut featured = None;
    let mut commentary = None;

    for message in outputs {
        match message {
            Message::ToolResult {
                content,
                featured: true,
                ..
            } => featured = Some(content),
            Message::ToolResult { content, .. } | Message::Assistant { content, .. }
                if !content.trim().is_empty() =>
            {
                commentary = Some(content)
            }
            _ => {}
        }
    }

    featured
        .or(commentary)
        .cloned()
        .unwrap_or_else(|| NO_OUTPUT_FALLBACK.to_string())
}
