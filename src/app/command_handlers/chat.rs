use crate::app::command_support::{build_chat_service, ensure_runtime_root, load_settings};
use crate::conversation::{ChatRequest, ChatService, Message};
use std::io::{self, BufRead, Write};

pub const CHAT_EXIT_COMMANDS: &[&str] = &["/exit", "exit", "quit"];
const HISTORY_COMMAND: &str = "/history";
const HISTORY_PREVIEW_CHARS: usize = 72;

pub fn cmd_chat(args: &[String]) -> Result<String, String> {
    if args.len() > 1 {
        return Err("usage: chat [thread_id]".to_string());
    }

    let paths = ensure_runtime_root()?;
    let settings = load_settings(&paths)?;
    let service = build_chat_service(&settings, &paths)?;
    let thread_id = args
        .first()
        .cloned()
        .unwrap_or_else(|| settings.conversation.default_thread_id.clone());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    run_chat_repl(&service, &thread_id, &mut input, &mut output)?;
    Ok(format!("chat ended\nthread_id={thread_id}"))
}

/// Parses `[--thread <id>] <message...>`. The id only labels the one-shot
/// turn; histories are not kept between invocations.
pub fn parse_send_args(args: &[String]) -> Result<(Option<String>, String), String> {
    let usage = || "usage: send [--thread <id>] <message>".to_string();
    let (thread_id, rest) = match args.first().map(String::as_str) {
        Some("--thread") => {
            let id = args.get(1).filter(|id| !id.trim().is_empty()).ok_or_else(usage)?;
            (Some(id.clone()), &args[2..])
        }
        _ => (None, args),
    };
    let message = rest.join(" ");
    if message.trim().is_empty() {
        return Err(usage());
    }
    Ok((thread_id, message))
}

pub fn cmd_send(args: &[String]) -> Result<String, String> {
    let (thread_id, message) = parse_send_args(args)?;
    let paths = ensure_runtime_root()?;
    let settings = load_settings(&paths)?;
    let service = build_chat_service(&settings, &paths)?;

    let request = ChatRequest::new(
        thread_id.unwrap_or_else(|| settings.conversation.default_thread_id.clone()),
        message,
    );
    let response = service.submit(&request);
    serde_json::to_string_pretty(&response).map_err(|e| format!("failed to encode response: {e}"))
}

fn is_chat_exit_command(message: &str) -> bool {
    CHAT_EXIT_COMMANDS
        .iter()
        .any(|command| message.eq_ignore_ascii_case(command))
}

fn history_line(index: usize, message: &Message) -> String {
    let flat = message.content().split_whitespace().collect::<Vec<_>>().join(" ");
    let mut preview: String = flat.chars().take(HISTORY_PREVIEW_CHARS).collect();
    if flat.chars().count() > HISTORY_PREVIEW_CHARS {
        preview.push_str("...");
    }
    match message.tool_call() {
        Some(call) => format!("{index:>3} {} [calls {}] {preview}", message.role(), call.name),
        None => format!("{index:>3} {} {preview}", message.role()),
    }
}

pub fn run_chat_repl<R: BufRead, W: Write>(
    service: &ChatService,
    thread_id: &str,
    input: &mut R,
    output: &mut W,
) -> Result<(), String> {
    writeln!(output, "chat thread_id={thread_id}")
        .map_err(|e| format!("failed to write chat output: {e}"))?;
    writeln!(output, "type `/exit` to quit, `/history` to show the thread")
        .map_err(|e| format!("failed to write chat output: {e}"))?;

    loop {
        write!(output, "you> ").map_err(|e| format!("failed to write chat prompt: {e}"))?;
        output
            .flush()
            .map_err(|e| format!("failed to flush chat prompt: {e}"))?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| format!("failed to read chat input: {e}"))?;
        if read == 0 {
            break;
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if is_chat_exit_command(message) {
            break;
        }
        if message.eq_ignore_ascii_case(HISTORY_COMMAND) {
            let history = service.history(thread_id).unwrap_or_default();
            for (index, entry) in history.iter().enumerate() {
                writeln!(output, "{}", history_line(index + 1, entry))
                    .map_err(|e| format!("failed to write chat history: {e}"))?;
            }
            continue;
        }

        let response = service.submit(&ChatRequest::new(thread_id, message));
        writeln!(output, "assistant> {}", response.response)
            .map_err(|e| format!("failed to write chat output: {e}"))?;
        output
            .flush()
            .map_err(|e| format!("failed to flush chat output: {e}"))?;
    }

    Ok(())
}
