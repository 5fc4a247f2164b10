#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Chat,
    Send,
    Papers,
    Download,
    Tools,
    Logs,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "chat" => CliVerb::Chat,
        "send" => CliVerb::Send,
        "papers" => CliVerb::Papers,
        "download" => CliVerb::Download,
        "tools" => CliVerb::Tools,
        "logs" => CliVerb::Logs,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Research Genie: a research assistant that searches arXiv, reads papers and drafts LaTeX papers."
            .to_string(),
        String::new(),
        "Commands:".to_string(),
        "  chat [thread_id]                     Start an interactive conversation".to_string(),
        "  send [--thread <id>] <message>       Run one turn and print the response as JSON"
            .to_string(),
        "                                       (threads live in memory; each send starts a fresh one)"
            .to_string(),
        "  papers                               List generated PDFs as JSON".to_string(),
        "  download <filename>                  Resolve a generated PDF for download".to_string(),
        "  tools                                List the tools available to the model".to_string(),
        "  logs [lines]                         Print recent runtime log entries".to_string(),
        "  help                                 Show this help".to_string(),
        String::new(),
        "Environment:".to_string(),
        "  GEMINI_API_KEY                       API key for the language model".to_string(),
        "  GEMINI_MODEL                         Override the configured model name".to_string(),
        "  RESEARCH_GENIE_HOME                  State root (default ~/.research-genie)"
            .to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
