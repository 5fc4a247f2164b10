use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod chat;
pub mod logs;
pub mod papers;
pub mod tools;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Chat => chat::cmd_chat(&args[1..]),
        CliVerb::Send => chat::cmd_send(&args[1..]),
        CliVerb::Papers => papers::cmd_papers(&args[1..]),
        CliVerb::Download => papers::cmd_download(&args[1..]),
        CliVerb::Tools => tools::cmd_tools(&args[1..]),
        CliVerb::Logs => logs::cmd_logs(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
