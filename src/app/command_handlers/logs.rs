use crate::app::command_support::ensure_runtime_root;
use crate::runtime::read_recent_log_lines;

const DEFAULT_LOG_LINES: usize = 20;

pub fn cmd_logs(args: &[String]) -> Result<String, String> {
    let limit = match args {
        [] => DEFAULT_LOG_LINES,
        [count] => count
            .parse::<usize>()
            .ok()
            .filter(|count| *count > 0)
            .ok_or_else(|| format!("invalid line count `{count}`"))?,
        _ => return Err("usage: logs [lines]".to_string()),
    };
    let paths = ensure_runtime_root()?;
    let lines = read_recent_log_lines(&paths.runtime_log_path(), limit).map_err(|e| e.to_string())?;
    if lines.is_empty() {
        return Ok(format!("no runtime log entries at {}", paths.runtime_log_path().display()));
    }
    Ok(lines.join("\n"))
}
