use super::RuntimeError;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Appends one JSON object per line. Failures are swallowed: a broken log
/// must never fail the turn that tried to write it.
pub fn append_runtime_log(path: &Path, level: LogLevel, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": crate::shared::time::now_secs(),
        "level": level.as_str(),
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

pub fn read_recent_log_lines(path: &Path, limit: usize) -> Result<Vec<String>, RuntimeError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(RuntimeError::ReadLog {
                path: path.display().to_string(),
                source,
            })
        }
    };
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| RuntimeError::ReadLog {
            path: path.display().to_string(),
            source,
        })?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    let keep_from = lines.len().saturating_sub(limit);
    Ok(lines.split_off(keep_from))
}
