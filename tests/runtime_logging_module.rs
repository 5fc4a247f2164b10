use research_genie::runtime::logging::{append_runtime_log, read_recent_log_lines, LogLevel};
use research_genie::runtime::state_paths::{bootstrap_state_root, StatePaths};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

#[test]
fn runtime_logging_module_writes_json_log_lines() {
    let tmp = tempdir().expect("tempdir");
    let paths = StatePaths::new(tmp.path().join(".research-genie"));
    bootstrap_state_root(&paths).expect("bootstrap state root");

    append_runtime_log(
        &paths.runtime_log_path(),
        LogLevel::Info,
        "runtime.test",
        "hello runtime",
    );

    let log = fs::read_to_string(paths.runtime_log_path()).expect("read runtime log");
    let entry: Value = serde_json::from_str(log.trim()).expect("json line");
    assert_eq!(entry["level"], "info");
    assert_eq!(entry["event"], "runtime.test");
    assert_eq!(entry["message"], "hello runtime");
    assert!(entry["timestamp"].is_i64());
}

#[test]
fn recent_log_lines_keep_the_tail() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("logs/runtime.log");
    for index in 0..5 {
        append_runtime_log(&path, LogLevel::Warn, "tool.failed", &format!("entry {index}"));
    }

    let lines = read_recent_log_lines(&path, 2).expect("lines");
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("entry 3"));
    assert!(lines[1].contains("entry 4"));

    let missing = read_recent_log_lines(&tmp.path().join("nope.log"), 10).expect("missing");
    assert!(missing.is_empty());
}
