use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("required binary `{binary}` is not installed")]
    MissingBinary { binary: String },
    #[error("`{binary}` failed with exit code {exit_code}: {stderr}")]
    NonZeroExit {
        binary: String,
        exit_code: i32,
        stderr: String,
    },
    #[error("`{binary}` timed out after {timeout_ms}ms")]
    Timeout { binary: String, timeout_ms: u64 },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub binary: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn command_form(&self) -> String {
        format!("{} {}", self.binary, self.args.join(" "))
    }
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

fn io_error(path: &Path, source: std::io::Error) -> ProcessError {
    ProcessError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Runs an external program to completion, killing it once `spec.timeout`
/// elapses. Output pipes are drained on helper threads so a chatty child
/// cannot block on a full pipe.
pub fn run_command(spec: &CommandSpec) -> Result<CommandOutput, ProcessError> {
    let mut command = Command::new(&spec.binary);
    command
        .current_dir(&spec.cwd)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProcessError::MissingBinary {
                binary: spec.binary.clone(),
            })
        }
        Err(err) => return Err(io_error(&spec.cwd, err)),
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io_error(&spec.cwd, std::io::Error::other("missing stdout pipe")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io_error(&spec.cwd, std::io::Error::other("missing stderr pipe")))?;

    let stdout_reader = thread::spawn(move || {
        let mut buf = String::new();
        let _ = BufReader::new(stdout).read_to_string(&mut buf);
        buf
    });
    let stderr_reader = thread::spawn(move || {
        let mut buf = String::new();
        let _ = BufReader::new(stderr).read_to_string(&mut buf);
        buf
    });

    let start = Instant::now();
    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > spec.timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_reader.join();
                    let _ = stderr_reader.join();
                    return Err(ProcessError::Timeout {
                        binary: spec.binary.clone(),
                        timeout_ms: spec.timeout.as_millis() as u64,
                    });
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(err) => return Err(io_error(&spec.cwd, err)),
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    if !exit_status.success() {
        return Err(ProcessError::NonZeroExit {
            binary: spec.binary.clone(),
            exit_code: exit_status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(CommandOutput {
        stdout,
        stderr,
        exit_code: exit_status.code(),
    })
}
