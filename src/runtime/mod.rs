pub mod logging;
pub mod state_paths;

pub use crate::shared::errors::RuntimeError;
pub use logging::{append_runtime_log, read_recent_log_lines, LogLevel};
pub use state_paths::{
    bootstrap_state_root, default_state_root_path, StatePaths, DEFAULT_STATE_ROOT_DIR,
    STATE_ROOT_ENV,
};
