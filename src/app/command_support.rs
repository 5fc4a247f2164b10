use crate::config::{self, ConfigError, Settings};
use crate::conversation::{ChatService, ThreadStore, TurnExecutor, TurnLimits};
use crate::provider::{GeminiConfig, GeminiModel};
use crate::runtime::{bootstrap_state_root, default_state_root_path, StatePaths};
use crate::tools::{research_registry, resolve_output_dir, ToolRegistry};
use std::path::PathBuf;
use std::sync::Arc;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn ensure_runtime_root() -> Result<StatePaths, String> {
    let root = default_state_root_path().map_err(|e| e.to_string())?;
    let paths = StatePaths::new(root);
    bootstrap_state_root(&paths).map_err(|e| e.to_string())?;
    Ok(paths)
}

pub fn load_settings(paths: &StatePaths) -> Result<Settings, String> {
    config::load_settings(paths).map_err(map_config_err)
}

pub fn output_dir(settings: &Settings, paths: &StatePaths) -> PathBuf {
    resolve_output_dir(settings, paths)
}

pub fn build_registry(settings: &Settings, paths: &StatePaths) -> Result<ToolRegistry, String> {
    research_registry(settings, paths).map_err(|e| e.to_string())
}

pub fn turn_limits(settings: &Settings) -> TurnLimits {
    TurnLimits {
        max_tool_rounds: settings.conversation.max_tool_rounds,
        tool_timeout: settings.conversation.tool_timeout(),
    }
}

/// Wires the Gemini model, the research tools and a fresh thread store into a
/// chat service that logs to the runtime log.
pub fn build_chat_service(settings: &Settings, paths: &StatePaths) -> Result<ChatService, String> {
    let api_key = settings.resolve_api_key().map_err(map_config_err)?;
    let model = GeminiModel::new(GeminiConfig::from_settings(&settings.model, api_key))
        .map_err(|e| e.to_string())?;
    let registry = build_registry(settings, paths)?;
    let executor = TurnExecutor::new(Arc::new(model), Arc::new(registry), turn_limits(settings));

    Ok(ChatService::new(ThreadStore::new(), executor)
        .with_default_thread_id(settings.conversation.default_thread_id.clone())
        .with_runtime_log(paths.runtime_log_path()))
}
