use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_THREAD_ID: &str = "default";
pub const MODEL_ENV: &str = "GEMINI_MODEL";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub conversation: ConversationSettings,
    #[serde(default)]
    pub tools: ToolSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelSettings {
    #[serde(default = "default_model_name")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: default_model_name(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConversationSettings {
    #[serde(default = "default_thread_id")]
    pub default_thread_id: String,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    #[serde(default = "default_tool_timeout_seconds")]
    pub tool_timeout_seconds: u64,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            default_thread_id: default_thread_id(),
            max_tool_rounds: default_max_tool_rounds(),
            tool_timeout_seconds: default_tool_timeout_seconds(),
        }
    }
}

impl ConversationSettings {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolSettings {
    #[serde(default = "default_arxiv_api_base")]
    pub arxiv_api_base: String,
    #[serde(default = "default_search_max_results")]
    pub search_max_results: u32,
    #[serde(default = "default_pdf_max_chars")]
    pub pdf_max_chars: usize,
    #[serde(default = "default_pdf_max_bytes")]
    pub pdf_max_bytes: u64,
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,
    #[serde(default = "default_pdftotext_binary")]
    pub pdftotext_binary: String,
    #[serde(default = "default_tectonic_binary")]
    pub tectonic_binary: String,
    #[serde(default = "default_compile_timeout_seconds")]
    pub compile_timeout_seconds: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            arxiv_api_base: default_arxiv_api_base(),
            search_max_results: default_search_max_results(),
            pdf_max_chars: default_pdf_max_chars(),
            pdf_max_bytes: default_pdf_max_bytes(),
            http_timeout_seconds: default_http_timeout_seconds(),
            pdftotext_binary: default_pdftotext_binary(),
            tectonic_binary: default_tectonic_binary(),
            compile_timeout_seconds: default_compile_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            download_base_url: default_download_base_url(),
        }
    }
}

fn default_model_name() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_p() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    8000
}

fn default_request_timeout_seconds() -> u64 {
    120
}

fn default_thread_id() -> String {
    DEFAULT_THREAD_ID.to_string()
}

fn default_max_tool_rounds() -> u32 {
    1
}

fn default_tool_timeout_seconds() -> u64 {
    180
}

fn default_arxiv_api_base() -> String {
    "http://export.arxiv.org/api/query".to_string()
}

fn default_search_max_results() -> u32 {
    5
}

fn default_pdf_max_chars() -> usize {
    8000
}

fn default_pdf_max_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_http_timeout_seconds() -> u64 {
    60
}

fn default_pdftotext_binary() -> String {
    "pdftotext".to_string()
}

fn default_tectonic_binary() -> String {
    "tectonic".to_string()
}

fn default_compile_timeout_seconds() -> u64 {
    150
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_download_base_url() -> String {
    "http://localhost:8000/papers/download".to_string()
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Applies `GEMINI_MODEL` on top of whatever the file said.
    pub fn apply_env_overrides(&mut self) {
        if let Some(model) = std::env::var(MODEL_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            self.model.model = model;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.model.trim().is_empty() {
            return Err(ConfigError::Settings("model.model must be non-empty".into()));
        }
        if self.model.api_key_env.trim().is_empty() {
            return Err(ConfigError::Settings(
                "model.api_key_env must be non-empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Settings(format!(
                "model.temperature must be within 0.0..=2.0, got {}",
                self.model.temperature
            )));
        }
        if self.model.request_timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "model.request_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.conversation.default_thread_id.trim().is_empty() {
            return Err(ConfigError::Settings(
                "conversation.default_thread_id must be non-empty".into(),
            ));
        }
        if self.conversation.max_tool_rounds == 0 {
            return Err(ConfigError::Settings(
                "conversation.max_tool_rounds must be at least 1".into(),
            ));
        }
        if self.conversation.tool_timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "conversation.tool_timeout_seconds must be greater than 0".into(),
            ));
        }
        if !(1..=50).contains(&self.tools.search_max_results) {
            return Err(ConfigError::Settings(format!(
                "tools.search_max_results must be within 1..=50, got {}",
                self.tools.search_max_results
            )));
        }
        if self.tools.http_timeout_seconds == 0 || self.tools.compile_timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "tools timeouts must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Reads the model API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.model.api_key_env)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                env_var: self.model.api_key_env.clone(),
            })
    }
}
