pub mod error;
pub mod load;
pub mod settings;

pub use error::ConfigError;
pub use load::load_settings;
pub use settings::{
    ConversationSettings, ModelSettings, OutputSettings, Settings, ToolSettings,
    DEFAULT_THREAD_ID, MODEL_ENV,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::StatePaths;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn partial_yaml_keeps_defaults_for_missing_sections() {
        let settings: Settings = serde_yaml::from_str(
            r#"
conversation:
  tool_timeout_seconds: 30
output:
  dir: /tmp/papers
"#,
        )
        .expect("parse settings");

        assert_eq!(settings.conversation.tool_timeout_seconds, 30);
        assert_eq!(settings.conversation.max_tool_rounds, 1);
        assert_eq!(settings.conversation.default_thread_id, DEFAULT_THREAD_ID);
        assert_eq!(settings.output.dir, PathBuf::from("/tmp/papers"));
        assert_eq!(settings.tools.search_max_results, 5);
        assert_eq!(settings.model.max_output_tokens, 8000);
        settings.validate().expect("valid");
    }

    #[test]
    fn validation_rejects_zero_tool_rounds_and_bad_temperature() {
        let mut settings = Settings::default();
        settings.conversation.max_tool_rounds = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.model.temperature = 3.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.tools.search_max_results = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn load_settings_reads_file_and_applies_model_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        let dir = tempdir().expect("tempdir");
        let paths = StatePaths::new(dir.path());
        fs::write(
            paths.settings_file(),
            "model:\n  model: gemini-from-file\ntools:\n  search_max_results: 3\n",
        )
        .expect("write settings");

        std::env::remove_var(MODEL_ENV);
        let settings = load_settings(&paths).expect("load");
        assert_eq!(settings.model.model, "gemini-from-file");
        assert_eq!(settings.tools.search_max_results, 3);

        std::env::set_var(MODEL_ENV, "gemini-from-env");
        let settings = load_settings(&paths).expect("load with override");
        std::env::remove_var(MODEL_ENV);
        assert_eq!(settings.model.model, "gemini-from-env");
    }

    #[test]
    fn missing_settings_file_yields_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        std::env::remove_var(MODEL_ENV);
        let dir = tempdir().expect("tempdir");
        let settings = load_settings(&StatePaths::new(dir.path())).expect("load");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn api_key_comes_from_configured_env_var() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|err| err.into_inner());
        let mut settings = Settings::default();
        settings.model.api_key_env = "RESEARCH_GENIE_TEST_KEY".to_string();

        std::env::remove_var("RESEARCH_GENIE_TEST_KEY");
        assert!(matches!(
            settings.resolve_api_key(),
            Err(ConfigError::MissingApiKey { .. })
        ));

        std::env::set_var("RESEARCH_GENIE_TEST_KEY", " secret ");
        assert_eq!(settings.resolve_api_key().expect("key"), "secret");
        std::env::remove_var("RESEARCH_GENIE_TEST_KEY");
    }
}
