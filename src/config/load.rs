use super::{ConfigError, Settings};
use crate::runtime::StatePaths;

/// Loads `<state_root>/config.yaml`, falling back to defaults when the file
/// does not exist, then applies environment overrides and validates.
pub fn load_settings(paths: &StatePaths) -> Result<Settings, ConfigError> {
    let path = paths.settings_file();
    let mut settings = if path.exists() {
        Settings::from_path(&path)?
    } else {
        Settings::default()
    };
    settings.apply_env_overrides();
    settings.validate()?;
    Ok(settings)
}
