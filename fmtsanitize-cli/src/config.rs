use std::path::Path;

use fmtsanitize::SanitizeConfig;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fmtsanitize.toml";

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<String>,
    pub target_name: Option<String>,
    pub keywords: Vec<String>,
    pub resource_dir: Option<String>,
}

/// Load the config file (explicit, or `fmtsanitize.toml` if present) and apply overrides.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<SanitizeConfig, String> {
    let mut config = match &overrides.config_path {
        Some(path) => SanitizeConfig::read_from(path)
            .map_err(|e| format!("Failed to load config {}: {}", path, e))?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            SanitizeConfig::read_from(DEFAULT_CONFIG_FILE)
                .map_err(|e| format!("Failed to load config {}: {}", DEFAULT_CONFIG_FILE, e))?
        }
        None => SanitizeConfig::default(),
    };

    if let Some(name) = &overrides.target_name {
        config = config.with_target_name(name.clone());
    }
    if !overrides.keywords.is_empty() {
        config = config.with_keywords(overrides.keywords.iter().cloned());
    }
    if let Some(dir) = &overrides.resource_dir {
        config = config.with_resource_dir(dir.clone());
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}
