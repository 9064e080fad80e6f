use crate::models::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let projdash_dir = config_dir.join(".projdash");
    std::fs::create_dir_all(&projdash_dir)?;

    Ok(projdash_dir)
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Where the dashboard persists its query string between runs.
pub fn get_location_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("location"))
}

pub fn get_log_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("dashboard.log"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()?)
}

/// Loads the config at `config_path`, writing defaults there on first use.
pub fn load_config_from(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!(
                "Failed to parse config file: {}. Please check the file format.",
                e
            )
        })?;

        config.validate()?;
        Ok(config)
    } else {
        let default_config = Config::default();
        save_config_to(&default_config, config_path)?;
        Ok(default_config)
    }
}

pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &get_config_path()?)
}

pub fn save_config_to(config: &Config, config_path: &Path) -> Result<()> {
    config.validate()?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut contents = toml::to_string_pretty(config)?;

    // Drop the empty [custom_settings] table toml always emits
    if config.custom_settings.is_empty() {
        contents = contents.replace("[custom_settings]\n", "");
        contents = contents.replace("\n[custom_settings]", "");
        contents = contents.replace("\n\n\n", "\n\n");
    }

    std::fs::write(config_path, contents.trim_end().to_string() + "\n")?;

    Ok(())
}
