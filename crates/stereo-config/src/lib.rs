mod types;

pub use types::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Returns the per-user config directory, creating it if needed.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?
        .join("stereoscope");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from disk, falling back to defaults if no file exists.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path()?;
    if !path.exists() {
        info!("no config file, using defaults");
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&contents)?;
    info!(?path, "config loaded");
    Ok(config)
}

/// Persist config to disk (called on exit so tweaked focus settings survive).
pub fn save_config(config: &AppConfig) -> Result<()> {
    let path = config_path()?;
    std::fs::write(&path, toml::to_string_pretty(config)?)?;
    info!(?path, "config saved");
    Ok(())
}
