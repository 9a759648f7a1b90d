// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{EngineConfig, RawEngineConfig};
use crate::errors::Result;

/// Load a configuration file and return the raw `RawEngineConfig`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for a
/// checked [`EngineConfig`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawEngineConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawEngineConfig = toml::from_str(&contents)?;
    debug!(path = %path.display(), "loaded engine config");

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let raw_config = load_from_path(&path)?;
    let config = EngineConfig::try_from(raw_config)?;
    Ok(config)
}

/// Parse and validate configuration held in memory.
pub fn from_toml_str(contents: &str) -> Result<EngineConfig> {
    let raw: RawEngineConfig = toml::from_str(contents)?;
    EngineConfig::try_from(raw)
}

/// Conventional config file name, relative to the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Tasktree.toml")
}
