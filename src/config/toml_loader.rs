//! TOML settings file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Load a TOML file into `T`.
///
/// A missing file deserializes from an empty document, so every field of
/// `T` must have a default.
///
/// # Errors
///
/// Returns [`ConfigError::SettingsParse`] if the file exists but cannot be
/// read or is not valid TOML for `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let parse_err = |message: String| ConfigError::SettingsParse {
        path: path.display().to_string(),
        message,
    };

    if !path.exists() {
        return toml::from_str("").map_err(|e| parse_err(e.to_string()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| parse_err(e.to_string()))?;
    toml::from_str(&content).map_err(|e| parse_err(e.to_string()))
}
