use std::{fs, path::Path};

use tracing::debug;

use super::{Config, ConfigError, ConfigPaths};

impl Config {
    /// Loads a configuration file that must exist
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The TOML content is invalid
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(e, path))?;
        let config = Self::from_toml_str(&content, Some(path))?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses configuration from TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::TomlParseError` if the content is invalid
    pub fn from_toml_str(content: &str, path: Option<&Path>) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::toml_parse(e, path))
    }

    /// Loads the configuration from the default location
    ///
    /// A missing file, or an environment without a config directory,
    /// yields the defaults.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_default() -> Result<Config, ConfigError> {
        let path = match ConfigPaths::main_config() {
            Ok(path) => path,
            Err(e) => {
                debug!(error = %e, "No config directory, using defaults");
                return Ok(Config::default());
            }
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        Self::load(&path)
    }

    /// Loads an explicit configuration file, or the default location
    ///
    /// # Errors
    /// Returns an error if an explicit file is missing, or any existing file
    /// cannot be read or parsed
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        }
    }
}
