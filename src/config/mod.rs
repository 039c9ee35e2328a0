//! Configuration schema definitions and loading.
//!
//! Defines the optional TOML configuration for pavolctl: general settings,
//! PulseAudio connection settings and output preferences. Every section
//! and field has a default, so an empty or missing file is valid.

mod error;
mod general;
mod loading;
mod output;
mod paths;
mod pulse;

pub use error::ConfigError;
pub use general::{GeneralConfig, LogLevel};
pub use output::{OutputConfig, OutputFormat};
pub use paths::ConfigPaths;
pub use pulse::PulseConfig;

use serde::{Deserialize, Serialize};

/// Main configuration structure for pavolctl.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// PulseAudio connection settings.
    #[serde(default)]
    pub pulse: PulseConfig,

    /// Output preferences.
    #[serde(default)]
    pub output: OutputConfig,
}
