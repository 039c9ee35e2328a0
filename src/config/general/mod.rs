mod log_level;

pub use log_level::LogLevel;
use serde::{Deserialize, Serialize};

/// General configuration settings.
///
/// Contains global settings that affect the overall behavior of the application,
/// such as logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    /// Logging level used when neither `RUST_LOG` nor `-v` is given.
    #[serde(default)]
    pub log_level: LogLevel,
}
