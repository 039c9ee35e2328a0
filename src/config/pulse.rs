use serde::{Deserialize, Serialize};

/// PulseAudio connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Client name announced to the server.
    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Server address, the libpulse default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

fn default_application_name() -> String {
    "pavolctl".to_string()
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            application_name: default_application_name(),
            server: None,
        }
    }
}
