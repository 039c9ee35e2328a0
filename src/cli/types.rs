use thiserror::Error;

use crate::{config::ConfigError, services::PulseError};

/// Errors that can occur while running a pavolctl invocation.
///
/// Each variant maps to exit status 1. Selector and parameter errors
/// additionally print the usage line, see [`CliError::is_usage_error`].
#[derive(Error, Debug)]
pub enum CliError {
    /// The PulseAudio service refused or failed the request.
    ///
    /// Covers connection failures as well as selectors that matched
    /// nothing and malformed volume or profile arguments.
    #[error(transparent)]
    Pulse(#[from] PulseError),

    /// The configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Some changes of a multi-target command failed.
    ///
    /// The remaining targets were still changed. `output` holds whatever
    /// was rendered before the failures, so it can still be printed.
    #[error("{failed} of {attempted} changes failed")]
    PartialFailure {
        /// Number of failed targets
        failed: usize,
        /// Number of targets attempted
        attempted: usize,
        /// Output rendered before the failure
        output: String,
    },

    /// A JSON listing could not be serialised.
    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl CliError {
    /// Whether the error stems from user input and deserves a usage line
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::Pulse(
                PulseError::NotFound { .. }
                    | PulseError::InvalidParameter(_)
                    | PulseError::Volume(_)
            )
        )
    }
}

/// Type alias for command execution results.
///
/// A successful run yields the text to print on stdout, which may be
/// empty when only changes were requested.
pub type CommandResult = Result<String, CliError>;
