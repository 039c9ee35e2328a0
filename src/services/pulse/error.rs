use std::fmt;

use super::VolumeError;

/// Kind of registry entity named in lookup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Output device
    Sink,
    /// Input device
    Source,
    /// Sound card
    Card,
    /// Client application
    Client,
    /// Card profile
    Profile,
    /// Playback stream
    Stream,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Sink => "sink",
            Self::Source => "source",
            Self::Card => "card",
            Self::Client => "client",
            Self::Profile => "profile",
            Self::Stream => "playback stream",
        };
        f.write_str(label)
    }
}

/// PulseAudio service errors
#[derive(thiserror::Error, Debug)]
pub enum PulseError {
    /// Server never reached the ready state, or the connection was lost
    #[error("PulseAudio connection failed: {0}")]
    ConnectionFailed(String),

    /// Server refused to accept a request
    #[error("PulseAudio rejected the {0} request")]
    SubmissionRejected(String),

    /// Accepted request completed unsuccessfully
    #[error("PulseAudio operation failed: {0}")]
    OperationFailed(String),

    /// Selector matched nothing
    #[error("{entity} {selector} not found")]
    NotFound {
        /// Kind of entity searched for
        entity: EntityKind,
        /// The selector as given by the user
        selector: String,
    },

    /// Malformed or out-of-range argument
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Volume directive or conversion failed
    #[error(transparent)]
    Volume(#[from] VolumeError),

    /// Connect requested while a connection is active
    #[error("Already connected to PulseAudio, disconnect first")]
    AlreadyConnected,

    /// Operation requires a linked connection
    #[error("Not connected to PulseAudio")]
    NotConnected,
}

impl PulseError {
    /// Shorthand for a [`PulseError::NotFound`]
    pub fn not_found(entity: EntityKind, selector: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            selector: selector.to_string(),
        }
    }
}
