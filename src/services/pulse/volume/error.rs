/// Volume-related errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VolumeError {
    /// Directive matches none of the accepted forms
    #[error("Invalid volume format '{0}' (expected N, N%, +N, -N, *N, /N, mute or unmute)")]
    InvalidFormat(String),

    /// Replacement volume does not have the target's channel count
    #[error("Expected {expected} channels, got {actual}")]
    ChannelCountMismatch {
        /// Channel count of the target
        expected: usize,
        /// Channel count of the replacement
        actual: usize,
    },

    /// Channel count outside what the protocol can carry
    #[error("Unsupported channel count {channels} (at most {max})")]
    UnsupportedChannelCount {
        /// Channel count of the volume
        channels: usize,
        /// Largest count the protocol allows
        max: usize,
    },
}
