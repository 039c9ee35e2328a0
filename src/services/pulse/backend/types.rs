use super::operation::Pending;
use crate::services::pulse::{
    device::{CardInfo, DeviceInfo, VolumeTarget},
    error::PulseError,
    stream::{ClientInfo, SinkInputInfo},
    volume::Volume,
};

/// Server link state as observed by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Connecting, authorizing or setting the client name
    Pending,
    /// Ready for requests
    Ready,
    /// Failed or terminated
    Failed,
}

/// Pending listing result
pub type PendingList<T> = Pending<Vec<T>>;

/// Message-passing seam between the connection logic and the server
///
/// Every request returns immediately with a [`Pending`] handle. Results
/// arrive only while [`Transport::iterate`] runs, so callers drive the
/// transport until the handle reports completion.
pub trait Transport {
    /// Start connecting to the server
    ///
    /// # Errors
    /// Returns `PulseError::ConnectionFailed` if the attempt cannot start
    fn connect(&mut self) -> Result<(), PulseError>;

    /// Run one blocking dispatch round, delivering pending callbacks
    ///
    /// # Errors
    /// Returns `PulseError::ConnectionFailed` if the event loop stopped
    fn iterate(&mut self) -> Result<(), PulseError>;

    /// Current link state
    fn link_state(&self) -> LinkState;

    /// Request every sink
    ///
    /// # Errors
    /// Returns `PulseError::SubmissionRejected` if the server refused
    fn list_sinks(&mut self) -> Result<PendingList<DeviceInfo>, PulseError>;

    /// Request every source
    ///
    /// # Errors
    /// Returns `PulseError::SubmissionRejected` if the server refused
    fn list_sources(&mut self) -> Result<PendingList<DeviceInfo>, PulseError>;

    /// Request every client
    ///
    /// # Errors
    /// Returns `PulseError::SubmissionRejected` if the server refused
    fn list_clients(&mut self) -> Result<PendingList<ClientInfo>, PulseError>;

    /// Request every playback stream
    ///
    /// # Errors
    /// Returns `PulseError::SubmissionRejected` if the server refused
    fn list_sink_inputs(&mut self) -> Result<PendingList<SinkInputInfo>, PulseError>;

    /// Request every card
    ///
    /// # Errors
    /// Returns `PulseError::SubmissionRejected` if the server refused
    fn list_cards(&mut self) -> Result<PendingList<CardInfo>, PulseError>;

    /// Submit a per-channel volume for a target
    ///
    /// # Errors
    /// Returns `PulseError::SubmissionRejected` if the server refused, or
    /// `PulseError::Volume` if the volume cannot be expressed on the wire
    fn set_volume(&mut self, target: VolumeTarget, volume: &Volume)
    -> Result<Pending<()>, PulseError>;

    /// Submit a mute flag for a target
    ///
    /// # Errors
    /// Returns `PulseError::SubmissionRejected` if the server refused
    fn set_mute(&mut self, target: VolumeTarget, muted: bool) -> Result<Pending<()>, PulseError>;

    /// Submit a profile change for a card
    ///
    /// # Errors
    /// Returns `PulseError::SubmissionRejected` if the server refused
    fn set_card_profile(&mut self, card: u32, profile: &str) -> Result<Pending<()>, PulseError>;

    /// Tear the connection down, safe to call when not connected
    fn disconnect(&mut self);
}
