use tracing::{debug, info, instrument, warn};

/// libpulse transport and completion signalling
pub mod backend;
/// Connection and listing pipeline state machine
pub mod connection;
/// Device and card domain
pub mod device;
/// Error types
pub mod error;
/// Registry of listed entities
pub mod registry;
/// Selector resolution
pub mod selection;
/// Client and playback stream domain
pub mod stream;
/// Volume control domain
pub mod volume;

pub use backend::{LinkState, OperationState, Pending, PulseTransport, Transport};
pub use connection::{ConnectionMachine, ConnectionState};
pub use device::{
    CardInfo, CardProfile, DeviceInfo, DeviceKind, DeviceState, VolumeControl, VolumeTarget,
};
pub use error::{EntityKind, PulseError};
pub use registry::{Registry, Snapshot};
pub use selection::{Selection, Selector, StreamSelector, resolve_profile};
pub use stream::{ClientInfo, SinkInputInfo};
pub use volume::{VOLUME_NORM, Volume, VolumeChange, VolumeDirective, VolumeError};

use crate::config::PulseConfig;

/// Outcome of applying one directive to several targets
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Targets whose change was confirmed or needed no change
    pub applied: Vec<VolumeTarget>,
    /// Targets that failed, with the reason
    pub failed: Vec<(VolumeTarget, PulseError)>,
}

impl BatchReport {
    /// Whether every target succeeded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of targets attempted
    pub fn attempted(&self) -> usize {
        self.applied.len() + self.failed.len()
    }
}

/// PulseAudio control service
///
/// Owns the transport, the connection machine and the registry it
/// populates. Every call blocks the current thread until the server
/// answered.
pub struct PulseManager<T: Transport = PulseTransport> {
    transport: T,
    machine: ConnectionMachine,
    registry: Registry,
}

impl PulseManager<PulseTransport> {
    /// Create a manager over the libpulse transport
    pub fn from_config(config: &PulseConfig) -> Self {
        Self::new(PulseTransport::new(config))
    }
}

impl<T: Transport> PulseManager<T> {
    /// Create an unconnected manager over any transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            machine: ConnectionMachine::new(),
            registry: Registry::new(),
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    /// Entities from the last completed listing
    ///
    /// Empty unless the state is [`ConnectionState::Linked`].
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Start connecting without waiting for the pipeline
    ///
    /// # Errors
    /// Returns `PulseError::AlreadyConnected` if linked or in flight, or
    /// the transport's error if the attempt cannot start
    pub fn begin_connect(&mut self) -> Result<(), PulseError> {
        self.machine.begin(&mut self.transport)?;
        self.registry.clear();
        Ok(())
    }

    /// Run one iteration of an in-flight connection attempt
    ///
    /// # Errors
    /// Returns the failure that ended the attempt
    pub fn poll_connect(&mut self) -> Result<ConnectionState, PulseError> {
        if let Some(registry) = self.machine.step(&mut self.transport)? {
            info!(
                sinks = registry.sinks().count(),
                sources = registry.sources().count(),
                clients = registry.clients().count(),
                streams = registry.sink_inputs().count(),
                cards = registry.cards().count(),
                "Connected to PulseAudio"
            );
            self.registry = registry;
        }
        Ok(self.state())
    }

    /// Connect and block until the registry is populated
    ///
    /// # Errors
    /// Returns `PulseError::AlreadyConnected`, `ConnectionFailed`,
    /// `SubmissionRejected` or `OperationFailed`
    #[instrument(skip(self))]
    pub fn connect(&mut self) -> Result<(), PulseError> {
        self.begin_connect()?;
        while self.poll_connect()? != ConnectionState::Linked {}
        Ok(())
    }

    /// Tear down the connection and drop the registry
    ///
    /// Safe to call in any state.
    pub fn disconnect(&mut self) {
        if self.state() != ConnectionState::Unconnected {
            debug!(state = %self.state(), "Disconnecting");
        }
        self.transport.disconnect();
        self.registry.clear();
        self.machine.reset();
    }

    fn ensure_linked(&self) -> Result<(), PulseError> {
        if self.state() == ConnectionState::Linked {
            Ok(())
        } else {
            Err(PulseError::NotConnected)
        }
    }

    fn control(&self, target: VolumeTarget) -> Result<&dyn VolumeControl, PulseError> {
        self.registry
            .volume_control(target)
            .ok_or_else(|| PulseError::not_found(target.entity(), format!("#{}", target.index())))
    }

    fn wait(&mut self, mut pending: Pending<()>) -> Result<(), PulseError> {
        loop {
            if let OperationState::Done(()) = pending.poll()? {
                return Ok(());
            }
            self.transport.iterate()?;
            if self.transport.link_state() == LinkState::Failed {
                return Err(PulseError::ConnectionFailed(format!(
                    "connection lost during {}",
                    pending.label()
                )));
            }
        }
    }

    /// Replace the whole volume vector of a target
    ///
    /// # Errors
    /// Returns `PulseError::NotConnected`, `NotFound`, `Volume` for a
    /// channel count mismatch, or the server's refusal
    #[instrument(skip(self, volume), fields(%target))]
    pub fn set_volume(&mut self, target: VolumeTarget, volume: Volume) -> Result<(), PulseError> {
        self.ensure_linked()?;
        let channels = self.control(target)?.volume().channels();
        if volume.channels() != channels {
            return Err(VolumeError::ChannelCountMismatch {
                expected: channels,
                actual: volume.channels(),
            }
            .into());
        }

        let pending = self.transport.set_volume(target, &volume)?;
        self.wait(pending)?;
        info!(levels = ?volume.as_slice(), "Volume changed");
        self.registry.replace_volume(target, volume);
        Ok(())
    }

    /// Set the mute flag of a target, leaving its volume alone
    ///
    /// # Errors
    /// Returns `PulseError::NotConnected`, `NotFound`, or the server's refusal
    #[instrument(skip(self), fields(%target))]
    pub fn set_mute(&mut self, target: VolumeTarget, muted: bool) -> Result<(), PulseError> {
        self.ensure_linked()?;
        self.control(target)?;

        let pending = self.transport.set_mute(target, muted)?;
        self.wait(pending)?;
        info!(muted, "Mute changed");
        self.registry.replace_mute(target, muted);
        Ok(())
    }

    /// Apply a directive to a target's current state
    ///
    /// `channels` limits a volume change to the listed channels.
    /// Out-of-range channels are logged and skipped. An unchanged volume
    /// is not submitted.
    ///
    /// # Errors
    /// Returns the error of the underlying set operation
    pub fn apply_volume(
        &mut self,
        target: VolumeTarget,
        directive: &VolumeDirective,
        channels: Option<&[usize]>,
    ) -> Result<(), PulseError> {
        let change = match directive {
            VolumeDirective::Mute(muted) => return self.set_mute(target, *muted),
            VolumeDirective::Change(change) => change,
        };

        self.ensure_linked()?;
        let current = self.control(target)?.volume();
        let mut volume = current.clone();
        change.apply_to_channels(&mut volume, channels);

        if &volume == current {
            debug!(%target, %directive, "Volume unchanged, nothing to submit");
            return Ok(());
        }
        self.set_volume(target, volume)
    }

    /// Apply one directive to every target, continuing past failures
    pub fn apply_volume_batch(
        &mut self,
        targets: &[VolumeTarget],
        directive: &VolumeDirective,
        channels: Option<&[usize]>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for &target in targets {
            match self.apply_volume(target, directive, channels) {
                Ok(()) => report.applied.push(target),
                Err(e) => {
                    warn!(%target, error = %e, "Volume change failed");
                    report.failed.push((target, e));
                }
            }
        }
        report
    }

    /// Activate a card profile chosen by index or name substring
    ///
    /// Returns the name of the activated profile.
    ///
    /// # Errors
    /// Returns `PulseError::NotConnected`, `NotFound` for an unknown card,
    /// `InvalidParameter` for an unmatched profile, or the server's refusal
    #[instrument(skip(self))]
    pub fn set_card_profile(&mut self, card: u32, profile: &str) -> Result<String, PulseError> {
        self.ensure_linked()?;
        let card_info = self
            .registry
            .card(card)
            .ok_or_else(|| PulseError::not_found(EntityKind::Card, format!("#{card}")))?;
        let (position, resolved) = resolve_profile(card_info, profile)?;
        let name = resolved.name.clone();

        let pending = self.transport.set_card_profile(card, &name)?;
        self.wait(pending)?;
        info!(card, profile = %name, "Card profile changed");
        self.registry.replace_active_profile(card, position);
        Ok(name)
    }
}

#[cfg(test)]
pub(crate) mod tests;
