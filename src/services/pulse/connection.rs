use std::fmt;

use tracing::debug;

use super::{
    backend::{LinkState, OperationState, Pending, PendingList, Transport},
    device::{CardInfo, DeviceInfo},
    error::PulseError,
    registry::{Registry, Snapshot},
    stream::{ClientInfo, SinkInputInfo},
};

/// Observable connection state
///
/// Listing stages always run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection attempt made, or torn down
    Unconnected,
    /// Waiting for the server to become ready
    Connecting,
    /// Waiting for the sink list
    ListingSinks,
    /// Waiting for the source list
    ListingSources,
    /// Waiting for the client list
    ListingClients,
    /// Waiting for the playback stream list
    ListingSinkInputs,
    /// Waiting for the card list
    ListingCards,
    /// Registry populated and linked
    Linked,
    /// Connection or listing failed
    Failed,
}

impl ConnectionState {
    /// Lowercase state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconnected => "unconnected",
            Self::Connecting => "connecting",
            Self::ListingSinks => "listing sinks",
            Self::ListingSources => "listing sources",
            Self::ListingClients => "listing clients",
            Self::ListingSinkInputs => "listing playback streams",
            Self::ListingCards => "listing cards",
            Self::Linked => "linked",
            Self::Failed => "failed",
        }
    }

    /// Whether a connection attempt is in flight
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, Self::Unconnected | Self::Linked | Self::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine state, carrying the in-flight request of each listing stage
#[derive(Debug)]
pub(crate) enum Phase {
    Unconnected,
    Connecting,
    ListingSinks(PendingList<DeviceInfo>),
    ListingSources(PendingList<DeviceInfo>),
    ListingClients(PendingList<ClientInfo>),
    ListingSinkInputs(PendingList<SinkInputInfo>),
    ListingCards(PendingList<CardInfo>),
    Linked,
    Failed,
}

impl Phase {
    fn state(&self) -> ConnectionState {
        match self {
            Self::Unconnected => ConnectionState::Unconnected,
            Self::Connecting => ConnectionState::Connecting,
            Self::ListingSinks(_) => ConnectionState::ListingSinks,
            Self::ListingSources(_) => ConnectionState::ListingSources,
            Self::ListingClients(_) => ConnectionState::ListingClients,
            Self::ListingSinkInputs(_) => ConnectionState::ListingSinkInputs,
            Self::ListingCards(_) => ConnectionState::ListingCards,
            Self::Linked => ConnectionState::Linked,
            Self::Failed => ConnectionState::Failed,
        }
    }
}

/// Drives a transport from connect through the listing pipeline
///
/// Each listing stage is submitted only after the previous one completed.
/// Partial results are staged and only become a [`Registry`] once every
/// stage succeeded.
#[derive(Debug)]
pub struct ConnectionMachine {
    phase: Phase,
    staged: Snapshot,
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMachine {
    /// Create an unconnected machine
    pub fn new() -> Self {
        Self {
            phase: Phase::Unconnected,
            staged: Snapshot::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.phase.state()
    }

    /// Start a connection attempt
    ///
    /// A failed machine is torn down first and retried.
    ///
    /// # Errors
    /// Returns `PulseError::AlreadyConnected` if linked or in flight, or
    /// the transport's error if the attempt cannot start
    pub fn begin<T: Transport>(&mut self, transport: &mut T) -> Result<(), PulseError> {
        match self.state() {
            ConnectionState::Unconnected => {}
            ConnectionState::Failed => {
                debug!("Tearing down failed connection before retry");
                transport.disconnect();
                self.reset();
            }
            _ => return Err(PulseError::AlreadyConnected),
        }

        if let Err(e) = transport.connect() {
            self.fail(ConnectionState::Unconnected, &e);
            return Err(e);
        }
        self.transition(ConnectionState::Unconnected, Phase::Connecting);
        Ok(())
    }

    /// Run one loop iteration and advance at most one stage
    ///
    /// Returns the completed registry when the final stage finishes.
    ///
    /// # Errors
    /// Returns `PulseError::NotConnected` if no attempt is in flight, or
    /// the failure that moved the machine to [`ConnectionState::Failed`]
    pub fn step<T: Transport>(&mut self, transport: &mut T) -> Result<Option<Registry>, PulseError> {
        match self.state() {
            ConnectionState::Unconnected | ConnectionState::Failed => {
                return Err(PulseError::NotConnected);
            }
            ConnectionState::Linked => return Ok(None),
            _ => {}
        }

        let from = self.state();
        match self.advance(from, transport) {
            Ok(registry) => Ok(registry),
            Err(e) => {
                self.fail(from, &e);
                Err(e)
            }
        }
    }

    /// Return to the unconnected state, discarding staged results
    pub fn reset(&mut self) {
        self.phase = Phase::Unconnected;
        self.staged = Snapshot::default();
    }

    fn advance<T: Transport>(
        &mut self,
        from: ConnectionState,
        transport: &mut T,
    ) -> Result<Option<Registry>, PulseError> {
        transport.iterate()?;
        let link = transport.link_state();

        let phase = std::mem::replace(&mut self.phase, Phase::Failed);
        if link == LinkState::Failed {
            let message = match phase {
                Phase::Connecting => "server refused the connection".to_string(),
                other => format!("connection lost while {}", other.state()),
            };
            return Err(PulseError::ConnectionFailed(message));
        }

        let next = match phase {
            Phase::Connecting if link == LinkState::Ready => {
                Phase::ListingSinks(transport.list_sinks()?)
            }
            Phase::ListingSinks(mut pending) => match poll_stage(&mut pending)? {
                None => Phase::ListingSinks(pending),
                Some(sinks) => {
                    self.staged.sinks = sinks;
                    Phase::ListingSources(transport.list_sources()?)
                }
            },
            Phase::ListingSources(mut pending) => match poll_stage(&mut pending)? {
                None => Phase::ListingSources(pending),
                Some(sources) => {
                    self.staged.sources = sources;
                    Phase::ListingClients(transport.list_clients()?)
                }
            },
            Phase::ListingClients(mut pending) => match poll_stage(&mut pending)? {
                None => Phase::ListingClients(pending),
                Some(clients) => {
                    self.staged.clients = clients;
                    Phase::ListingSinkInputs(transport.list_sink_inputs()?)
                }
            },
            Phase::ListingSinkInputs(mut pending) => match poll_stage(&mut pending)? {
                None => Phase::ListingSinkInputs(pending),
                Some(sink_inputs) => {
                    self.staged.sink_inputs = sink_inputs;
                    Phase::ListingCards(transport.list_cards()?)
                }
            },
            Phase::ListingCards(mut pending) => match poll_stage(&mut pending)? {
                None => Phase::ListingCards(pending),
                Some(cards) => {
                    self.staged.cards = cards;
                    let registry = Registry::from_snapshot(std::mem::take(&mut self.staged));
                    self.transition(from, Phase::Linked);
                    return Ok(Some(registry));
                }
            },
            other => other,
        };

        self.transition(from, next);
        Ok(None)
    }

    fn transition(&mut self, from: ConnectionState, next: Phase) {
        let to = next.state();
        if from != to {
            debug!(%from, %to, "Connection state changed");
        }
        self.phase = next;
    }

    fn fail(&mut self, from: ConnectionState, error: &PulseError) {
        debug!(%from, %error, "Connection attempt failed");
        self.phase = Phase::Failed;
        self.staged = Snapshot::default();
    }
}

fn poll_stage<T>(pending: &mut Pending<T>) -> Result<Option<T>, PulseError> {
    match pending.poll()? {
        OperationState::Running => Ok(None),
        OperationState::Done(value) => Ok(Some(value)),
    }
}
