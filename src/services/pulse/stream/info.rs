use serde::Serialize;

use crate::services::pulse::volume::Volume;

/// A connected client application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    /// Client index
    pub index: u32,
    /// Client (application) name
    pub name: String,
    /// Driver name
    pub driver: String,
}

impl ClientInfo {
    /// Create a client
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            driver: String::new(),
        }
    }
}

/// Playback stream routed to a sink
///
/// `owner_client` and `owner_sink` are the identifiers reported by the
/// server. `client` and `sink` are set by the registry's linking pass and
/// only ever name entries present in the same registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkInputInfo {
    /// Stream index
    pub index: u32,
    /// Stream name
    pub name: String,
    /// Driver name
    pub driver: String,
    /// Per-channel volume
    pub volume: Volume,
    /// Whether stream is muted
    pub muted: bool,
    /// Whether stream is paused
    pub corked: bool,
    /// Owning client as reported by the server
    #[serde(skip)]
    pub owner_client: Option<u32>,
    /// Target sink as reported by the server
    #[serde(skip)]
    pub owner_sink: Option<u32>,
    /// Linked owning client
    pub client: Option<u32>,
    /// Linked target sink
    pub sink: Option<u32>,
}

impl SinkInputInfo {
    /// Create an unlinked, playing stream
    pub fn new(
        index: u32,
        name: impl Into<String>,
        volume: Volume,
        owner_client: Option<u32>,
        owner_sink: Option<u32>,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            driver: String::new(),
            volume,
            muted: false,
            corked: false,
            owner_client,
            owner_sink,
            client: None,
            sink: None,
        }
    }

    /// Whether the stream is actively playing
    pub fn is_playing(&self) -> bool {
        !self.corked
    }
}
