use std::fmt;

use serde::Serialize;

use crate::services::pulse::{error::EntityKind, volume::Volume};

/// Device kind enumeration
///
/// Sinks and sources share one data model. The kind supplies the
/// vocabulary that differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Audio output device (speakers, headphones)
    Sink,
    /// Audio input device (microphone, line-in, monitor)
    Source,
}

impl DeviceKind {
    /// Singular label used in listings and errors
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sink => "sink",
            Self::Source => "source",
        }
    }

    /// Plural label used as a listing header
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Sink => "sinks",
            Self::Source => "sources",
        }
    }

    /// Entity kind reported in lookup errors
    pub fn entity(&self) -> EntityKind {
        match self {
            Self::Sink => EntityKind::Sink,
            Self::Source => EntityKind::Source,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Device lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    /// Device is being created
    Init,
    /// Device is open but nothing is playing or recording
    Idle,
    /// Device is actively in use
    Running,
    /// Device is suspended
    Suspended,
    /// Device is being removed
    Unlinked,
    /// Server reported a state outside the known vocabulary
    Unknown,
}

impl DeviceState {
    /// Lowercase state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Suspended => "suspended",
            Self::Unlinked => "unlinked",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the device is actively in use
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete device information for a sink or source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    /// Device index
    pub index: u32,
    /// Sink or source
    pub kind: DeviceKind,
    /// Device name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Driver name
    pub driver: String,
    /// Owning card, if any
    pub card: Option<u32>,
    /// Per-channel volume
    pub volume: Volume,
    /// Hardware base volume
    pub base_volume: u32,
    /// Number of hardware volume steps
    pub n_volume_steps: u32,
    /// Whether device is muted
    pub muted: bool,
    /// Device state
    pub state: DeviceState,
    /// Monitor source of a sink, or the sink a monitor source belongs to
    pub monitor_index: Option<u32>,
    /// Name of the monitor counterpart
    pub monitor_name: Option<String>,
}

impl DeviceInfo {
    /// Create a device with the given identity and volume state
    ///
    /// Remaining fields start empty and can be filled in directly.
    pub fn new(index: u32, kind: DeviceKind, name: impl Into<String>, volume: Volume) -> Self {
        Self {
            index,
            kind,
            name: name.into(),
            description: String::new(),
            driver: String::new(),
            card: None,
            volume,
            base_volume: 0,
            n_volume_steps: 0,
            muted: false,
            state: DeviceState::Unknown,
            monitor_index: None,
            monitor_name: None,
        }
    }
}
