use std::fmt;

use super::{DeviceInfo, DeviceKind};
use crate::services::pulse::{error::EntityKind, stream::SinkInputInfo, volume::Volume};

/// Addresses any entity that carries a volume and a mute flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeTarget {
    /// Output device
    Sink(u32),
    /// Input device
    Source(u32),
    /// Playback stream
    SinkInput(u32),
}

impl VolumeTarget {
    /// Target for a device of the given kind
    pub fn device(kind: DeviceKind, index: u32) -> Self {
        match kind {
            DeviceKind::Sink => Self::Sink(index),
            DeviceKind::Source => Self::Source(index),
        }
    }

    /// Identifier of the target
    pub fn index(&self) -> u32 {
        match *self {
            Self::Sink(index) | Self::Source(index) | Self::SinkInput(index) => index,
        }
    }

    /// Entity kind reported in lookup errors
    pub fn entity(&self) -> EntityKind {
        match self {
            Self::Sink(_) => EntityKind::Sink,
            Self::Source(_) => EntityKind::Source,
            Self::SinkInput(_) => EntityKind::Stream,
        }
    }
}

impl fmt::Display for VolumeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity(), self.index())
    }
}

/// Volume-bearing entity
///
/// Implemented by sinks, sources and playback streams so volume changes
/// have a single code path regardless of kind.
pub trait VolumeControl {
    /// Current per-channel volume
    fn volume(&self) -> &Volume;
}

impl VolumeControl for DeviceInfo {
    fn volume(&self) -> &Volume {
        &self.volume
    }
}

impl VolumeControl for SinkInputInfo {
    fn volume(&self) -> &Volume {
        &self.volume
    }
}
