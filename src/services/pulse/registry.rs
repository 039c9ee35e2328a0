use std::collections::BTreeMap;

use super::{
    device::{CardInfo, DeviceInfo, DeviceKind, DeviceState, VolumeControl, VolumeTarget},
    stream::{ClientInfo, SinkInputInfo},
    volume::Volume,
};

/// Raw results of one listing pipeline, before linking
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Listed sinks
    pub sinks: Vec<DeviceInfo>,
    /// Listed sources
    pub sources: Vec<DeviceInfo>,
    /// Listed clients
    pub clients: Vec<ClientInfo>,
    /// Listed playback streams
    pub sink_inputs: Vec<SinkInputInfo>,
    /// Listed cards
    pub cards: Vec<CardInfo>,
}

/// Every entity known from the last full listing
///
/// Built in one piece from a [`Snapshot`] and dropped in one piece on
/// disconnect. Entities are keyed by server index.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    sinks: BTreeMap<u32, DeviceInfo>,
    sources: BTreeMap<u32, DeviceInfo>,
    clients: BTreeMap<u32, ClientInfo>,
    sink_inputs: BTreeMap<u32, SinkInputInfo>,
    cards: BTreeMap<u32, CardInfo>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a complete snapshot and link playback
    /// streams to their clients and sinks
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let Snapshot {
            sinks,
            sources,
            clients,
            sink_inputs,
            cards,
        } = snapshot;

        let mut registry = Self {
            sinks: sinks.into_iter().map(|d| (d.index, d)).collect(),
            sources: sources.into_iter().map(|d| (d.index, d)).collect(),
            clients: clients.into_iter().map(|c| (c.index, c)).collect(),
            sink_inputs: sink_inputs.into_iter().map(|s| (s.index, s)).collect(),
            cards: cards.into_iter().map(|c| (c.index, c)).collect(),
        };
        registry.link_sink_inputs();
        registry
    }

    fn link_sink_inputs(&mut self) {
        for sink_input in self.sink_inputs.values_mut() {
            sink_input.client = sink_input
                .owner_client
                .filter(|index| self.clients.contains_key(index));
            sink_input.sink = sink_input
                .owner_sink
                .filter(|index| self.sinks.contains_key(index));
        }
    }

    /// Drop every entity
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Devices of one kind, ordered by index
    pub fn devices(&self, kind: DeviceKind) -> impl Iterator<Item = &DeviceInfo> {
        self.device_map(kind).values()
    }

    /// Device of one kind by index
    pub fn device(&self, kind: DeviceKind, index: u32) -> Option<&DeviceInfo> {
        self.device_map(kind).get(&index)
    }

    fn device_map(&self, kind: DeviceKind) -> &BTreeMap<u32, DeviceInfo> {
        match kind {
            DeviceKind::Sink => &self.sinks,
            DeviceKind::Source => &self.sources,
        }
    }

    fn device_map_mut(&mut self, kind: DeviceKind) -> &mut BTreeMap<u32, DeviceInfo> {
        match kind {
            DeviceKind::Sink => &mut self.sinks,
            DeviceKind::Source => &mut self.sources,
        }
    }

    /// All sinks
    pub fn sinks(&self) -> impl Iterator<Item = &DeviceInfo> {
        self.sinks.values()
    }

    /// Sink by index
    pub fn sink(&self, index: u32) -> Option<&DeviceInfo> {
        self.sinks.get(&index)
    }

    /// All sources
    pub fn sources(&self) -> impl Iterator<Item = &DeviceInfo> {
        self.sources.values()
    }

    /// Source by index
    pub fn source(&self, index: u32) -> Option<&DeviceInfo> {
        self.sources.get(&index)
    }

    /// All clients
    pub fn clients(&self) -> impl Iterator<Item = &ClientInfo> {
        self.clients.values()
    }

    /// Client by index
    pub fn client(&self, index: u32) -> Option<&ClientInfo> {
        self.clients.get(&index)
    }

    /// All playback streams
    pub fn sink_inputs(&self) -> impl Iterator<Item = &SinkInputInfo> {
        self.sink_inputs.values()
    }

    /// Playback stream by index
    pub fn sink_input(&self, index: u32) -> Option<&SinkInputInfo> {
        self.sink_inputs.get(&index)
    }

    /// All cards
    pub fn cards(&self) -> impl Iterator<Item = &CardInfo> {
        self.cards.values()
    }

    /// Card by index
    pub fn card(&self, index: u32) -> Option<&CardInfo> {
        self.cards.get(&index)
    }

    /// Linked client of a playback stream
    pub fn sink_input_client(&self, sink_input: &SinkInputInfo) -> Option<&ClientInfo> {
        sink_input.client.and_then(|index| self.client(index))
    }

    /// Linked sink of a playback stream
    pub fn sink_input_sink(&self, sink_input: &SinkInputInfo) -> Option<&DeviceInfo> {
        sink_input.sink.and_then(|index| self.sink(index))
    }

    /// Devices belonging to a card
    pub fn card_devices(&self, card: u32) -> impl Iterator<Item = &DeviceInfo> {
        self.sinks
            .values()
            .chain(self.sources.values())
            .filter(move |device| device.card == Some(card))
    }

    /// Derived card state: running if any of its devices is running,
    /// otherwise idle if it has any device, otherwise suspended
    pub fn card_state(&self, card: u32) -> DeviceState {
        let mut has_devices = false;
        for device in self.card_devices(card) {
            if device.state.is_running() {
                return DeviceState::Running;
            }
            has_devices = true;
        }
        if has_devices {
            DeviceState::Idle
        } else {
            DeviceState::Suspended
        }
    }

    /// Volume-bearing entity behind a target
    pub fn volume_control(&self, target: VolumeTarget) -> Option<&dyn VolumeControl> {
        match target {
            VolumeTarget::Sink(index) => self.sink(index).map(|d| d as &dyn VolumeControl),
            VolumeTarget::Source(index) => self.source(index).map(|d| d as &dyn VolumeControl),
            VolumeTarget::SinkInput(index) => {
                self.sink_input(index).map(|s| s as &dyn VolumeControl)
            }
        }
    }

    /// Replace a target's volume after the server confirmed it
    pub(crate) fn replace_volume(&mut self, target: VolumeTarget, volume: Volume) -> bool {
        match self.volume_slot(target) {
            Some((slot, _)) => {
                *slot = volume;
                true
            }
            None => false,
        }
    }

    /// Replace a target's mute flag after the server confirmed it
    pub(crate) fn replace_mute(&mut self, target: VolumeTarget, muted: bool) -> bool {
        match self.volume_slot(target) {
            Some((_, slot)) => {
                *slot = muted;
                true
            }
            None => false,
        }
    }

    /// Record a card's active profile after the server confirmed it
    pub(crate) fn replace_active_profile(&mut self, card: u32, profile: usize) -> bool {
        match self.cards.get_mut(&card) {
            Some(card) if profile < card.profiles.len() => {
                card.active_profile = Some(profile);
                true
            }
            _ => false,
        }
    }

    fn volume_slot(&mut self, target: VolumeTarget) -> Option<(&mut Volume, &mut bool)> {
        match target {
            VolumeTarget::Sink(index) => self
                .device_map_mut(DeviceKind::Sink)
                .get_mut(&index)
                .map(|d| (&mut d.volume, &mut d.muted)),
            VolumeTarget::Source(index) => self
                .device_map_mut(DeviceKind::Source)
                .get_mut(&index)
                .map(|d| (&mut d.volume, &mut d.muted)),
            VolumeTarget::SinkInput(index) => self
                .sink_inputs
                .get_mut(&index)
                .map(|s| (&mut s.volume, &mut s.muted)),
        }
    }
}
