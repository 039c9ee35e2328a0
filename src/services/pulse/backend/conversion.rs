use std::borrow::Cow;

use libpulse_binding::{
    context::introspect::{
        CardInfo as PulseCardInfo, CardProfileInfo, ClientInfo as PulseClientInfo,
        SinkInfo, SinkInputInfo as PulseSinkInputInfo, SourceInfo,
    },
    def::{SinkState, SourceState},
    volume::{ChannelVolumes, Volume as PulseVolume},
};

use crate::services::pulse::{
    device::{CardInfo, CardProfile, DeviceInfo, DeviceKind, DeviceState},
    stream::{ClientInfo, SinkInputInfo},
    volume::{Volume, VolumeError},
};

/// Largest channel count a volume vector may carry on the wire
pub const MAX_CHANNELS: usize = 32;

/// Convert our volume to PulseAudio volume
///
/// Levels are raw volume units, copied channel for channel.
///
/// # Errors
/// Returns `VolumeError::UnsupportedChannelCount` if the volume has no
/// channels or more than the protocol allows
pub fn convert_volume_to_pulse(volume: &Volume) -> Result<ChannelVolumes, VolumeError> {
    let channels = volume.channels();
    if channels == 0 || channels > MAX_CHANNELS {
        return Err(VolumeError::UnsupportedChannelCount {
            channels,
            max: MAX_CHANNELS,
        });
    }

    let mut pulse_volume = ChannelVolumes::default();
    pulse_volume.set_len(channels as u8);
    for (slot, &level) in pulse_volume.get_mut().iter_mut().zip(volume.as_slice()) {
        *slot = PulseVolume(level);
    }

    Ok(pulse_volume)
}

/// Convert PulseAudio volume to our volume
pub fn convert_volume_from_pulse(pulse_volume: &ChannelVolumes) -> Volume {
    let levels = pulse_volume.get()[..usize::from(pulse_volume.len())]
        .iter()
        .map(|level| level.0)
        .collect();

    Volume::new(levels)
}

/// Convert PulseAudio sink state to our device state
pub fn convert_sink_state(state: SinkState) -> DeviceState {
    match state {
        SinkState::Running => DeviceState::Running,
        SinkState::Idle => DeviceState::Idle,
        SinkState::Suspended => DeviceState::Suspended,
        _ => DeviceState::Unknown,
    }
}

/// Convert PulseAudio source state to our device state
pub fn convert_source_state(state: SourceState) -> DeviceState {
    match state {
        SourceState::Running => DeviceState::Running,
        SourceState::Idle => DeviceState::Idle,
        SourceState::Suspended => DeviceState::Suspended,
        _ => DeviceState::Unknown,
    }
}

fn cow_str_to_string(cow_str: Option<&Cow<str>>) -> String {
    cow_str.map(|s| s.to_string()).unwrap_or_default()
}

fn valid_index(index: u32) -> Option<u32> {
    (index != libpulse_binding::def::INVALID_INDEX).then_some(index)
}

/// Create device info from PulseAudio sink information
pub fn create_device_info_from_sink(sink_info: &SinkInfo) -> DeviceInfo {
    let volume = convert_volume_from_pulse(&sink_info.volume);
    let name = cow_str_to_string(sink_info.name.as_ref());

    let mut device = DeviceInfo::new(sink_info.index, DeviceKind::Sink, name, volume);
    device.description = cow_str_to_string(sink_info.description.as_ref());
    device.driver = cow_str_to_string(sink_info.driver.as_ref());
    device.card = sink_info.card;
    device.base_volume = sink_info.base_volume.0;
    device.n_volume_steps = sink_info.n_volume_steps;
    device.muted = sink_info.mute;
    device.state = convert_sink_state(sink_info.state);
    device.monitor_index = valid_index(sink_info.monitor_source);
    device.monitor_name = sink_info
        .monitor_source_name
        .as_ref()
        .map(|s| s.to_string());
    device
}

/// Create device info from PulseAudio source information
pub fn create_device_info_from_source(source_info: &SourceInfo) -> DeviceInfo {
    let volume = convert_volume_from_pulse(&source_info.volume);
    let name = cow_str_to_string(source_info.name.as_ref());

    let mut device = DeviceInfo::new(source_info.index, DeviceKind::Source, name, volume);
    device.description = cow_str_to_string(source_info.description.as_ref());
    device.driver = cow_str_to_string(source_info.driver.as_ref());
    device.card = source_info.card;
    device.base_volume = source_info.base_volume.0;
    device.n_volume_steps = source_info.n_volume_steps;
    device.muted = source_info.mute;
    device.state = convert_source_state(source_info.state);
    device.monitor_index = source_info.monitor_of_sink;
    device.monitor_name = source_info
        .monitor_of_sink_name
        .as_ref()
        .map(|s| s.to_string());
    device
}

/// Create client info from PulseAudio client information
pub fn create_client_info(client_info: &PulseClientInfo) -> ClientInfo {
    let mut client = ClientInfo::new(
        client_info.index,
        cow_str_to_string(client_info.name.as_ref()),
    );
    client.driver = cow_str_to_string(client_info.driver.as_ref());
    client
}

/// Create playback stream info from PulseAudio sink input information
///
/// Owner references are copied as reported, linking happens later.
pub fn create_sink_input_info(sink_input_info: &PulseSinkInputInfo) -> SinkInputInfo {
    let mut sink_input = SinkInputInfo::new(
        sink_input_info.index,
        cow_str_to_string(sink_input_info.name.as_ref()),
        convert_volume_from_pulse(&sink_input_info.volume),
        sink_input_info.client,
        valid_index(sink_input_info.sink),
    );
    sink_input.driver = cow_str_to_string(sink_input_info.driver.as_ref());
    sink_input.muted = sink_input_info.mute;
    sink_input.corked = sink_input_info.corked;
    sink_input
}

fn create_card_profile(profile: &CardProfileInfo) -> CardProfile {
    let mut card_profile = CardProfile::new(
        cow_str_to_string(profile.name.as_ref()),
        cow_str_to_string(profile.description.as_ref()),
    );
    card_profile.n_sinks = profile.n_sinks;
    card_profile.n_sources = profile.n_sources;
    card_profile.priority = profile.priority;
    card_profile.available = profile.available;
    card_profile
}

/// Create card info from PulseAudio card information
pub fn create_card_info(card_info: &PulseCardInfo) -> CardInfo {
    let mut card = CardInfo::new(card_info.index, cow_str_to_string(card_info.name.as_ref()));
    card.driver = cow_str_to_string(card_info.driver.as_ref());
    card.profiles = card_info.profiles.iter().map(create_card_profile).collect();

    let active_name = card_info
        .active_profile
        .as_ref()
        .and_then(|profile| profile.name.as_ref())
        .map(|name| name.to_string());
    card.active_profile = active_name.and_then(|name| card.profile_position(&name));
    card
}
