//! Formatting utilities for CLI output.
//!
//! Renders registry entities as the plain-text blocks pavolctl prints,
//! or as one JSON document when `--format json` is given.

use serde::Serialize;

use crate::services::pulse::{
    CardInfo, DeviceInfo, DeviceKind, DeviceState, Registry, SinkInputInfo, Volume,
    volume::percentage,
};

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";
    /// Dim text
    pub const DIM: &'static str = "\x1b[2m";

    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Green color
    pub const GREEN: &'static str = "\x1b[32m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

fn paint(text: &str, codes: &[&str], color: bool) -> String {
    if !color {
        return text.to_string();
    }
    format!("{}{}{}", codes.concat(), text, Colors::RESET)
}

/// Formats section headers with styling
pub fn format_header(text: &str, color: bool) -> String {
    paint(text, &[Colors::BOLD, Colors::CYAN], color)
}

/// Formats the active-profile marker with styling
pub fn format_active(text: &str, color: bool) -> String {
    paint(text, &[Colors::BOLD, Colors::GREEN], color)
}

/// Formats descriptions with muted styling
pub fn format_description(text: &str, color: bool) -> String {
    paint(text, &[Colors::DIM], color)
}

/// Formats error messages with red styling
pub fn format_error(text: &str, color: bool) -> String {
    paint(text, &[Colors::BOLD, Colors::RED], color)
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn channel_lines(volume: &Volume) -> impl Iterator<Item = String> + '_ {
    volume
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, level)| format!("channel {i}: {level} ({:.1} %)", percentage(*level)))
}

/// Formats one sink or source.
///
/// ```text
/// card 1 (idx = 0) running
/// name: alsa_output.usb-Generic_USB_Audio
/// USB Audio
/// mute: no
/// channel 0: 32768 (50.0 %)
/// channel 1: 32768 (50.0 %)
/// ```
pub fn format_device(device: &DeviceInfo) -> String {
    let card = device
        .card
        .map_or_else(|| "none".to_string(), |card| card.to_string());

    let mut lines = vec![
        format!("card {card} (idx = {}) {}", device.index, device.state),
        format!("name: {}", device.name),
        device.description.clone(),
        format!("mute: {}", yes_no(device.muted)),
    ];
    lines.extend(channel_lines(&device.volume));
    lines.join("\n")
}

/// Formats a card with its profiles, marking the active one with `*`
pub fn format_card(card: &CardInfo, state: DeviceState, color: bool) -> String {
    let header = format!("card {} (idx = {}) {}", card.name, card.index, state);
    let profiles = card.profiles.iter().enumerate().map(|(position, profile)| {
        let marker = if card.active_profile == Some(position) {
            format_active("*", color)
        } else {
            " ".to_string()
        };
        let description = format_description(&format!("({})", profile.description), color);
        format!("{marker} profile {position}: {} {description}", profile.name)
    });

    std::iter::once(header)
        .chain(profiles)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a playback stream with the names of its client and sink
pub fn format_sink_input(registry: &Registry, sink_input: &SinkInputInfo) -> String {
    let client = registry
        .sink_input_client(sink_input)
        .map_or("none", |client| client.name.as_str());
    let sink = registry
        .sink_input_sink(sink_input)
        .map_or("none", |sink| sink.name.as_str());
    let state = if sink_input.corked { "corked" } else { "playing" };

    let mut lines = vec![
        format!("playback (idx = {}) {state}", sink_input.index),
        format!("name: {}", sink_input.name),
        format!("client: {client}"),
        format!("sink: {sink}"),
        format!("mute: {}", yes_no(sink_input.muted)),
    ];
    lines.extend(channel_lines(&sink_input.volume));
    lines.join("\n")
}

/// Card as listed, with its derived state
#[derive(Debug, Serialize)]
pub struct CardEntry<'a> {
    #[serde(flatten)]
    card: &'a CardInfo,
    state: DeviceState,
}

/// Playback stream as listed, with its resolved client and sink names
#[derive(Debug, Serialize)]
pub struct SinkInputEntry<'a> {
    #[serde(flatten)]
    sink_input: &'a SinkInputInfo,
    client_name: Option<&'a str>,
    sink_name: Option<&'a str>,
}

/// Everything one invocation asked to list
///
/// Sections that were not requested stay `None` and are left out of
/// both renderings.
#[derive(Debug, Default, Serialize)]
pub struct Listing<'a> {
    /// Listed sinks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sinks: Option<Vec<&'a DeviceInfo>>,
    /// Listed sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<&'a DeviceInfo>>,
    /// Listed cards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<CardEntry<'a>>>,
    /// Listed playback streams
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<Vec<SinkInputEntry<'a>>>,
}

impl<'a> Listing<'a> {
    /// Set the device section for `kind`
    pub fn set_devices(&mut self, kind: DeviceKind, devices: Vec<&'a DeviceInfo>) {
        match kind {
            DeviceKind::Sink => self.sinks = Some(devices),
            DeviceKind::Source => self.sources = Some(devices),
        }
    }

    /// Set the card section, deriving each card's state from the registry
    pub fn set_cards(&mut self, registry: &'a Registry, cards: Vec<&'a CardInfo>) {
        self.cards = Some(
            cards
                .into_iter()
                .map(|card| CardEntry {
                    card,
                    state: registry.card_state(card.index),
                })
                .collect(),
        );
    }

    /// Set the playback section, resolving client and sink names
    pub fn set_playback(&mut self, registry: &'a Registry, sink_inputs: Vec<&'a SinkInputInfo>) {
        self.playback = Some(
            sink_inputs
                .into_iter()
                .map(|sink_input| SinkInputEntry {
                    sink_input,
                    client_name: registry.sink_input_client(sink_input).map(|c| c.name.as_str()),
                    sink_name: registry.sink_input_sink(sink_input).map(|s| s.name.as_str()),
                })
                .collect(),
        );
    }

    fn section_count(&self) -> usize {
        [
            self.sinks.is_some(),
            self.sources.is_some(),
            self.cards.is_some(),
            self.playback.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Render as text blocks separated by blank lines
    ///
    /// Section headers (`sinks:`, `sources:`, ...) are only printed
    /// when more than one section was requested.
    pub fn to_text(&self, registry: &Registry, color: bool) -> String {
        let headers = self.section_count() > 1;
        let mut out = String::new();

        let mut section = |title: &str, blocks: Vec<String>| {
            if headers {
                out.push_str(&format_header(&format!("{title}:"), color));
                out.push_str("\n\n");
            }
            for block in blocks {
                out.push_str(&block);
                out.push_str("\n\n");
            }
        };

        let devices = [(DeviceKind::Sink, &self.sinks), (DeviceKind::Source, &self.sources)];
        for (kind, listed) in devices {
            if let Some(listed) = listed {
                section(kind.plural(), listed.iter().map(|d| format_device(d)).collect());
            }
        }
        if let Some(cards) = &self.cards {
            section(
                "cards",
                cards
                    .iter()
                    .map(|entry| format_card(entry.card, entry.state, color))
                    .collect(),
            );
        }
        if let Some(playback) = &self.playback {
            section(
                "playback",
                playback
                    .iter()
                    .map(|entry| format_sink_input(registry, entry.sink_input))
                    .collect(),
            );
        }
        out
    }

    /// Render as pretty-printed JSON
    ///
    /// # Errors
    /// Returns the serialiser's error
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
