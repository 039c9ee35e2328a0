use std::fmt;

use super::{
    device::{CardInfo, CardProfile, DeviceKind},
    error::PulseError,
    registry::Registry,
};

/// User-supplied selector for sinks, sources and cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Exact server index
    Index(u32),
    /// Case-insensitive substring of the name
    Name(String),
    /// Every entity currently in the running state
    Running,
}

impl Selector {
    /// Parse a numeric index selector, decimal or `0x` hexadecimal
    ///
    /// # Errors
    /// Returns `PulseError::InvalidParameter` if the text is not an integer
    pub fn parse_index(text: &str) -> Result<Self, PulseError> {
        parse_index(text).map(Self::Index)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => write!(f, "'{name}'"),
            Self::Running => write!(f, "(running)"),
        }
    }
}

/// Selector for playback streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSelector {
    /// Exact stream index
    Index(u32),
    /// Case-insensitive substring of the linked client's name
    Client(String),
}

impl fmt::Display for StreamSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Client(name) => write!(f, "of client '{name}'"),
        }
    }
}

/// Outcome of resolving an optional selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No selector was given
    All,
    /// Identifiers matched by the selector, in index order
    Matched(Vec<u32>),
    /// A selector was given and matched nothing
    NotFound,
}

impl Selection {
    fn from_matches(matches: Vec<u32>) -> Self {
        if matches.is_empty() {
            Self::NotFound
        } else {
            Self::Matched(matches)
        }
    }

    /// Concrete identifiers, expanding [`Selection::All`] to `every`
    ///
    /// Returns `None` for [`Selection::NotFound`].
    pub fn into_targets(self, every: impl IntoIterator<Item = u32>) -> Option<Vec<u32>> {
        match self {
            Self::All => Some(every.into_iter().collect()),
            Self::Matched(matches) => Some(matches),
            Self::NotFound => None,
        }
    }

    /// Whether the selector matched nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl Registry {
    /// Resolve a selector against sinks or sources
    pub fn select_devices(&self, kind: DeviceKind, selector: Option<&Selector>) -> Selection {
        let Some(selector) = selector else {
            return Selection::All;
        };
        let matches = self
            .devices(kind)
            .filter(|device| match selector {
                Selector::Index(index) => device.index == *index,
                Selector::Name(name) => contains_ignore_case(&device.name, name),
                Selector::Running => device.state.is_running(),
            })
            .map(|device| device.index)
            .collect();
        Selection::from_matches(matches)
    }

    /// Resolve a selector against cards
    ///
    /// A card counts as running when any of its devices is running.
    pub fn select_cards(&self, selector: Option<&Selector>) -> Selection {
        let Some(selector) = selector else {
            return Selection::All;
        };
        let matches = self
            .cards()
            .filter(|card| match selector {
                Selector::Index(index) => card.index == *index,
                Selector::Name(name) => contains_ignore_case(&card.name, name),
                Selector::Running => self.card_state(card.index).is_running(),
            })
            .map(|card| card.index)
            .collect();
        Selection::from_matches(matches)
    }

    /// Resolve a selector against playback streams
    ///
    /// Client selectors match the linked client's name, never the
    /// stream's own name. With `non_corked_only`, paused streams are
    /// dropped from the result.
    pub fn select_sink_inputs(
        &self,
        selector: Option<&StreamSelector>,
        non_corked_only: bool,
    ) -> Selection {
        if selector.is_none() && !non_corked_only {
            return Selection::All;
        }
        let matches = self
            .sink_inputs()
            .filter(|sink_input| !non_corked_only || sink_input.is_playing())
            .filter(|sink_input| match selector {
                None => true,
                Some(StreamSelector::Index(index)) => sink_input.index == *index,
                Some(StreamSelector::Client(name)) => self
                    .sink_input_client(sink_input)
                    .is_some_and(|client| contains_ignore_case(&client.name, name)),
            })
            .map(|sink_input| sink_input.index)
            .collect();
        Selection::from_matches(matches)
    }
}

/// Resolve a profile of `card` by numeric index or name substring
///
/// Numeric selectors are bounds-checked against the card's profile list.
/// Otherwise the first profile whose name contains the selector, ignoring
/// case, wins.
///
/// # Errors
/// Returns `PulseError::InvalidParameter` if nothing matches
pub fn resolve_profile<'a>(
    card: &'a CardInfo,
    selector: &str,
) -> Result<(usize, &'a CardProfile), PulseError> {
    let selector = selector.trim();

    if let Ok(position) = selector.parse::<usize>() {
        return card
            .profiles
            .get(position)
            .map(|profile| (position, profile))
            .ok_or_else(|| {
                PulseError::InvalidParameter(format!(
                    "profile index {position} out of range, card '{}' has {} profiles",
                    card.name,
                    card.profiles.len()
                ))
            });
    }

    card.profiles
        .iter()
        .enumerate()
        .find(|(_, profile)| contains_ignore_case(&profile.name, selector))
        .ok_or_else(|| {
            PulseError::InvalidParameter(format!(
                "no profile matching '{selector}' on card '{}'",
                card.name
            ))
        })
}

/// Parse an integer identifier, decimal or `0x` hexadecimal
///
/// # Errors
/// Returns `PulseError::InvalidParameter` if the text is not an integer
pub fn parse_index(text: &str) -> Result<u32, PulseError> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_| PulseError::InvalidParameter(format!("failed to parse index '{text}'")))
}

/// Parse a comma-separated list of channel indices, e.g. `0,1`
///
/// Empty segments are ignored.
///
/// # Errors
/// Returns `PulseError::InvalidParameter` if a segment is not a
/// non-negative integer
pub fn parse_channel_list(text: &str) -> Result<Vec<usize>, PulseError> {
    text.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment.parse::<usize>().map_err(|_| {
                PulseError::InvalidParameter(format!("invalid channel index '{segment}'"))
            })
        })
        .collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
