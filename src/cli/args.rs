use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::{
    config::{Config, LogLevel, OutputFormat},
    services::pulse::{PulseError, Selector, StreamSelector, selection},
};

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "pavolctl", version)]
#[command(about = "List PulseAudio devices and change their volume, mute and profile")]
#[command(after_help = VOLUME_HELP)]
pub struct Cli {
    /// Select the sink, source or card with this index
    #[arg(short = 'c', long, value_name = "IDX", conflicts_with_all = ["card_name", "running"])]
    pub card: Option<String>,

    /// Select devices whose name contains NAME, ignoring case
    #[arg(short = 'C', long, value_name = "NAME", conflicts_with = "running")]
    pub card_name: Option<String>,

    /// Select devices that are currently running
    #[arg(short = 'r', long)]
    pub running: bool,

    /// List all sinks and sources
    #[arg(short = 'l', long)]
    pub list: bool,

    /// List sinks only
    #[arg(long, alias = "list-sink")]
    pub list_sinks: bool,

    /// List sources only
    #[arg(long, alias = "list-source")]
    pub list_sources: bool,

    /// List cards and their profiles
    #[arg(long)]
    pub list_cards: bool,

    /// List playback streams
    #[arg(long)]
    pub list_playback: bool,

    /// Change the volume of the selected sinks
    #[arg(short = 's', long, value_name = "VOLUME", allow_hyphen_values = true)]
    pub set_volume: Option<String>,

    /// Change the volume of the selected sources
    #[arg(long, value_name = "VOLUME", allow_hyphen_values = true)]
    pub set_source_volume: Option<String>,

    /// Change the volume of the selected playback streams
    #[arg(short = 'p', long, value_name = "VOLUME", allow_hyphen_values = true)]
    pub set_playback_volume: Option<String>,

    /// Restrict volume changes to these channels (comma separated)
    #[arg(short = 'n', long, value_name = "CHANNELS")]
    pub channels: Option<String>,

    /// Select the playback stream with this index
    #[arg(long, value_name = "IDX", conflicts_with = "playback_client")]
    pub playback: Option<String>,

    /// Select playback streams whose client name contains NAME
    #[arg(long, value_name = "NAME")]
    pub playback_client: Option<String>,

    /// Only select playback streams that are not paused
    #[arg(long)]
    pub non_corked: bool,

    /// Activate a profile on the selected cards, by index or name
    #[arg(long, value_name = "PROFILE")]
    pub set_profile: Option<String>,

    /// Print debug messages (repeat for trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Read configuration from this file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format of listings
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// PulseAudio server to connect to
    #[arg(long, value_name = "ADDRESS")]
    pub server: Option<String>,
}

const VOLUME_HELP: &str = "\
VOLUME formats:
  50%, 32768       absolute level
  +5%, -1000       increase or decrease
  *10%, /10%       logarithmic increase or decrease
  mute, unmute     set the mute flag";

impl Cli {
    /// Whether anything besides ambient flags was given
    pub fn has_actions(&self) -> bool {
        self.lists_anything()
            || self.set_volume.is_some()
            || self.set_source_volume.is_some()
            || self.set_playback_volume.is_some()
            || self.set_profile.is_some()
    }

    /// Whether any listing flag was given
    pub fn lists_anything(&self) -> bool {
        self.lists_sinks() || self.lists_sources() || self.list_cards || self.list_playback
    }

    /// Whether sinks are listed
    pub fn lists_sinks(&self) -> bool {
        self.list || self.list_sinks
    }

    /// Whether sources are listed
    pub fn lists_sources(&self) -> bool {
        self.list || self.list_sources
    }

    /// Selector for sinks, sources and cards
    ///
    /// # Errors
    /// Returns `PulseError::InvalidParameter` for a non-numeric `--card`
    pub fn device_selector(&self) -> Result<Option<Selector>, PulseError> {
        if let Some(index) = &self.card {
            return Selector::parse_index(index).map(Some);
        }
        if let Some(name) = &self.card_name {
            return Ok(Some(Selector::Name(name.clone())));
        }
        Ok(self.running.then_some(Selector::Running))
    }

    /// Selector for playback streams
    ///
    /// # Errors
    /// Returns `PulseError::InvalidParameter` for a non-numeric `--playback`
    pub fn stream_selector(&self) -> Result<Option<StreamSelector>, PulseError> {
        if let Some(index) = &self.playback {
            return selection::parse_index(index).map(|index| Some(StreamSelector::Index(index)));
        }
        Ok(self.playback_client.clone().map(StreamSelector::Client))
    }

    /// Channel restriction for volume changes
    ///
    /// # Errors
    /// Returns `PulseError::InvalidParameter` for a malformed list
    pub fn channel_list(&self) -> Result<Option<Vec<usize>>, PulseError> {
        self.channels
            .as_deref()
            .map(selection::parse_channel_list)
            .transpose()
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(server) = &self.server {
            config.pulse.server = Some(server.clone());
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if self.no_color {
            config.output.color = false;
        }
        if let Some(level) = LogLevel::from_verbosity(self.verbose) {
            config.general.log_level = config.general.log_level.max(level);
        }
    }
}
