use std::fmt;

use tracing::{debug, instrument, warn};

use crate::{
    config::{OutputConfig, OutputFormat},
    services::{
        PulseManager,
        pulse::{
            DeviceKind, EntityKind, PulseError, Registry, Selector, StreamSelector, Transport,
            VolumeDirective, VolumeTarget, resolve_profile,
        },
    },
};

use super::{Cli, CliError, CommandResult, formatting::Listing};

/// Everything an invocation asked for, parsed before connecting
#[derive(Debug)]
struct Request {
    selector: Option<Selector>,
    stream_selector: Option<StreamSelector>,
    channels: Option<Vec<usize>>,
    sink_volume: Option<VolumeDirective>,
    source_volume: Option<VolumeDirective>,
    playback_volume: Option<VolumeDirective>,
}

impl Request {
    fn parse(cli: &Cli) -> Result<Self, PulseError> {
        let directive = |text: &Option<String>| {
            text.as_deref()
                .map(VolumeDirective::parse)
                .transpose()
                .map_err(PulseError::from)
        };

        let request = Self {
            selector: cli.device_selector()?,
            stream_selector: cli.stream_selector()?,
            channels: cli.channel_list()?,
            sink_volume: directive(&cli.set_volume)?,
            source_volume: directive(&cli.set_source_volume)?,
            playback_volume: directive(&cli.set_playback_volume)?,
        };

        if cli.set_profile.is_some() && request.selector.is_none() {
            return Err(PulseError::InvalidParameter(
                "--set-profile needs a card selector (-c, -C or -r)".to_string(),
            ));
        }
        Ok(request)
    }
}

#[derive(Debug, Default)]
struct Tally {
    failed: usize,
    attempted: usize,
}

/// Runs one pavolctl invocation against a PulseAudio manager.
///
/// Listings are rendered first, then volume changes are applied to
/// sinks, sources and playback streams in that order, then the card
/// profile is switched.
pub struct CliService {
    cli: Cli,
    output: OutputConfig,
}

impl CliService {
    /// Creates a service for the parsed arguments.
    ///
    /// # Arguments
    /// * `cli` - Parsed command line
    /// * `output` - Output settings, already merged with command-line overrides
    pub fn new(cli: Cli, output: OutputConfig) -> Self {
        Self { cli, output }
    }

    /// Executes the invocation and returns the text to print.
    ///
    /// All arguments are validated before the connection is made. The
    /// connection is torn down before returning, whatever the outcome.
    ///
    /// # Errors
    /// Returns `CliError::Pulse` for malformed input, unmatched selectors
    /// and connection failures, and `CliError::PartialFailure` when some
    /// targets of a change failed.
    #[instrument(skip_all)]
    pub fn execute<T: Transport>(&self, manager: &mut PulseManager<T>) -> CommandResult {
        let request = Request::parse(&self.cli)?;
        debug!(?request, "Parsed request");

        manager.connect()?;
        let result = self.run(manager, &request);
        manager.disconnect();
        result
    }

    fn run<T: Transport>(&self, manager: &mut PulseManager<T>, request: &Request) -> CommandResult {
        let output = if self.cli.lists_anything() {
            self.render_listing(manager.registry(), request)?
        } else {
            String::new()
        };

        let mut tally = Tally::default();
        let channels = request.channels.as_deref();

        let device_changes = [
            (DeviceKind::Sink, &request.sink_volume),
            (DeviceKind::Source, &request.source_volume),
        ];
        for (kind, directive) in device_changes {
            let Some(directive) = directive else {
                continue;
            };
            let targets: Vec<VolumeTarget> =
                device_targets(manager.registry(), kind, request.selector.as_ref())?
                    .into_iter()
                    .map(|index| VolumeTarget::device(kind, index))
                    .collect();
            apply(manager, &targets, directive, channels, &mut tally);
        }

        if let Some(directive) = &request.playback_volume {
            let targets: Vec<VolumeTarget> = self
                .stream_targets(manager.registry(), request)?
                .into_iter()
                .map(VolumeTarget::SinkInput)
                .collect();
            apply(manager, &targets, directive, channels, &mut tally);
        }

        if let Some(profile) = &self.cli.set_profile {
            self.switch_profiles(manager, request, profile, &mut tally)?;
        }

        if tally.failed > 0 {
            return Err(CliError::PartialFailure {
                failed: tally.failed,
                attempted: tally.attempted,
                output,
            });
        }
        Ok(output)
    }

    fn render_listing(&self, registry: &Registry, request: &Request) -> CommandResult {
        let selector = request.selector.as_ref();
        let mut listing = Listing::default();

        for kind in [DeviceKind::Sink, DeviceKind::Source] {
            let listed = match kind {
                DeviceKind::Sink => self.cli.lists_sinks(),
                DeviceKind::Source => self.cli.lists_sources(),
            };
            if listed {
                let devices = device_targets(registry, kind, selector)?
                    .into_iter()
                    .filter_map(|index| registry.device(kind, index))
                    .collect();
                listing.set_devices(kind, devices);
            }
        }

        if self.cli.list_cards {
            let cards = card_targets(registry, selector)?
                .into_iter()
                .filter_map(|index| registry.card(index))
                .collect();
            listing.set_cards(registry, cards);
        }

        if self.cli.list_playback {
            let sink_inputs = self
                .stream_targets(registry, request)?
                .into_iter()
                .filter_map(|index| registry.sink_input(index))
                .collect();
            listing.set_playback(registry, sink_inputs);
        }

        match self.output.format {
            OutputFormat::Json => Ok(listing.to_json()? + "\n"),
            OutputFormat::Text => Ok(listing.to_text(registry, self.output.color)),
        }
    }

    fn stream_targets(&self, registry: &Registry, request: &Request) -> Result<Vec<u32>, PulseError> {
        let selector = request.stream_selector.as_ref();
        let every = registry.sink_inputs().map(|s| s.index);
        let targets = registry
            .select_sink_inputs(selector, self.cli.non_corked)
            .into_targets(every);

        targets.ok_or_else(|| {
            let described = match selector {
                Some(selector) if self.cli.non_corked => format!("{selector} (non-corked)"),
                Some(selector) => selector.to_string(),
                None => "(non-corked)".to_string(),
            };
            missing(EntityKind::Stream, described)
        })
    }

    fn switch_profiles<T: Transport>(
        &self,
        manager: &mut PulseManager<T>,
        request: &Request,
        profile: &str,
        tally: &mut Tally,
    ) -> Result<(), PulseError> {
        let cards = card_targets(manager.registry(), request.selector.as_ref())?;

        for &card in &cards {
            if let Some(info) = manager.registry().card(card) {
                resolve_profile(info, profile)?;
            }
        }

        for card in cards {
            tally.attempted += 1;
            if let Err(e) = manager.set_card_profile(card, profile) {
                warn!(card, profile, error = %e, "Profile change failed");
                tally.failed += 1;
            }
        }
        Ok(())
    }
}

fn apply<T: Transport>(
    manager: &mut PulseManager<T>,
    targets: &[VolumeTarget],
    directive: &VolumeDirective,
    channels: Option<&[usize]>,
    tally: &mut Tally,
) {
    let report = manager.apply_volume_batch(targets, directive, channels);
    tally.attempted += report.attempted();
    tally.failed += report.failed.len();
}

fn missing(entity: EntityKind, selector: impl fmt::Display) -> PulseError {
    debug!(%entity, %selector, "Selector matched nothing");
    PulseError::not_found(entity, selector)
}

fn device_targets(
    registry: &Registry,
    kind: DeviceKind,
    selector: Option<&Selector>,
) -> Result<Vec<u32>, PulseError> {
    let every = registry.devices(kind).map(|d| d.index);
    registry
        .select_devices(kind, selector)
        .into_targets(every)
        .ok_or_else(|| missing(kind.entity(), describe(selector)))
}

fn card_targets(registry: &Registry, selector: Option<&Selector>) -> Result<Vec<u32>, PulseError> {
    let every = registry.cards().map(|c| c.index);
    registry
        .select_cards(selector)
        .into_targets(every)
        .ok_or_else(|| missing(EntityKind::Card, describe(selector)))
}

fn describe(selector: Option<&Selector>) -> String {
    selector.map_or_else(String::new, ToString::to_string)
}
