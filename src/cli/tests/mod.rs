//! Unit tests for CLI module
//!
//! Tests argument parsing, formatting, and invocations driven through
//! the scripted fake transport.

#![allow(clippy::panic)]

use clap::Parser;

use crate::cli::{
    Cli, CliError, CliService,
    formatting::{format_card, format_device, format_error, format_header, format_sink_input},
};
use crate::config::{Config, LogLevel, OutputConfig, OutputFormat};
use crate::services::pulse::{
    DeviceState, EntityKind, PulseError, PulseManager, Registry, Selector, StreamSelector,
    Volume, VolumeError, VolumeTarget,
    tests::{fake::FakeTransport, fixtures},
};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("pavolctl").chain(args.iter().copied())).unwrap()
}

fn run_with(args: &[&str], output: OutputConfig) -> (Result<String, CliError>, FakeTransport) {
    let transport = FakeTransport::new(fixtures::snapshot());
    let mut manager = PulseManager::new(transport.clone());
    let service = CliService::new(parse(args), output);
    (service.execute(&mut manager), transport)
}

fn run(args: &[&str]) -> (Result<String, CliError>, FakeTransport) {
    let output = OutputConfig {
        format: OutputFormat::Text,
        color: false,
    };
    run_with(args, output)
}

const USB_SINK: &str = "card 1 (idx = 0) running\n\
    name: alsa_output.usb-Generic_USB_Audio\n\
    alsa_output.usb-Generic_USB_Audio output\n\
    mute: no\n\
    channel 0: 32768 (50.0 %)\n\
    channel 1: 32768 (50.0 %)";

#[test]
fn volume_flags_accept_leading_minus() {
    let cli = parse(&["-s", "-5%", "--set-source-volume", "-1000", "-p", "-0"]);

    assert_eq!(cli.set_volume.as_deref(), Some("-5%"));
    assert_eq!(cli.set_source_volume.as_deref(), Some("-1000"));
    assert_eq!(cli.set_playback_volume.as_deref(), Some("-0"));
}

#[test]
fn device_selectors_are_exclusive() {
    let result = Cli::try_parse_from(["pavolctl", "-c", "0", "-C", "usb", "-l"]);
    assert!(result.is_err());

    let result = Cli::try_parse_from(["pavolctl", "-C", "usb", "-r", "-l"]);
    assert!(result.is_err());
}

#[test]
fn ambient_flags_alone_are_not_actions() {
    let cli = parse(&["-vv", "--no-color", "--server", "tcp:localhost"]);

    assert!(!cli.has_actions());
    assert!(parse(&["--list-cards"]).has_actions());
    assert!(parse(&["--set-profile", "off", "-c", "0"]).has_actions());
}

#[test]
fn list_flag_covers_sinks_and_sources() {
    let cli = parse(&["-l"]);

    assert!(cli.lists_sinks());
    assert!(cli.lists_sources());
    assert!(!cli.list_cards);
    assert!(parse(&["--list-sink"]).lists_sinks());
}

#[test]
fn selectors_are_built_from_flags() {
    assert_eq!(parse(&["-c", "0x1f"]).device_selector().unwrap(), Some(Selector::Index(31)));
    assert_eq!(
        parse(&["-C", "USB"]).device_selector().unwrap(),
        Some(Selector::Name("USB".to_string()))
    );
    assert_eq!(parse(&["-r"]).device_selector().unwrap(), Some(Selector::Running));
    assert_eq!(parse(&[]).device_selector().unwrap(), None);

    assert_eq!(
        parse(&["--playback-client", "fire"]).stream_selector().unwrap(),
        Some(StreamSelector::Client("fire".to_string()))
    );
    assert_eq!(
        parse(&["--playback", "12"]).stream_selector().unwrap(),
        Some(StreamSelector::Index(12))
    );
}

#[test]
fn malformed_numeric_selectors_are_invalid_parameters() {
    assert!(matches!(
        parse(&["-c", "first"]).device_selector(),
        Err(PulseError::InvalidParameter(_))
    ));
    assert!(matches!(
        parse(&["--playback", "x"]).stream_selector(),
        Err(PulseError::InvalidParameter(_))
    ));
    assert!(matches!(
        parse(&["-n", "0,left"]).channel_list(),
        Err(PulseError::InvalidParameter(_))
    ));
    assert_eq!(parse(&["-n", "0,,2"]).channel_list().unwrap(), Some(vec![0, 2]));
}

#[test]
fn overrides_replace_config_values() {
    let mut config = Config::default();
    parse(&["--server", "tcp:10.0.0.2", "--format", "json", "--no-color", "-v"])
        .apply_overrides(&mut config);

    assert_eq!(config.pulse.server.as_deref(), Some("tcp:10.0.0.2"));
    assert_eq!(config.output.format, OutputFormat::Json);
    assert!(!config.output.color);
    assert_eq!(config.general.log_level, LogLevel::Debug);
}

#[test]
fn verbosity_never_lowers_configured_level() {
    let mut config = Config::default();
    config.general.log_level = LogLevel::Trace;
    parse(&["-v"]).apply_overrides(&mut config);

    assert_eq!(config.general.log_level, LogLevel::Trace);
}

#[test]
fn device_block_lists_every_channel() {
    let device = fixtures::sink(
        0,
        "alsa_output.usb-Generic_USB_Audio",
        DeviceState::Running,
        Some(1),
    );

    assert_eq!(format_device(&device), USB_SINK);
}

#[test]
fn device_without_card_prints_none() {
    let mut device = fixtures::source(4, "null.monitor", DeviceState::Suspended, None);
    device.description = "Monitor of Null Output".to_string();
    device.muted = true;
    device.volume = Volume::new(vec![65536]);

    assert_eq!(
        format_device(&device),
        "card none (idx = 4) suspended\n\
         name: null.monitor\n\
         Monitor of Null Output\n\
         mute: yes\n\
         channel 0: 65536 (100.0 %)"
    );
}

#[test]
fn card_block_marks_active_profile() {
    let card = fixtures::card(1, "alsa_card.usb", &["output:analog-stereo", "off"], 1);

    assert_eq!(
        format_card(&card, DeviceState::Idle, false),
        "card alsa_card.usb (idx = 1) idle\n  \
         profile 0: output:analog-stereo (OUTPUT:ANALOG-STEREO)\n* \
         profile 1: off (OFF)"
    );
}

#[test]
fn playback_block_names_client_and_sink() {
    let registry = Registry::from_snapshot(fixtures::snapshot());
    let stream = registry.sink_input(11).unwrap();

    assert_eq!(
        format_sink_input(&registry, stream),
        "playback (idx = 11) corked\n\
         name: Video\n\
         client: mpv\n\
         sink: alsa_output.pci-0000_00_1f.3.analog-stereo\n\
         mute: no\n\
         channel 0: 10000 (15.3 %)\n\
         channel 1: 20000 (30.5 %)"
    );
}

#[test]
fn color_is_optional() {
    assert_eq!(format_header("sinks:", false), "sinks:");
    assert_eq!(format_error("boom", false), "boom");
    assert!(format_header("sinks:", true).starts_with("\x1b[1m"));
    assert!(format_error("boom", true).ends_with("\x1b[0m"));
}

#[test]
fn running_selector_lists_only_running_sink() {
    let (result, transport) = run(&["-r", "--list-sinks"]);

    assert_eq!(result.unwrap(), format!("{USB_SINK}\n\n"));
    assert_eq!(transport.state.borrow().disconnects, 1);
}

#[test]
fn listing_both_kinds_adds_headers() {
    let (result, _) = run(&["-l"]);
    let output = result.unwrap();

    assert!(output.starts_with(&format!("sinks:\n\n{USB_SINK}\n\n")));
    let sources = output.find("\n\nsources:\n\n").unwrap();
    assert!(output[..sources].ends_with("channel 1: 32768 (50.0 %)"));
    assert_eq!(output.matches("(idx = ").count(), 4);
}

#[test]
fn playback_listing_shows_linked_names() {
    let (result, _) = run(&["--list-playback"]);
    let output = result.unwrap();

    assert!(output.contains("playback (idx = 10) playing\nname: AudioStream\nclient: Firefox\n"));
    assert!(output.contains("playback (idx = 11) corked\nname: Video\nclient: mpv\n"));
    assert!(output.contains("name: Orphan\nclient: none\nsink: none\n"));
}

#[test]
fn json_listing_serialises_requested_sections() {
    let output = OutputConfig {
        format: OutputFormat::Json,
        color: false,
    };
    let (result, _) = run_with(&["--list-playback", "--non-corked", "--list-cards"], output);
    let value: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();

    assert!(value.get("sinks").is_none());
    let playback = value["playback"].as_array().unwrap();
    assert_eq!(playback.len(), 2);
    assert_eq!(playback[0]["index"], 10);
    assert_eq!(playback[0]["client_name"], "Firefox");
    assert_eq!(playback[0]["volume"], serde_json::json!([65536, 65536]));
    assert!(playback[1]["sink_name"].is_null());

    let cards = value["cards"].as_array().unwrap();
    assert_eq!(cards[1]["state"], "running");
    assert_eq!(cards[0]["state"], "idle");
}

#[test]
fn set_volume_targets_selected_sink() {
    let (result, transport) = run(&["-c", "1", "-s", "100%"]);

    assert_eq!(result.unwrap(), "");
    assert_eq!(
        transport.state.borrow().volumes,
        vec![(VolumeTarget::Sink(1), Volume::new(vec![65536, 65536]))]
    );
}

#[test]
fn set_volume_without_selector_changes_every_sink() {
    let (result, transport) = run(&["-s", "+10%", "-n", "1"]);

    result.unwrap();
    let volumes = &transport.state.borrow().volumes;
    assert_eq!(volumes.len(), 2);
    assert!(volumes.iter().all(|(_, v)| v.as_slice() == [32768, 39321]));
}

#[test]
fn playback_volume_follows_client_selector() {
    let (result, transport) = run(&["-p", "mute", "--playback-client", "FIRE"]);

    result.unwrap();
    let state = transport.state.borrow();
    assert_eq!(state.mutes, vec![(VolumeTarget::SinkInput(10), true)]);
    assert!(state.volumes.is_empty());
}

#[test]
fn unmatched_selector_is_a_usage_error() {
    let (result, transport) = run(&["-C", "bluetooth", "-s", "50%"]);
    let err = result.unwrap_err();

    assert!(err.is_usage_error());
    match err {
        CliError::Pulse(PulseError::NotFound { entity, selector }) => {
            assert_eq!(entity, EntityKind::Sink);
            assert_eq!(selector, "'bluetooth'");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(transport.state.borrow().volumes.is_empty());
}

#[test]
fn malformed_volume_fails_before_connecting() {
    let (result, transport) = run(&["-s", "loud"]);
    let err = result.unwrap_err();

    assert!(matches!(
        err,
        CliError::Pulse(PulseError::Volume(VolumeError::InvalidFormat(_)))
    ));
    assert!(err.is_usage_error());
    assert_eq!(transport.state.borrow().connects, 0);
}

#[test]
fn profile_switch_requires_card_selector() {
    let (result, transport) = run(&["--set-profile", "off"]);

    assert!(matches!(
        result,
        Err(CliError::Pulse(PulseError::InvalidParameter(_)))
    ));
    assert_eq!(transport.state.borrow().connects, 0);
}

#[test]
fn profile_switch_on_named_card() {
    let (result, transport) = run(&["-C", "usb", "--set-profile", "OFF"]);

    result.unwrap();
    assert_eq!(transport.state.borrow().profiles, vec![(1, "off".to_string())]);
}

#[test]
fn unmatched_profile_submits_nothing() {
    let (result, transport) = run(&["-C", "usb", "--set-profile", "hdmi"]);

    assert!(result.unwrap_err().is_usage_error());
    assert!(transport.state.borrow().profiles.is_empty());
}

#[test]
fn refused_changes_are_a_partial_failure() {
    let transport = FakeTransport::new(fixtures::snapshot());
    transport.script(|state| state.refuse_sets = true);
    let mut manager = PulseManager::new(transport.clone());
    let service = CliService::new(parse(&["--list-sinks", "-s", "100%"]), OutputConfig::default());

    match service.execute(&mut manager) {
        Err(CliError::PartialFailure {
            failed,
            attempted,
            output,
        }) => {
            assert_eq!((failed, attempted), (2, 2));
            assert!(output.contains("(idx = 1)"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn connection_failure_is_not_a_usage_error() {
    let transport = FakeTransport::new(fixtures::snapshot());
    transport.script(|state| state.refuse_link = true);
    let mut manager = PulseManager::new(transport);
    let service = CliService::new(parse(&["-l"]), OutputConfig::default());

    let err = service.execute(&mut manager).unwrap_err();
    assert!(matches!(err, CliError::Pulse(PulseError::ConnectionFailed(_))));
    assert!(!err.is_usage_error());
}
