//! Unit tests for the PulseAudio service
//!
//! Drives the connection machine and manager through a scripted fake
//! transport. No PulseAudio server involved.

#![allow(clippy::panic)]


use fake::{CARDS, CLIENTS, FakeTransport, SINK_INPUTS, SINKS, SOURCES};

use crate::services::pulse::{
    ConnectionState, DeviceKind, DeviceState, EntityKind, PulseError, PulseManager, Registry,
    Selection, Selector, StreamSelector, Volume, VolumeDirective, VolumeError, VolumeTarget,
    resolve_profile,
};

fn manager() -> (PulseManager<FakeTransport>, FakeTransport) {
    let transport = FakeTransport::new(fixtures::snapshot());
    (PulseManager::new(transport.clone()), transport)
}

fn is_cleared(registry: &Registry) -> bool {
    registry.sinks().next().is_none()
        && registry.sources().next().is_none()
        && registry.clients().next().is_none()
        && registry.sink_inputs().next().is_none()
        && registry.cards().next().is_none()
}

fn connected() -> (PulseManager<FakeTransport>, FakeTransport) {
    let (mut manager, transport) = manager();
    manager.connect().unwrap();
    (manager, transport)
}

fn directive(text: &str) -> VolumeDirective {
    VolumeDirective::parse(text).unwrap()
}

mod connection {
    use super::*;

    #[test]
    fn connect_runs_stages_in_order() {
        let (manager, transport) = connected();

        assert_eq!(manager.state(), ConnectionState::Linked);
        assert_eq!(
            transport.submitted(),
            vec![SINKS, SOURCES, CLIENTS, SINK_INPUTS, CARDS]
        );
        assert_eq!(manager.registry().sinks().count(), 2);
        assert_eq!(manager.registry().sources().count(), 2);
        assert_eq!(manager.registry().clients().count(), 2);
        assert_eq!(manager.registry().sink_inputs().count(), 3);
        assert_eq!(manager.registry().cards().count(), 2);
    }

    #[test]
    fn registry_stays_empty_until_linked() {
        let (mut manager, _transport) = manager();
        manager.begin_connect().unwrap();

        let mut seen = vec![manager.state()];
        while manager.state() != ConnectionState::Linked {
            assert!(is_cleared(manager.registry()));
            seen.push(manager.poll_connect().unwrap());
        }

        seen.dedup();
        assert_eq!(
            seen,
            vec![
                ConnectionState::Connecting,
                ConnectionState::ListingSinks,
                ConnectionState::ListingSources,
                ConnectionState::ListingClients,
                ConnectionState::ListingSinkInputs,
                ConnectionState::ListingCards,
                ConnectionState::Linked,
            ]
        );
        assert!(!is_cleared(manager.registry()));
    }

    #[test]
    fn waits_in_connecting_until_server_is_ready() {
        let (mut manager, transport) = manager();
        transport.script(|s| s.ready_after = 3);
        manager.begin_connect().unwrap();

        for _ in 0..3 {
            assert_eq!(manager.poll_connect().unwrap(), ConnectionState::Connecting);
        }
        assert_eq!(manager.poll_connect().unwrap(), ConnectionState::ListingSinks);
    }

    #[test]
    fn out_of_order_release_stalls_instead_of_skipping() {
        let (mut manager, transport) = manager();
        transport.script(|s| s.hold = true);
        transport.release(SOURCES);
        transport.release(CARDS);
        manager.begin_connect().unwrap();

        for _ in 0..10 {
            manager.poll_connect().unwrap();
        }
        assert_eq!(manager.state(), ConnectionState::ListingSinks);
        assert_eq!(transport.submitted(), vec![SINKS]);

        transport.release(SINKS);
        assert_eq!(manager.poll_connect().unwrap(), ConnectionState::ListingSources);
        assert_eq!(manager.poll_connect().unwrap(), ConnectionState::ListingClients);
        assert_eq!(manager.poll_connect().unwrap(), ConnectionState::ListingClients);

        transport.release(CLIENTS);
        transport.release(SINK_INPUTS);
        while manager.poll_connect().unwrap() != ConnectionState::Linked {}
        assert_eq!(
            transport.submitted(),
            vec![SINKS, SOURCES, CLIENTS, SINK_INPUTS, CARDS]
        );
    }

    #[test]
    fn failed_connect_reports_connection_failed() {
        let (mut manager, transport) = manager();
        transport.script(|s| s.connect_fails = true);

        let err = manager.connect().unwrap_err();

        assert!(matches!(err, PulseError::ConnectionFailed(_)));
        assert_eq!(manager.state(), ConnectionState::Failed);
    }

    #[test]
    fn refused_link_fails_from_connecting() {
        let (mut manager, transport) = manager();
        transport.script(|s| s.refuse_link = true);

        let err = manager.connect().unwrap_err();

        assert!(matches!(err, PulseError::ConnectionFailed(_)));
        assert_eq!(manager.state(), ConnectionState::Failed);
        assert!(transport.submitted().is_empty());
    }

    #[test]
    fn rejected_submission_discards_partial_results() {
        let (mut manager, transport) = manager();
        transport.script(|s| s.reject = Some(CLIENTS));

        let err = manager.connect().unwrap_err();

        assert!(matches!(err, PulseError::SubmissionRejected(stage) if stage == CLIENTS));
        assert_eq!(manager.state(), ConnectionState::Failed);
        assert!(is_cleared(manager.registry()));
        assert_eq!(transport.submitted(), vec![SINKS, SOURCES]);
    }

    #[test]
    fn lost_link_mid_pipeline_fails() {
        let (mut manager, transport) = manager();
        transport.script(|s| s.lose_link_after = Some(SOURCES));

        let err = manager.connect().unwrap_err();

        assert!(matches!(err, PulseError::ConnectionFailed(_)));
        assert!(is_cleared(manager.registry()));
    }

    #[test]
    fn connect_while_linked_is_rejected() {
        let (mut manager, _transport) = connected();

        assert!(matches!(manager.connect(), Err(PulseError::AlreadyConnected)));
        assert_eq!(manager.state(), ConnectionState::Linked);
        assert!(!is_cleared(manager.registry()));
    }

    #[test]
    fn connect_while_in_flight_is_rejected() {
        let (mut manager, _transport) = manager();
        manager.begin_connect().unwrap();
        manager.poll_connect().unwrap();

        assert!(matches!(
            manager.begin_connect(),
            Err(PulseError::AlreadyConnected)
        ));
    }

    #[test]
    fn connect_after_failure_tears_down_and_retries() {
        let (mut manager, transport) = manager();
        transport.script(|s| s.connect_fails = true);
        assert!(manager.connect().is_err());

        transport.script(|s| s.connect_fails = false);
        manager.connect().unwrap();

        assert_eq!(manager.state(), ConnectionState::Linked);
        assert_eq!(transport.state.borrow().disconnects, 1);
        assert_eq!(transport.state.borrow().connects, 2);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (mut manager, transport) = connected();

        manager.disconnect();
        manager.disconnect();

        assert_eq!(manager.state(), ConnectionState::Unconnected);
        assert!(is_cleared(manager.registry()));
        assert!(!transport.state.borrow().connected);

        manager.connect().unwrap();
        assert_eq!(manager.state(), ConnectionState::Linked);
    }

    #[test]
    fn set_operations_require_a_connection() {
        let (mut manager, _transport) = manager();

        assert!(matches!(
            manager.set_mute(VolumeTarget::Sink(0), true),
            Err(PulseError::NotConnected)
        ));
    }
}

mod linking {
    use super::*;

    #[test]
    fn streams_link_to_present_client_and_sink() {
        let (manager, _transport) = connected();
        let registry = manager.registry();
        let stream = registry.sink_input(10).unwrap();

        assert_eq!(stream.client, Some(3));
        assert_eq!(stream.sink, Some(0));
        assert_eq!(registry.sink_input_client(stream).unwrap().name, "Firefox");
        assert_eq!(
            registry.sink_input_sink(stream).unwrap().name,
            "alsa_output.usb-Generic_USB_Audio"
        );
    }

    #[test]
    fn absent_references_stay_unlinked() {
        let (manager, _transport) = connected();
        let stream = manager.registry().sink_input(12).unwrap();

        assert_eq!(stream.owner_client, Some(99));
        assert_eq!(stream.client, None);
        assert_eq!(stream.owner_sink, Some(7));
        assert_eq!(stream.sink, None);
    }

    #[test]
    fn card_state_derives_from_devices() {
        let (manager, _transport) = connected();
        let registry = manager.registry();

        assert_eq!(registry.card_state(1), DeviceState::Running);
        assert_eq!(registry.card_state(0), DeviceState::Idle);
        assert_eq!(registry.card_state(42), DeviceState::Suspended);
    }
}

mod selection {
    use super::*;

    #[test]
    fn running_selects_only_running_sinks() {
        let (manager, _transport) = connected();

        assert_eq!(
            manager
                .registry()
                .select_devices(DeviceKind::Sink, Some(&Selector::Running)),
            Selection::Matched(vec![0])
        );
    }

    #[test]
    fn name_match_ignores_case() {
        let (manager, _transport) = connected();
        let registry = manager.registry();
        let upper = Selector::Name("USB".to_string());
        let lower = Selector::Name("usb".to_string());

        assert_eq!(
            registry.select_devices(DeviceKind::Sink, Some(&upper)),
            Selection::Matched(vec![0])
        );
        assert_eq!(
            registry.select_devices(DeviceKind::Sink, Some(&lower)),
            Selection::Matched(vec![0])
        );
    }

    #[test]
    fn name_match_returns_every_match() {
        let (manager, _transport) = connected();
        let selector = Selector::Name("alsa_input".to_string());

        assert_eq!(
            manager
                .registry()
                .select_devices(DeviceKind::Source, Some(&selector)),
            Selection::Matched(vec![0, 1])
        );
    }

    #[test]
    fn missing_selector_is_all_and_misses_are_not_found() {
        let (manager, _transport) = connected();
        let registry = manager.registry();

        assert_eq!(registry.select_devices(DeviceKind::Sink, None), Selection::All);
        assert_eq!(
            registry.select_devices(DeviceKind::Sink, Some(&Selector::Index(5))),
            Selection::NotFound
        );
        assert_eq!(
            registry.select_devices(DeviceKind::Sink, Some(&Selector::Index(1))),
            Selection::Matched(vec![1])
        );
    }

    #[test]
    fn running_cards_follow_their_devices() {
        let (manager, _transport) = connected();
        let registry = manager.registry();

        assert_eq!(
            registry.select_cards(Some(&Selector::Running)),
            Selection::Matched(vec![1])
        );
        assert_eq!(
            registry.select_cards(Some(&Selector::Name("PCI".to_string()))),
            Selection::Matched(vec![0])
        );
    }

    #[test]
    fn client_selector_matches_client_name_not_stream_name() {
        let (manager, _transport) = connected();
        let registry = manager.registry();
        let client = |name: &str| StreamSelector::Client(name.to_string());

        assert_eq!(
            registry.select_sink_inputs(Some(&client("fire")), false),
            Selection::Matched(vec![10])
        );
        assert_eq!(
            registry.select_sink_inputs(Some(&client("AudioStream")), false),
            Selection::NotFound
        );
    }

    #[test]
    fn non_corked_refinement_drops_paused_streams() {
        let (manager, _transport) = connected();
        let registry = manager.registry();
        let mpv = StreamSelector::Client("MPV".to_string());

        assert_eq!(
            registry.select_sink_inputs(Some(&mpv), false),
            Selection::Matched(vec![11])
        );
        assert_eq!(
            registry.select_sink_inputs(Some(&mpv), true),
            Selection::NotFound
        );
        assert_eq!(
            registry.select_sink_inputs(None, true),
            Selection::Matched(vec![10, 12])
        );
        assert_eq!(registry.select_sink_inputs(None, false), Selection::All);
    }

    #[test]
    fn profile_resolves_by_index_or_substring() {
        let (manager, _transport) = connected();
        let card = manager.registry().card(0).unwrap();

        assert_eq!(resolve_profile(card, "hdmi").unwrap().0, 1);
        assert_eq!(resolve_profile(card, "OFF").unwrap().0, 2);
        assert_eq!(resolve_profile(card, "output").unwrap().0, 0);
        assert_eq!(resolve_profile(card, "1").unwrap().1.name, "output:hdmi-stereo");
        assert!(matches!(
            resolve_profile(card, "9"),
            Err(PulseError::InvalidParameter(_))
        ));
        assert!(matches!(
            resolve_profile(card, "bluetooth"),
            Err(PulseError::InvalidParameter(_))
        ));
    }
}

mod volume_changes {
    use super::*;

    #[test]
    fn relative_change_is_submitted_and_recorded() {
        let (mut manager, transport) = connected();

        manager
            .apply_volume(VolumeTarget::Sink(0), &directive("+1000"), None)
            .unwrap();

        let expected = Volume::new(vec![33768, 33768]);
        assert_eq!(
            transport.state.borrow().volumes,
            vec![(VolumeTarget::Sink(0), expected.clone())]
        );
        assert_eq!(manager.registry().sink(0).unwrap().volume, expected);
    }

    #[test]
    fn mute_leaves_volume_untouched() {
        let (mut manager, transport) = connected();
        let before = manager.registry().sink(1).unwrap().volume.clone();

        manager
            .apply_volume(VolumeTarget::Sink(1), &directive("mute"), None)
            .unwrap();

        let state = transport.state.borrow();
        assert!(state.volumes.is_empty());
        assert_eq!(state.mutes, vec![(VolumeTarget::Sink(1), true)]);
        let sink = manager.registry().sink(1).unwrap();
        assert!(sink.muted);
        assert_eq!(sink.volume, before);
    }

    #[test]
    fn channel_list_limits_the_change() {
        let (mut manager, _transport) = connected();

        manager
            .apply_volume(VolumeTarget::Sink(0), &directive("100%"), Some(&[1, 5]))
            .unwrap();

        assert_eq!(
            manager.registry().sink(0).unwrap().volume.as_slice(),
            &[32768, 65536]
        );
    }

    #[test]
    fn unchanged_volume_is_not_submitted() {
        let (mut manager, transport) = connected();

        manager
            .apply_volume(VolumeTarget::Sink(0), &directive("+0"), None)
            .unwrap();

        assert!(transport.state.borrow().volumes.is_empty());
    }

    #[test]
    fn decrease_on_amplified_sink_starts_from_its_level() {
        let (mut manager, transport) = connected();
        let amplified = Volume::new(vec![98304, 98304]);
        manager
            .set_volume(VolumeTarget::Sink(0), amplified.clone())
            .unwrap();

        manager
            .apply_volume(VolumeTarget::Sink(0), &directive("-0"), None)
            .unwrap();
        assert_eq!(transport.state.borrow().volumes.len(), 1);
        assert_eq!(manager.registry().sink(0).unwrap().volume, amplified);

        manager
            .apply_volume(VolumeTarget::Sink(0), &directive("-1%"), None)
            .unwrap();
        assert_eq!(
            manager.registry().sink(0).unwrap().volume.as_slice(),
            &[97649, 97649]
        );
    }

    #[test]
    fn playback_stream_volume_changes() {
        let (mut manager, _transport) = connected();

        manager
            .apply_volume(VolumeTarget::SinkInput(11), &directive("/2"), None)
            .unwrap();

        assert_eq!(
            manager.registry().sink_input(11).unwrap().volume.as_slice(),
            &[5000, 10000]
        );
    }

    #[test]
    fn channel_count_mismatch_is_rejected() {
        let (mut manager, transport) = connected();

        let err = manager
            .set_volume(VolumeTarget::Sink(0), Volume::new(vec![1000]))
            .unwrap_err();

        assert!(matches!(
            err,
            PulseError::Volume(VolumeError::ChannelCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert_eq!(err.to_string(), "Expected 2 channels, got 1");
        assert!(transport.state.borrow().volumes.is_empty());
    }

    #[test]
    fn unknown_target_is_not_found() {
        let (mut manager, _transport) = connected();

        let err = manager
            .apply_volume(VolumeTarget::Source(42), &directive("10%"), None)
            .unwrap_err();

        assert!(matches!(
            err,
            PulseError::NotFound {
                entity: EntityKind::Source,
                ..
            }
        ));
    }

    #[test]
    fn refused_set_keeps_registry_value() {
        let (mut manager, transport) = connected();
        transport.script(|s| s.refuse_sets = true);

        let err = manager
            .apply_volume(VolumeTarget::Sink(0), &directive("10%"), None)
            .unwrap_err();

        assert!(matches!(err, PulseError::OperationFailed(_)));
        assert_eq!(
            manager.registry().sink(0).unwrap().volume.as_slice(),
            &[32768, 32768]
        );
    }

    #[test]
    fn batch_continues_past_failures() {
        let (mut manager, _transport) = connected();
        let targets = [
            VolumeTarget::Sink(0),
            VolumeTarget::Sink(42),
            VolumeTarget::Sink(1),
        ];

        let report = manager.apply_volume_batch(&targets, &directive("75%"), None);

        assert!(!report.is_complete());
        assert_eq!(report.attempted(), 3);
        assert_eq!(
            report.applied,
            vec![VolumeTarget::Sink(0), VolumeTarget::Sink(1)]
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, VolumeTarget::Sink(42));
        assert_eq!(
            manager.registry().sink(1).unwrap().volume.as_slice(),
            &[49152, 49152]
        );
    }
}

mod profiles {
    use super::*;

    #[test]
    fn profile_change_is_submitted_and_recorded() {
        let (mut manager, transport) = connected();

        let name = manager.set_card_profile(0, "hdmi").unwrap();

        assert_eq!(name, "output:hdmi-stereo");
        assert_eq!(
            transport.state.borrow().profiles,
            vec![(0, "output:hdmi-stereo".to_string())]
        );
        assert_eq!(manager.registry().card(0).unwrap().active_profile, Some(1));
    }

    #[test]
    fn unknown_card_is_not_found() {
        let (mut manager, _transport) = connected();

        assert!(matches!(
            manager.set_card_profile(9, "off"),
            Err(PulseError::NotFound {
                entity: EntityKind::Card,
                ..
            })
        ));
    }

    #[test]
    fn unmatched_profile_submits_nothing() {
        let (mut manager, transport) = connected();

        assert!(matches!(
            manager.set_card_profile(1, "hdmi"),
            Err(PulseError::InvalidParameter(_))
        ));
        assert!(transport.state.borrow().profiles.is_empty());
    }
}
