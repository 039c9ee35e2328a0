use std::sync::mpsc;

use libpulse_binding::{
    callbacks::ListResult,
    context::{Context, FlagSet as ContextFlags, State as ContextState},
    mainloop::standard::{IterateResult, Mainloop},
};
use tracing::debug;

use super::{
    conversion::{
        convert_volume_to_pulse, create_card_info, create_client_info,
        create_device_info_from_sink, create_device_info_from_source, create_sink_input_info,
    },
    operation::{Completer, Pending, operation},
    types::{LinkState, PendingList, Transport},
};
use crate::{
    config::PulseConfig,
    services::pulse::{
        device::{CardInfo, DeviceInfo, VolumeTarget},
        error::PulseError,
        stream::{ClientInfo, SinkInputInfo},
        volume::Volume,
    },
};

/// Transport over a libpulse standard mainloop and context
pub struct PulseTransport {
    application_name: String,
    server: Option<String>,
    connection: Option<Connection>,
}

/// Live context and the mainloop that drives it
///
/// Field order matters, the context must drop before its mainloop.
struct Connection {
    context: Context,
    mainloop: Mainloop,
    state_rx: mpsc::Receiver<()>,
    state: ContextState,
}

impl PulseTransport {
    /// Create an unconnected transport
    pub fn new(config: &PulseConfig) -> Self {
        Self {
            application_name: config.application_name.clone(),
            server: config.server.clone(),
            connection: None,
        }
    }

    fn connection(&mut self, label: &str) -> Result<&mut Connection, PulseError> {
        match self.connection.as_mut() {
            Some(connection) if connection.state == ContextState::Ready => Ok(connection),
            _ => Err(PulseError::SubmissionRejected(label.to_string())),
        }
    }

    fn list<T>(
        &mut self,
        label: &str,
        submit: impl FnOnce(&Context, ListCollector<T>),
    ) -> Result<PendingList<T>, PulseError> {
        let connection = self.connection(label)?;
        let (completer, pending) = operation(label);
        submit(&connection.context, ListCollector::new(completer, label));
        debug!(operation = label, "Submitted listing");
        Ok(pending)
    }
}

impl Connection {
    fn refresh_state(&mut self) {
        if self.state_rx.try_iter().count() == 0 {
            return;
        }
        let state = self.context.get_state();
        if state != self.state {
            debug!(from = ?self.state, to = ?state, "Context state changed");
            self.state = state;
        }
    }
}

/// Accumulates list callback items into one completion
struct ListCollector<T> {
    completer: Completer<Vec<T>>,
    items: Vec<T>,
    label: String,
}

impl<T> ListCollector<T> {
    fn new(completer: Completer<Vec<T>>, label: &str) -> Self {
        Self {
            completer,
            items: Vec::new(),
            label: label.to_string(),
        }
    }

    fn handle<I: ?Sized>(&mut self, result: ListResult<&I>, convert: impl Fn(&I) -> T) {
        match result {
            ListResult::Item(info) => self.items.push(convert(info)),
            ListResult::End => {
                let items = std::mem::take(&mut self.items);
                debug!(operation = %self.label, count = items.len(), "Listing complete");
                self.completer.complete(items);
            }
            ListResult::Error => {
                self.items.clear();
                self.completer
                    .fail(PulseError::OperationFailed(self.label.clone()));
            }
        }
    }
}

fn confirmation(label: &str) -> (Box<dyn FnMut(bool) + 'static>, Pending<()>) {
    let (mut completer, pending) = operation(label);
    let callback: Box<dyn FnMut(bool) + 'static> = Box::new(move |success: bool| {
        if success {
            completer.complete(());
        } else {
            let label = completer.label().to_string();
            completer.fail(PulseError::OperationFailed(label));
        }
    });
    (callback, pending)
}

impl Transport for PulseTransport {
    fn connect(&mut self) -> Result<(), PulseError> {
        self.disconnect();

        let mainloop = Mainloop::new().ok_or_else(|| {
            PulseError::ConnectionFailed("Failed to create mainloop".to_string())
        })?;
        let mut context = Context::new(&mainloop, &self.application_name).ok_or_else(|| {
            PulseError::ConnectionFailed("Failed to create context".to_string())
        })?;

        let (state_tx, state_rx) = mpsc::channel();
        context.set_state_callback(Some(Box::new(move || {
            // Receiver outlives the context, a failed send means teardown.
            let _ = state_tx.send(());
        })));

        context
            .connect(self.server.as_deref(), ContextFlags::NOFLAGS, None)
            .map_err(|e| PulseError::ConnectionFailed(format!("Connection failed: {e}")))?;

        let state = context.get_state();
        self.connection = Some(Connection {
            context,
            mainloop,
            state_rx,
            state,
        });
        Ok(())
    }

    fn iterate(&mut self) -> Result<(), PulseError> {
        let connection = self.connection.as_mut().ok_or(PulseError::NotConnected)?;
        match connection.mainloop.iterate(true) {
            IterateResult::Success(_) => {
                connection.refresh_state();
                Ok(())
            }
            IterateResult::Quit(_) => Err(PulseError::ConnectionFailed(
                "Mainloop quit unexpectedly".to_string(),
            )),
            IterateResult::Err(e) => Err(PulseError::ConnectionFailed(format!(
                "Mainloop iteration failed: {e}"
            ))),
        }
    }

    fn link_state(&self) -> LinkState {
        match self.connection.as_ref().map(|c| c.state) {
            Some(ContextState::Ready) => LinkState::Ready,
            Some(ContextState::Failed | ContextState::Terminated) | None => LinkState::Failed,
            Some(_) => LinkState::Pending,
        }
    }

    fn list_sinks(&mut self) -> Result<PendingList<DeviceInfo>, PulseError> {
        self.list("sink listing", |context, mut collector| {
            context
                .introspect()
                .get_sink_info_list(move |result| {
                    collector.handle(result, create_device_info_from_sink);
                });
        })
    }

    fn list_sources(&mut self) -> Result<PendingList<DeviceInfo>, PulseError> {
        self.list("source listing", |context, mut collector| {
            context
                .introspect()
                .get_source_info_list(move |result| {
                    collector.handle(result, create_device_info_from_source);
                });
        })
    }

    fn list_clients(&mut self) -> Result<PendingList<ClientInfo>, PulseError> {
        self.list("client listing", |context, mut collector| {
            context
                .introspect()
                .get_client_info_list(move |result| {
                    collector.handle(result, create_client_info);
                });
        })
    }

    fn list_sink_inputs(&mut self) -> Result<PendingList<SinkInputInfo>, PulseError> {
        self.list("playback stream listing", |context, mut collector| {
            context
                .introspect()
                .get_sink_input_info_list(move |result| {
                    collector.handle(result, create_sink_input_info);
                });
        })
    }

    fn list_cards(&mut self) -> Result<PendingList<CardInfo>, PulseError> {
        self.list("card listing", |context, mut collector| {
            context
                .introspect()
                .get_card_info_list(move |result| {
                    collector.handle(result, create_card_info);
                });
        })
    }

    fn set_volume(
        &mut self,
        target: VolumeTarget,
        volume: &Volume,
    ) -> Result<Pending<()>, PulseError> {
        let label = format!("set volume of {target}");
        let channel_volumes = convert_volume_to_pulse(volume)?;
        let connection = self.connection(&label)?;
        let (callback, pending) = confirmation(&label);
        let mut introspect = connection.context.introspect();

        match target {
            VolumeTarget::Sink(index) => {
                introspect.set_sink_volume_by_index(index, &channel_volumes, Some(callback));
            }
            VolumeTarget::Source(index) => {
                introspect.set_source_volume_by_index(index, &channel_volumes, Some(callback));
            }
            VolumeTarget::SinkInput(index) => {
                introspect.set_sink_input_volume(index, &channel_volumes, Some(callback));
            }
        }
        debug!(operation = %label, "Submitted volume change");
        Ok(pending)
    }

    fn set_mute(&mut self, target: VolumeTarget, muted: bool) -> Result<Pending<()>, PulseError> {
        let label = format!("set mute of {target}");
        let connection = self.connection(&label)?;
        let (callback, pending) = confirmation(&label);
        let mut introspect = connection.context.introspect();

        match target {
            VolumeTarget::Sink(index) => {
                introspect.set_sink_mute_by_index(index, muted, Some(callback));
            }
            VolumeTarget::Source(index) => {
                introspect.set_source_mute_by_index(index, muted, Some(callback));
            }
            VolumeTarget::SinkInput(index) => {
                introspect.set_sink_input_mute(index, muted, Some(callback));
            }
        }
        debug!(operation = %label, muted, "Submitted mute change");
        Ok(pending)
    }

    fn set_card_profile(&mut self, card: u32, profile: &str) -> Result<Pending<()>, PulseError> {
        let label = format!("set profile of card {card}");
        let connection = self.connection(&label)?;
        let (callback, pending) = confirmation(&label);

        connection
            .context
            .introspect()
            .set_card_profile_by_index(card, profile, Some(callback));
        debug!(operation = %label, profile, "Submitted profile change");
        Ok(pending)
    }

    fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.context.set_state_callback(None);
            connection.context.disconnect();
            debug!("Disconnected from PulseAudio");
        }
    }
}

impl Drop for PulseTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}
