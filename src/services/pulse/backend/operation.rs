use futures::channel::oneshot;

use crate::services::pulse::error::PulseError;

/// Progress of a submitted request
#[derive(Debug, PartialEq)]
pub enum OperationState<T> {
    /// Completion has not been delivered yet
    Running,
    /// Request completed with a value
    Done(T),
}

/// Create a linked completer/pending pair for one request
///
/// The completer moves into the server callback, the pending handle stays
/// with the caller and is polled between loop iterations.
pub fn operation<T>(label: impl Into<String>) -> (Completer<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    let label = label.into();
    (
        Completer {
            tx: Some(tx),
            label: label.clone(),
        },
        Pending {
            rx,
            label,
            finished: false,
        },
    )
}

/// Delivers the single result of a request
pub struct Completer<T> {
    tx: Option<oneshot::Sender<Result<T, PulseError>>>,
    label: String,
}

impl<T> Completer<T> {
    /// Deliver a successful result, later deliveries are ignored
    pub fn complete(&mut self, value: T) {
        self.deliver(Ok(value));
    }

    /// Deliver a failure, later deliveries are ignored
    pub fn fail(&mut self, error: PulseError) {
        self.deliver(Err(error));
    }

    /// Whether a result has already been delivered
    pub fn is_complete(&self) -> bool {
        self.tx.is_none()
    }

    /// Request label used in error messages
    pub fn label(&self) -> &str {
        &self.label
    }

    fn deliver(&mut self, result: Result<T, PulseError>) {
        if let Some(tx) = self.tx.take() {
            // Receiver may already be gone after a disconnect.
            let _ = tx.send(result);
        }
    }
}

/// Caller-side handle of a submitted request
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T, PulseError>>,
    label: String,
    finished: bool,
}

impl<T> Pending<T> {
    /// Request label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check for a delivered result without blocking
    ///
    /// # Errors
    /// Returns the delivered failure, `OperationFailed` if the completer
    /// was dropped without delivering, or if the result was already taken
    pub fn poll(&mut self) -> Result<OperationState<T>, PulseError> {
        if self.finished {
            return Err(PulseError::OperationFailed(format!(
                "{} result already consumed",
                self.label
            )));
        }
        match self.rx.try_recv() {
            Ok(None) => Ok(OperationState::Running),
            Ok(Some(result)) => {
                self.finished = true;
                result.map(OperationState::Done)
            }
            Err(oneshot::Canceled) => {
                self.finished = true;
                Err(PulseError::OperationFailed(format!(
                    "{} was dropped before completing",
                    self.label
                )))
            }
        }
    }
}

impl<T> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending")
            .field("label", &self.label)
            .field("finished", &self.finished)
            .finish()
    }
}
