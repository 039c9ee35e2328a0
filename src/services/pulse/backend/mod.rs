/// libpulse to domain data conversion
pub mod conversion;
/// Single-shot completion signal for submitted requests
pub mod operation;
/// libpulse mainloop transport
pub mod pulse;
/// Transport contract and link state
pub mod types;

pub use conversion::{convert_volume_from_pulse, convert_volume_to_pulse};
pub use operation::{Completer, OperationState, Pending, operation};
pub use pulse::PulseTransport;
pub use types::{LinkState, PendingList, Transport};
