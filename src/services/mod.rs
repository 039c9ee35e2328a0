/// PulseAudio control service
pub mod pulse;

pub use pulse::{PulseError, PulseManager};
