/// Volume errors
pub mod error;
/// Volume directive parsing and per-channel application
pub mod expression;
/// Volume types
pub mod types;

pub use error::VolumeError;
pub use expression::{VolumeChange, VolumeDirective, VolumeOperator};
pub use types::{VOLUME_NORM, Volume, percentage};
