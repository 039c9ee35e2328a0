/// Client and playback stream types
pub mod info;

pub use info::*;
