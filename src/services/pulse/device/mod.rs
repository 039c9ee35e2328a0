/// Card and profile types
pub mod card;
/// Volume-bearing entity capability
pub mod control;
/// Device information types and structures
pub mod info;

pub use card::*;
pub use control::*;
pub use info::*;
