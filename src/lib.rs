//! pavolctl - PulseAudio volume control from the command line.
//!
//! Connects to a PulseAudio server, lists its sinks, sources, cards and
//! playback streams, and changes their volume, mute flag or profile.
//! The main features include:
//!
//! - A blocking connection pipeline over the callback-driven libpulse API
//! - Volume expressions such as `50%`, `+5%`, `*10%` or `mute`
//! - Selection by index, name substring or running state
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pavolctl::{config::PulseConfig, services::PulseManager};
//!
//! let mut manager = PulseManager::from_config(&PulseConfig::default());
//! manager.connect()?;
//!
//! for sink in manager.registry().sinks() {
//!     println!("{}: {:?}", sink.name, sink.volume.as_slice());
//! }
//! # Ok::<(), pavolctl::services::PulseError>(())
//! ```

/// Configuration schema definitions and loading.
pub mod config;

/// Command-line interface.
pub mod cli;

/// PulseAudio service.
pub mod services;

/// Logging setup.
pub mod tracing_config;
