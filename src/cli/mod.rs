//! Command-line interface.
//!
//! Parses pavolctl's flags, runs the requested listings and changes
//! against a [`PulseManager`](crate::services::PulseManager) and renders
//! the result as text or JSON.

mod args;
pub mod formatting;
mod service;
mod types;

pub use args::Cli;
pub use service::CliService;
pub use types::{CliError, CommandResult};

#[cfg(test)]
mod tests;
