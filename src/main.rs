//! pavolctl - Main entry point
//!
//! Parses the command line, loads the optional configuration file and
//! runs one invocation against the PulseAudio server.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use pavolctl::{
    cli::{Cli, CliError, CliService, formatting::format_error},
    config::Config,
    services::PulseManager,
    tracing_config,
};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if !cli.has_actions() {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    }

    let mut color = !cli.no_color;
    let config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(mut config) => {
            cli.apply_overrides(&mut config);
            color = config.output.color;
            config
        }
        Err(e) => {
            report(&CliError::from(e), color);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tracing_config::init_cli_mode(config.general.log_level) {
        eprintln!("Failed to initialise logging: {e}");
    }

    match run_cli_command(cli, &config) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let CliError::PartialFailure { output, .. } = &e {
                print!("{output}");
            }
            report(&e, color);
            ExitCode::FAILURE
        }
    }
}

/// Executes the invocation through the CliService.
///
/// # Errors
/// Returns the service's error.
fn run_cli_command(cli: Cli, config: &Config) -> Result<String, CliError> {
    let mut manager = PulseManager::from_config(&config.pulse);
    let service = CliService::new(cli, config.output.clone());
    service.execute(&mut manager)
}

/// Prints an error to stderr, preceded by the usage line for input errors.
fn report(error: &CliError, color: bool) {
    if error.is_usage_error() {
        eprintln!("{}", Cli::command().render_usage());
    }
    eprintln!("{}", format_error(&format!("Error: {error}"), color));
}
