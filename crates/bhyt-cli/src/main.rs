//! BHYT settlement reporting CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};

mod cli;
mod commands;
mod logging;
mod render;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::logging::{LogConfig, LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Periods => commands::run_periods(&cli.data_dir),
        Command::Departments(args) => commands::run_departments(&cli.data_dir, args),
        Command::Report(report) => commands::run_report(&cli.data_dir, report),
        Command::Import(args) => commands::run_import(&cli.data_dir, args),
        Command::Purge(args) => commands::run_purge(&cli.data_dir, args),
        Command::Lookup(lookup) => commands::run_lookup(&cli.data_dir, lookup),
        Command::Profile(profile) => commands::run_profile(&cli.data_dir, profile),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !cli.verbosity.is_present();
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
