//! Part label table generator CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use label_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use label_cli::commands::{
    run_check, run_combine, run_decode, run_families, run_fields, run_label, run_slots,
};
use label_cli::logging::{LogConfig, LogFormat, init_logging};
use label_cli::summary::{print_coverage, print_summary};
use label_cli::types::RunSummary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let rules = cli.rules.as_deref();
    let exit_code = match &cli.command {
        Command::Label(args) => summary_exit(run_label(args, rules)),
        Command::Fields(args) => summary_exit(run_fields(args)),
        Command::Slots(args) => summary_exit(run_slots(args)),
        Command::Combine(args) => summary_exit(run_combine(args)),
        Command::Check(args) => match run_check(args, rules) {
            Ok(report) => {
                print_coverage(&report);
                i32::from(report.uncovered() > 0)
            }
            Err(error) => report_error(&error),
        },
        Command::Families => unit_exit(run_families(rules)),
        Command::Decode(args) => unit_exit(run_decode(args)),
    };
    std::process::exit(exit_code);
}

fn summary_exit(result: anyhow::Result<RunSummary>) -> i32 {
    match result {
        Ok(summary) => {
            print_summary(&summary);
            0
        }
        Err(error) => report_error(&error),
    }
}

fn unit_exit(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(error) => report_error(&error),
    }
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Logging setup from the global flags. An explicit `--log-level` beats
/// `-v`/`-q`, and either one turns `RUST_LOG` off.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig::default()
        .with_level_filter(level)
        .with_env_filter(!(cli.verbosity.is_present() || cli.log_level.is_some()))
        .with_format(format)
        .with_ansi(ansi)
        .with_log_file(cli.log_file.clone())
}
