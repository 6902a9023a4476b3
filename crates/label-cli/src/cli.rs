//! CLI argument definitions for `partlabel`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use label_core::{ATTRIBUTES_COLUMN, DEFAULT_RESISTOR_FAMILY};

#[derive(Parser)]
#[command(
    name = "partlabel",
    version,
    about = "Generate part label tables from supplier catalog attributes",
    long_about = "Generate part label tables from supplier catalog attributes.\n\n\
                  Reads a CSV of parts with a serialized attributes column, renders\n\
                  label titles, packages and descriptions from a family rule table,\n\
                  and computes resistor color bands."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Rule table to use instead of $PARTLABEL_RULES or the bundled default.
    #[arg(long = "rules", value_name = "PATH", global = true)]
    pub rules: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render label text, background and resistor colors for every part.
    Label(LabelArgs),

    /// Copy raw supplier attributes into label columns.
    Fields(FieldsArgs),

    /// Add per-slot resistor colors to a drawer label table.
    Slots(SlotsArgs),

    /// Combine resistor rows sharing a grid cell into one label.
    Combine(IoArgs),

    /// Report which family labels the rule table covers.
    Check(CheckArgs),

    /// List the families in the rule table.
    Families,

    /// Print the color bands for a resistance value.
    Decode(DecodeArgs),
}

#[derive(Args)]
pub struct IoArgs {
    /// Input CSV file.
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: PathBuf,

    /// Output CSV file.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct LabelArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Column holding the serialized supplier attributes.
    #[arg(long = "attributes-column", default_value = ATTRIBUTES_COLUMN)]
    pub attributes_column: String,

    /// Family that gets resistor color bands (repeatable).
    #[arg(
        long = "resistor-family",
        value_name = "FAMILY",
        default_value = DEFAULT_RESISTOR_FAMILY
    )]
    pub resistor_families: Vec<String>,
}

#[derive(Args)]
pub struct FieldsArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Column holding the serialized supplier attributes.
    #[arg(long = "attributes-column", default_value = ATTRIBUTES_COLUMN)]
    pub attributes_column: String,
}

#[derive(Args)]
pub struct SlotsArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Number of `val_N` slot columns on each label.
    #[arg(long = "slots", default_value_t = 3)]
    pub slots: usize,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Input CSV file.
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: PathBuf,

    /// Column holding the serialized supplier attributes.
    #[arg(long = "attributes-column", default_value = ATTRIBUTES_COLUMN)]
    pub attributes_column: String,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Resistance such as 4.7k, 100 or 1M.
    #[arg(value_name = "VALUE")]
    pub value: String,

    /// Tolerance such as 5% for the fourth band.
    #[arg(long = "tolerance")]
    pub tolerance: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
