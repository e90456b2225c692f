//! CLI argument definitions for `fcsio`.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fcsio",
    version,
    about = "Work with FCS (Flow Cytometry Standard) files from the command line",
    long_about = "Inspect, filter and rewrite FCS 3.0/3.1 list-mode files.\n\n\
                  Every command reads a file path or '-' for standard input. Gzip\n\
                  input is detected automatically; output paths ending in '.gz'\n\
                  are compressed."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the event matrix as TSV.
    View(ViewArgs),

    /// Describe the header, TEXT and DATA segments.
    Describe(DescribeArgs),

    /// Select events by range, random draw or gate.
    Filter(FilterArgs),

    /// Concatenate files on their shared parameters.
    Cat(CatArgs),

    /// Reorder parameters.
    Reorder(ReorderArgs),

    /// Remove parameters, or keep only the named ones.
    Rm(RmArgs),

    /// Add a parameter numbering or labelling every event.
    Enumerate(EnumerateArgs),

    /// Keep a range or a random subset of events.
    Downsample(DownsampleArgs),

    /// Write the raw bytes of an OTHER segment.
    Other(OtherArgs),

    /// List parameter short and long names.
    Parameters(ParametersArgs),

    /// Generate a synthetic file.
    Simulate(SimulateArgs),

    /// Convert a TSV table into an FCS file.
    Tsv2fcs(Tsv2FcsArgs),

    /// Drop OTHER segments.
    Strip(StripArgs),
}

/// Input path shared by the single-input commands.
#[derive(Args)]
pub struct InputArg {
    /// Input FCS file, or '-' for standard input (gzip is detected).
    #[arg(value_name = "INPUT")]
    pub input: String,
}

/// Output destination shared by every command.
#[derive(Args)]
pub struct OutputArg {
    /// Output file (compressed when it ends in '.gz'); standard output if unset.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,

    /// Round values to this many decimals and trim trailing zeros.
    #[arg(short = 's', long = "simple", value_name = "DECIMALS", num_args = 0..=1, default_missing_value = "2")]
    pub simple: Option<usize>,

    /// Leave out the header line of short names.
    #[arg(long = "no-header", conflicts_with = "header_only")]
    pub no_header: bool,

    /// Only print the header line.
    #[arg(short = 'R', long = "header-only")]
    pub header_only: bool,
}

#[derive(Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,
}

#[derive(Args)]
#[command(group(ArgGroup::new("selection").args(["event_range", "event_downsample_random", "gate"])))]
pub struct FilterArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,

    /// Only write required keywords; drops OTHER segments too.
    #[arg(long = "essential")]
    pub essential: bool,

    /// Drop OTHER segments.
    #[arg(long = "strip")]
    pub strip: bool,

    /// Keep events START through END (1-based, inclusive).
    #[arg(long = "event-range", num_args = 2, value_names = ["START", "END"])]
    pub event_range: Option<Vec<usize>>,

    /// Keep this many randomly drawn events.
    #[arg(long = "event-downsample-random", value_name = "COUNT")]
    pub event_downsample_random: Option<usize>,

    /// Gate on the parameter with this short name; needs --min and/or --max.
    #[arg(long = "gate", value_name = "SHORT_NAME")]
    pub gate: Option<String>,

    /// Drop events below this value.
    #[arg(long = "min", allow_negative_numbers = true)]
    pub min: Option<f32>,

    /// Drop events above this value.
    #[arg(long = "max", allow_negative_numbers = true)]
    pub max: Option<f32>,

    /// Seed for the random draw.
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct CatArgs {
    /// Input files; '-' reads standard input and may appear once.
    #[arg(value_name = "INPUTS", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    #[command(flatten)]
    pub output: OutputArg,
}

#[derive(Args)]
pub struct ReorderArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,

    /// Sort parameters alphabetically by short name.
    #[arg(long = "short-name", conflicts_with = "custom")]
    pub short_name: bool,

    /// Comma-separated 1-based positions, e.g. 3,1,2.
    #[arg(long = "custom", value_name = "POSITIONS")]
    pub custom: Option<String>,

    /// Reverse the resulting order.
    #[arg(short = 'r', long = "reverse")]
    pub reverse: bool,
}

#[derive(Args)]
pub struct RmArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,

    /// Short names of the parameters to remove.
    #[arg(short = 'n', long = "names", value_name = "NAMES", required = true, num_args = 1..)]
    pub names: Vec<String>,

    /// Keep the named parameters and remove the rest.
    #[arg(short = 'i', long = "inv")]
    pub invert: bool,
}

#[derive(Args)]
pub struct EnumerateArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,

    /// Short name of the new parameter.
    #[arg(short = 'n', long = "name", value_name = "SHORT_NAME")]
    pub name: String,

    /// 0-based position of the new parameter.
    #[arg(short = 'i', long = "index", default_value_t = 0)]
    pub index: usize,

    /// Number events 1, 2, 3, ... (the default).
    #[arg(short = 'a', long = "auto", conflicts_with = "label")]
    pub auto: bool,

    /// Give every event this value instead.
    #[arg(long = "label", allow_negative_numbers = true)]
    pub label: Option<f32>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("selection").required(true).args(["range", "random"])))]
pub struct DownsampleArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,

    /// Keep events START through END (1-based, inclusive).
    #[arg(long = "range", num_args = 2, value_names = ["START", "END"])]
    pub range: Option<Vec<usize>>,

    /// Keep this many randomly drawn events.
    #[arg(long = "random", value_name = "COUNT")]
    pub random: Option<usize>,

    /// Only write required keywords.
    #[arg(long = "essential")]
    pub essential: bool,

    /// Seed for the random draw.
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct OtherArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,

    /// Segment number, starting at 1.
    #[arg(short = 'n', long = "segment-number", default_value_t = 1)]
    pub segment: usize,
}

#[derive(Args)]
pub struct ParametersArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,

    /// Also list the categories of embedded CyTOF XML.
    #[arg(long = "cytof")]
    pub cytof: bool,

    /// Leave out the header line.
    #[arg(long = "no-header", conflicts_with = "header_only")]
    pub no_header: bool,

    /// Only print the header line.
    #[arg(short = 'R', long = "header-only")]
    pub header_only: bool,
}

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub output: OutputArg,

    /// Number of events.
    #[arg(short = 'n', long = "events", default_value_t = 10_000)]
    pub events: usize,

    /// Number of simulated channels.
    #[arg(short = 'c', long = "channels", default_value_t = 5)]
    pub channels: usize,

    /// Seed for the generator.
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

#[derive(Args)]
pub struct Tsv2FcsArgs {
    /// Input TSV file, or '-' for standard input (gzip is detected).
    #[arg(value_name = "INPUT")]
    pub input: String,

    #[command(flatten)]
    pub output: OutputArg,

    /// The first line is data; name parameters Param_1, Param_2, ...
    #[arg(long = "no-header")]
    pub no_header: bool,
}

#[derive(Args)]
pub struct StripArgs {
    #[command(flatten)]
    pub input: InputArg,

    #[command(flatten)]
    pub output: OutputArg,

    /// Also drop every keyword outside the required set.
    #[arg(long = "essential")]
    pub essential: bool,
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
