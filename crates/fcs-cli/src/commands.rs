//! One function per subcommand.
//!
//! Every command checks its arguments before touching any file, builds its
//! complete output in memory and only then writes it.

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, info_span};

use fcs_io::filter::{self, EnumerateFill};
use fcs_io::simulate::simulate;
use fcs_io::{CytofDocument, CytofOther, Document, FcsWriterOptions, Summary};

use crate::cli::{
    CatArgs, Command, DescribeArgs, DownsampleArgs, EnumerateArgs, FilterArgs, OtherArgs,
    ParametersArgs, ReorderArgs, RmArgs, SimulateArgs, StripArgs, Tsv2FcsArgs, ViewArgs,
};
use crate::describe::render_summary;
use crate::error::UsageError;
use crate::io::{STDIO, document_bytes, read_document, read_input, write_output};
use crate::tsv::{Lines, parse_table, render_events, render_parameters};

/// Run a parsed subcommand.
pub fn run(command: &Command) -> Result<()> {
    let span = info_span!("command", name = command_name(command));
    let _guard = span.enter();
    match command {
        Command::View(args) => run_view(args),
        Command::Describe(args) => run_describe(args),
        Command::Filter(args) => run_filter(args),
        Command::Cat(args) => run_cat(args),
        Command::Reorder(args) => run_reorder(args),
        Command::Rm(args) => run_rm(args),
        Command::Enumerate(args) => run_enumerate(args),
        Command::Downsample(args) => run_downsample(args),
        Command::Other(args) => run_other(args),
        Command::Parameters(args) => run_parameters(args),
        Command::Simulate(args) => run_simulate(args),
        Command::Tsv2fcs(args) => run_tsv2fcs(args),
        Command::Strip(args) => run_strip(args),
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::View(_) => "view",
        Command::Describe(_) => "describe",
        Command::Filter(_) => "filter",
        Command::Cat(_) => "cat",
        Command::Reorder(_) => "reorder",
        Command::Rm(_) => "rm",
        Command::Enumerate(_) => "enumerate",
        Command::Downsample(_) => "downsample",
        Command::Other(_) => "other",
        Command::Parameters(_) => "parameters",
        Command::Simulate(_) => "simulate",
        Command::Tsv2fcs(_) => "tsv2fcs",
        Command::Strip(_) => "strip",
    }
}

pub fn run_view(args: &ViewArgs) -> Result<()> {
    let document = read_document(&args.input.input)?;
    let lines = Lines::from_flags(args.no_header, args.header_only);
    let text = render_events(&document, args.simple, lines)?;
    write_output(args.output.output.as_deref(), text.as_bytes())
}

pub fn run_describe(args: &DescribeArgs) -> Result<()> {
    let document = read_document(&args.input.input)?;
    let text = render_summary(&Summary::from_document(&document));
    write_output(args.output.output.as_deref(), text.as_bytes())
}

pub fn run_filter(args: &FilterArgs) -> Result<()> {
    check_filter_args(args)?;
    let document = read_document(&args.input.input)?;

    let mut out = if let Some(range) = &args.event_range {
        filter::event_range(&document, range[0], range[1])?
    } else if let Some(count) = args.event_downsample_random {
        filter::downsample(&document, count, &mut rng(args.seed))?
    } else if let Some(name) = &args.gate {
        filter::gate(&document, name, args.min, args.max).with_context(|| {
            format!(
                "available parameters: {}",
                document.parameters().short_names().join(", ")
            )
        })?
    } else {
        document.clone()
    };
    if args.strip {
        out = filter::strip_other(&out);
    }

    info!(
        events_in = document.tot(),
        events_out = out.tot(),
        "filtered events"
    );
    write_document(args.output.output.as_deref(), &out, writer_options(args.essential))
}

/// Argument combinations clap cannot reject on its own.
pub fn check_filter_args(args: &FilterArgs) -> Result<(), UsageError> {
    let bounded = args.min.is_some() || args.max.is_some();
    match (&args.gate, bounded) {
        (Some(_), false) => return Err(UsageError::GateWithoutBounds),
        (None, true) => return Err(UsageError::BoundsWithoutGate),
        _ => {}
    }
    if let Some(range) = &args.event_range {
        check_range("--event-range", range)?;
    }
    Ok(())
}

fn check_range(what: &'static str, range: &[usize]) -> Result<(), UsageError> {
    let (start, end) = (range[0], range[1]);
    if start == 0 || end < start {
        return Err(UsageError::EventRange { what, start, end });
    }
    Ok(())
}

pub fn run_cat(args: &CatArgs) -> Result<()> {
    if args.inputs.iter().filter(|input| *input == STDIO).count() > 1 {
        return Err(UsageError::RepeatedStdin.into());
    }
    let documents = args
        .inputs
        .iter()
        .map(|input| read_document(input))
        .collect::<Result<Vec<_>>>()?;
    let (primary, others) = documents
        .split_first()
        .ok_or_else(|| anyhow!("no input files"))?;

    let out = filter::concatenate(primary, others)?;
    info!(
        inputs = documents.len(),
        events = out.tot(),
        parameters = out.par(),
        "concatenated files"
    );
    write_document(args.output.output.as_deref(), &out, FcsWriterOptions::default())
}

/// Parse `--custom` into 0-based positions.
pub fn parse_custom_order(custom: &str) -> Result<Vec<usize>, UsageError> {
    custom
        .split(',')
        .map(|item| match item.trim().parse::<usize>() {
            Ok(position) if position >= 1 => Ok(position - 1),
            _ => Err(UsageError::CustomOrder(custom.to_string())),
        })
        .collect()
}

pub fn run_reorder(args: &ReorderArgs) -> Result<()> {
    let custom = args.custom.as_deref().map(parse_custom_order).transpose()?;
    let document = read_document(&args.input.input)?;

    let mut positions: Vec<usize> = if let Some(custom) = custom {
        custom
    } else if args.short_name {
        let names = document.parameters().short_names();
        let mut positions: Vec<usize> = (0..names.len()).collect();
        positions.sort_by_key(|&p| names[p]);
        positions
    } else {
        (0..document.par()).collect()
    };
    if args.reverse {
        positions.reverse();
    }
    debug!(?positions, "new parameter order");

    let out = filter::reorder_parameters(&document, &positions)?;
    write_document(args.output.output.as_deref(), &out, FcsWriterOptions::default())
}

pub fn run_rm(args: &RmArgs) -> Result<()> {
    let document = read_document(&args.input.input)?;
    let names: Vec<&str> = args.names.iter().map(String::as_str).collect();
    let out = if args.invert {
        filter::select_parameters(&document, &names)?
    } else {
        filter::drop_parameters(&document, &names)?
    };
    info!(
        parameters_in = document.par(),
        parameters_out = out.par(),
        "removed parameters"
    );
    write_document(args.output.output.as_deref(), &out, FcsWriterOptions::default())
}

pub fn run_enumerate(args: &EnumerateArgs) -> Result<()> {
    let document = read_document(&args.input.input)?;
    let fill = args.label.map_or(EnumerateFill::AutoNumber, EnumerateFill::Label);
    let out = filter::enumerate(&document, &args.name, args.index, fill)?;
    write_document(args.output.output.as_deref(), &out, FcsWriterOptions::default())
}

pub fn run_downsample(args: &DownsampleArgs) -> Result<()> {
    if let Some(range) = &args.range {
        check_range("--range", range)?;
    }
    let document = read_document(&args.input.input)?;

    let out = match (&args.range, args.random) {
        (Some(range), _) => filter::event_range(&document, range[0], range[1])?,
        (None, Some(count)) => filter::downsample(&document, count, &mut rng(args.seed))?,
        (None, None) => document.clone(),
    };
    info!(
        events_in = document.tot(),
        events_out = out.tot(),
        "downsampled events"
    );
    write_document(args.output.output.as_deref(), &out, writer_options(args.essential))
}

pub fn run_other(args: &OtherArgs) -> Result<()> {
    if args.segment == 0 {
        return Err(UsageError::SegmentZero.into());
    }
    let document = read_document(&args.input.input)?;
    let count = document.other().len();
    let segment = document.other().get(args.segment - 1).ok_or_else(|| {
        if count == 0 {
            anyhow!("the file has no OTHER segments")
        } else {
            anyhow!(
                "OTHER segment {} out of range, choose 1 to {count}",
                args.segment
            )
        }
    })?;
    write_output(args.output.output.as_deref(), segment)
}

pub fn run_parameters(args: &ParametersArgs) -> Result<()> {
    let document = read_document(&args.input.input)?;
    let lines = Lines::from_flags(args.no_header, args.header_only);
    let mut text = render_parameters(&document, lines)?;

    if args.cytof && lines != Lines::HeaderOnly {
        let cytof = CytofDocument::new(document);
        let schema = cytof
            .other()
            .and_then(CytofOther::header_schema)
            .context("read CyTOF metadata")?;
        text.push('\n');
        if lines == Lines::All {
            text.push_str("category\trecords\n");
        }
        for category in &schema.categories {
            text.push_str(&format!("{}\t{}\n", category.name, category.records.len()));
        }
    }
    write_output(args.output.output.as_deref(), text.as_bytes())
}

pub fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let document = simulate(args.events, args.channels, &mut rng(args.seed))?;
    info!(
        events = args.events,
        channels = args.channels,
        "simulated events"
    );
    write_document(
        args.output.output.as_deref(),
        &document,
        FcsWriterOptions::default(),
    )
}

pub fn run_tsv2fcs(args: &Tsv2FcsArgs) -> Result<()> {
    let bytes = read_input(&args.input)?;
    let text = String::from_utf8(bytes).context("TSV input is not UTF-8")?;
    let document = parse_table(&text, !args.no_header)?;
    write_document(
        args.output.output.as_deref(),
        &document,
        FcsWriterOptions::default(),
    )
}

pub fn run_strip(args: &StripArgs) -> Result<()> {
    let document = read_document(&args.input.input)?;
    let out = filter::strip_other(&document);
    write_document(args.output.output.as_deref(), &out, writer_options(args.essential))
}

fn writer_options(essential: bool) -> FcsWriterOptions {
    if essential {
        FcsWriterOptions::new().essential()
    } else {
        FcsWriterOptions::new()
    }
}

fn write_document(
    output: Option<&std::path::Path>,
    document: &Document,
    options: FcsWriterOptions,
) -> Result<()> {
    let bytes = document_bytes(document, &options)?;
    write_output(output, &bytes)
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
