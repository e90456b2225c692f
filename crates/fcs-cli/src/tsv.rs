//! Tab-separated text in and out.

use anyhow::{Context, Result, anyhow, bail};
use csv::{Position, ReaderBuilder, Writer, WriterBuilder};

use fcs_io::Document;

/// Format a value, optionally rounded to `decimals` with trailing zeros
/// trimmed (`1.50` becomes `1.5`, `2.00` becomes `2`).
pub fn format_value(value: f32, decimals: Option<usize>) -> String {
    let Some(decimals) = decimals else {
        return value.to_string();
    };
    let rounded = format!("{value:.decimals$}");
    if rounded.contains('.') {
        rounded
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        rounded
    }
}

/// Which lines of a table to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lines {
    All,
    NoHeader,
    HeaderOnly,
}

impl Lines {
    pub fn from_flags(no_header: bool, header_only: bool) -> Self {
        match (no_header, header_only) {
            (true, _) => Self::NoHeader,
            (_, true) => Self::HeaderOnly,
            _ => Self::All,
        }
    }

    fn header(self) -> bool {
        self != Self::NoHeader
    }

    fn body(self) -> bool {
        self != Self::HeaderOnly
    }
}

/// Short names, then one line per event.
pub fn render_events(document: &Document, decimals: Option<usize>, lines: Lines) -> Result<String> {
    let mut writer = tsv_writer();
    if lines.header() {
        writer.write_record(document.parameters().short_names())?;
    }
    if lines.body() {
        for row in document.matrix().iter_rows() {
            writer.write_record(row.iter().map(|v| format_value(*v, decimals)))?;
        }
    }
    finish(writer)
}

/// `$PnN` and `$PnS` of every parameter.
pub fn render_parameters(document: &Document, lines: Lines) -> Result<String> {
    let mut writer = tsv_writer();
    if lines.header() {
        writer.write_record(["$PnN", "$PnS"])?;
    }
    if lines.body() {
        for parameter in document.parameters().iter() {
            writer.write_record([
                parameter.short_name().unwrap_or(""),
                parameter.long_name().unwrap_or(""),
            ])?;
        }
    }
    finish(writer)
}

fn tsv_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new().delimiter(b'\t').from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("flush TSV output: {}", err.error()))?;
    String::from_utf8(bytes).context("TSV output is not UTF-8")
}

/// Parse a TSV table into a document with one parameter per column.
///
/// Without a header line the parameters are named `Param_1`, `Param_2`, ...
/// Blank lines are skipped.
pub fn parse_table(text: &str, has_header: bool) -> Result<Document> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_header)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Option<Vec<String>> = if has_header {
        let names: Vec<String> = reader
            .headers()
            .context("read TSV header")?
            .iter()
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            bail!("empty input, cannot build an FCS file from nothing");
        }
        Some(names)
    } else {
        None
    };

    let mut width = header.as_ref().map(Vec::len);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("read TSV record")?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, Position::line);
        let expected = *width.get_or_insert(record.len());
        if record.len() != expected {
            bail!("line {line}: expected {expected} values, found {}", record.len());
        }
        let row = record
            .iter()
            .map(|cell| {
                cell.trim()
                    .parse::<f32>()
                    .with_context(|| format!("line {line}: {cell:?} is not a number"))
            })
            .collect::<Result<Vec<f32>>>()?;
        rows.push(row);
    }
    if rows.is_empty() {
        bail!("input has no events, cannot build an empty FCS file");
    }

    let names = header.unwrap_or_else(|| {
        (1..=rows[0].len()).map(|i| format!("Param_{i}")).collect()
    });
    let mut document = Document::default();
    for (position, name) in names.iter().enumerate() {
        document
            .add_parameter(name, position)
            .with_context(|| format!("add parameter {name:?}"))?;
    }
    document
        .replace_matrix(rows)
        .context("every row needs one value per parameter")?;
    Ok(document)
}
