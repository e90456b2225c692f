//! Input and output plumbing shared by every command.
//!
//! Inputs are read completely into memory before anything is parsed, and
//! outputs are assembled completely before the first byte is written, so a
//! failing command never leaves a truncated file behind.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::debug;

use fcs_io::{Document, FcsWriterOptions, parse_fcs, stage_document};

/// Leading bytes of a gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Name used for standard input and output.
pub const STDIO: &str = "-";

/// Read a path, or standard input for `-`, inflating gzip transparently.
pub fn read_input(input: &str) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    if input == STDIO {
        io::stdin()
            .lock()
            .read_to_end(&mut raw)
            .context("read standard input")?;
    } else {
        File::open(input)
            .and_then(|mut file| file.read_to_end(&mut raw))
            .with_context(|| format!("read {input}"))?;
    }
    gunzip_if_needed(raw).with_context(|| format!("decompress {input}"))
}

/// Inflate `raw` when it starts with the gzip magic bytes.
pub fn gunzip_if_needed(raw: Vec<u8>) -> io::Result<Vec<u8>> {
    if !raw.starts_with(&GZIP_MAGIC) {
        return Ok(raw);
    }
    let mut inflated = Vec::new();
    GzDecoder::new(raw.as_slice()).read_to_end(&mut inflated)?;
    debug!(
        compressed = raw.len(),
        inflated = inflated.len(),
        "inflated gzip input"
    );
    Ok(inflated)
}

/// Read and parse an FCS document.
pub fn read_document(input: &str) -> Result<Document> {
    let bytes = read_input(input)?;
    parse_fcs(&bytes).with_context(|| format!("parse {input}"))
}

/// Serialize a document into FCS bytes.
pub fn document_bytes(document: &Document, options: &FcsWriterOptions) -> Result<Vec<u8>> {
    let staged = stage_document(document, options).context("lay out FCS output")?;
    Ok(staged.to_bytes())
}

/// Write finished bytes to a path (gzip for `.gz`) or to standard output.
pub fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match output {
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).context("write standard output")?;
            stdout.flush().context("flush standard output")?;
        }
        Some(path) if path.as_os_str() == STDIO => write_output(None, bytes)?,
        Some(path) => {
            let payload = if is_gzip_path(path) {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(bytes)?;
                encoder.finish().context("compress output")?
            } else {
                bytes.to_vec()
            };
            std::fs::write(path, payload)
                .with_context(|| format!("write {}", path.display()))?;
        }
    }
    Ok(())
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}
