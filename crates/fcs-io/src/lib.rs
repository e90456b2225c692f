//! Flow Cytometry Standard (FCS) file reader, writer and transforms.
//!
//! This crate reads, edits and writes FCS 3.0/3.1 list-mode files: a fixed
//! ASCII header, a delimited keyword segment (TEXT), a binary event matrix
//! (DATA) and optional vendor segments (OTHER).
//!
//! # Features
//!
//! - Header, TEXT and OTHER descriptor validation that fails loudly
//! - Case-insensitive keyword store that preserves order and casing
//! - Per-parameter keywords with typed accessors for the standard properties
//! - Little- and big-endian 32-bit float DATA
//! - Output layout that keeps `$BEGINDATA`/`$ENDDATA` consistent with the
//!   bytes they describe
//! - Copy-on-write transforms: event subsets, gating, parameter edits,
//!   minimizing and concatenation
//! - Lazy view over CyTOF XML metadata in OTHER
//!
//! Supplemental TEXT, the ANALYSIS segment, non-float DATA and checksum
//! verification are not supported; files using them are rejected.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use fcs_io::{FcsWriterOptions, filter, read_fcs, write_fcs};
//!
//! // Read an FCS file
//! let doc = read_fcs(Path::new("sample.fcs")).unwrap();
//! println!("{} events x {} parameters", doc.tot(), doc.par());
//!
//! // Keep events with 100 <= FSC-A <= 50000
//! let gated = filter::gate(&doc, "FSC-A", Some(100.0), Some(50_000.0)).unwrap();
//!
//! // Write only the required keywords
//! write_fcs(Path::new("gated.fcs"), &gated, FcsWriterOptions::new().essential()).unwrap();
//! ```
//!
//! # Building a document
//!
//! ```
//! use fcs_io::{Document, DocumentOptions, parse_fcs, stage_document, FcsWriterOptions};
//!
//! let mut doc = Document::new(DocumentOptions::default());
//! doc.add_parameter("FSC", 0).unwrap();
//! doc.add_parameter("SSC", 1).unwrap();
//! doc.replace_matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
//!
//! let staged = stage_document(&doc, &FcsWriterOptions::default()).unwrap();
//! let reparsed = parse_fcs(&staged.to_bytes()).unwrap();
//! assert_eq!(&reparsed, staged.document());
//! ```

pub mod cytof;
pub mod data;
mod document;
mod error;
pub mod filter;
pub mod header;
mod reader;
pub mod simulate;
mod summary;
pub mod text;
mod types;
mod writer;

// Re-export error types
pub use error::{ErrorKind, FcsError, Result};

// Re-export core types
pub use cytof::{CytofDocument, CytofOther, HeaderSchema};
pub use data::{ByteOrder, DataMatrix, DataType};
pub use document::Document;
pub use summary::{ParameterSummary, Summary};
pub use text::{KeywordStore, Parameter, ParameterTable};
pub use types::{
    DEFAULT_TEXT_SLACK, DocumentOptions, FcsReaderOptions, FcsVersion, FcsWriterOptions,
    TEXT_SLACK_MARGIN,
};

// Re-export reader functionality
pub use reader::{FcsReader, parse_fcs, parse_fcs_with_options, read_fcs};

// Re-export writer functionality
pub use writer::{CHECKSUM_PLACEHOLDER, FcsWriter, StagedFcs, stage_document, write_fcs};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
