//! Option types for FCS file handling.

mod options;

pub use options::{
    DEFAULT_TEXT_SLACK, DocumentOptions, FcsReaderOptions, FcsVersion, FcsWriterOptions,
    TEXT_SLACK_MARGIN,
};
