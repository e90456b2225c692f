//! Argument misuse that clap cannot express.

use thiserror::Error;

/// Exit status for usage errors, matching clap's own.
pub const USAGE_EXIT_CODE: i32 = 2;

/// An argument combination rejected before any file is opened.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("--gate needs --min and/or --max")]
    GateWithoutBounds,

    #[error("--min and --max only apply with --gate")]
    BoundsWithoutGate,

    #[error("standard input ('-') can only be read once")]
    RepeatedStdin,

    #[error("--custom expects comma-separated positions starting at 1, got {0:?}")]
    CustomOrder(String),

    #[error("{what} start must be at least 1 and not after the end ({start}..{end})")]
    EventRange {
        what: &'static str,
        start: usize,
        end: usize,
    },

    #[error("OTHER segments are numbered from 1")]
    SegmentZero,
}
