//! Error types for FCS file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading, transforming or writing FCS files.
#[derive(Debug, Error)]
pub enum FcsError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Malformed bytes: bad magic, offset fields, OTHER descriptors, byte order.
    #[error("invalid FCS file: {message}")]
    Format { message: String },

    /// A legal FCS feature this crate does not implement.
    #[error("unsupported FCS feature: {feature}")]
    Unsupported { feature: String },

    /// A value or request that breaks a document invariant.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Offset keywords grew more than the reserved TEXT slack can absorb.
    #[error("TEXT grew by {delta} bytes while finalizing offsets, exceeding the {limit} byte limit")]
    AssemblerOverflow { delta: i64, limit: i64 },

    /// Vendor payload in an OTHER segment could not be interpreted.
    #[error("invalid vendor segment: {message}")]
    Vendor { message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`FcsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Unsupported,
    Validation,
    AssemblerOverflow,
    Vendor,
    Io,
}

/// Result type alias for FCS operations.
pub type Result<T> = std::result::Result<T, FcsError>;

impl FcsError {
    /// Create a Format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create an Unsupported error.
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Create a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a Vendor error.
    pub fn vendor(message: impl Into<String>) -> Self {
        Self::Vendor {
            message: message.into(),
        }
    }

    /// Which branch of the error taxonomy this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format { .. } => ErrorKind::Format,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::AssemblerOverflow { .. } => ErrorKind::AssemblerOverflow,
            Self::Vendor { .. } => ErrorKind::Vendor,
            Self::FileNotFound { .. } | Self::Io(_) => ErrorKind::Io,
        }
    }
}
