//! Reader, writer and document options.

use crate::data::ByteOrder;

/// FCS format version written in the first 10 header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FcsVersion {
    /// FCS 3.0.
    V3_0,
    /// FCS 3.1 (default).
    #[default]
    V3_1,
}

impl FcsVersion {
    /// Header string for this version.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3_0 => "FCS3.0",
            Self::V3_1 => "FCS3.1",
        }
    }
}

impl std::fmt::Display for FcsVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for reading FCS files.
#[derive(Debug, Clone, Default)]
pub struct FcsReaderOptions {
    /// Treat tolerated oddities (oversized DATA range, non-zero `$NEXTDATA`)
    /// as format errors instead of warnings.
    pub strict: bool,
}

impl FcsReaderOptions {
    /// Create reader options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict validation.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

/// Default TEXT slack reserved for offset keyword growth.
pub const DEFAULT_TEXT_SLACK: usize = 1000;

/// Part of the slack that growth may never eat into.
pub const TEXT_SLACK_MARGIN: usize = 100;

/// Options for assembling FCS bytes.
#[derive(Debug, Clone)]
pub struct FcsWriterOptions {
    /// Drop OTHER segments and every non-required keyword.
    pub essential: bool,
    /// Recompute each `$PnR` as the ceiling of its column maximum.
    pub adjust_range: bool,
    /// Space reserved after TEXT for offset keyword growth (default: 1000).
    pub text_slack: usize,
}

impl Default for FcsWriterOptions {
    fn default() -> Self {
        Self {
            essential: false,
            adjust_range: false,
            text_slack: DEFAULT_TEXT_SLACK,
        }
    }
}

impl FcsWriterOptions {
    /// Create writer options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only write required keywords and no OTHER segments.
    #[must_use]
    pub fn essential(mut self) -> Self {
        self.essential = true;
        self
    }

    /// Recompute parameter ranges from the data.
    #[must_use]
    pub fn adjust_range(mut self) -> Self {
        self.adjust_range = true;
        self
    }

    /// Set the TEXT slack.
    #[must_use]
    pub fn with_text_slack(mut self, slack: usize) -> Self {
        self.text_slack = slack;
        self
    }

    /// Largest growth the slack may absorb.
    #[must_use]
    pub fn growth_limit(&self) -> usize {
        self.text_slack.saturating_sub(TEXT_SLACK_MARGIN)
    }
}

/// Options for creating a document from nothing.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    /// Header version (default: FCS3.1).
    pub version: FcsVersion,
    /// TEXT delimiter (default: `/`).
    pub delimiter: u8,
    /// DATA byte order (default: little endian).
    pub byte_order: ByteOrder,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            version: FcsVersion::V3_1,
            delimiter: b'/',
            byte_order: ByteOrder::LittleEndian,
        }
    }
}

impl DocumentOptions {
    /// Create document options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: FcsVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the TEXT delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the byte order.
    #[must_use]
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }
}
