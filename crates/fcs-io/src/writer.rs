//! FCS file writer.
//!
//! Writing is split in two. [`stage_document`] computes the complete layout
//! without touching its input and returns a [`StagedFcs`]; [`FcsWriter`]
//! streams staged bytes to a sink.
//!
//! # Layout
//!
//! | Part      | Length                       | Notes                                 |
//! |-----------|------------------------------|---------------------------------------|
//! | header    | 58 + 40 * OTHER count        | version, six offsets, OTHER pairs     |
//! | TEXT      | L1                           | offsets already finalized             |
//! | padding   | slack - (L1 - L0)            | spaces; keeps DATA where it was sized |
//! | DATA      | TOT * PAR * 4                | row-major floats                      |
//! | OTHER     | sum of block lengths         | in document order                     |
//! | checksum  | 8                            | ASCII `00000000`, never computed      |
//!
//! `$BEGINDATA`/`$ENDDATA` live inside TEXT, so their digit count changes the
//! TEXT length they are computed from. DATA is placed after a fixed slack so
//! that the growth from writing the final values is absorbed by shrinking the
//! padding instead of moving DATA.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::data::DataType;
use crate::document::Document;
use crate::error::{FcsError, Result};
use crate::header::{ByteRange, HEADER_LEN, Header, MAX_HEADER_OFFSET, OTHER_FIELD_LEN, build_header};
use crate::text::build_text;
use crate::types::FcsWriterOptions;

/// Placeholder written where the CRC would go.
pub const CHECKSUM_PLACEHOLDER: &[u8; 8] = b"00000000";

/// A fully laid-out FCS file.
#[derive(Debug, Clone)]
pub struct StagedFcs {
    header: Vec<u8>,
    text: Vec<u8>,
    padding: usize,
    data: Vec<u8>,
    other: Vec<Arc<[u8]>>,
    document: Document,
}

impl StagedFcs {
    /// Header bytes, OTHER descriptors included.
    #[must_use]
    pub fn header_bytes(&self) -> &[u8] {
        &self.header
    }

    /// Final TEXT bytes.
    #[must_use]
    pub fn text_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Number of spaces between TEXT and DATA.
    #[must_use]
    pub fn padding_len(&self) -> usize {
        self.padding
    }

    /// Encoded DATA bytes.
    #[must_use]
    pub fn data_bytes(&self) -> &[u8] {
        &self.data
    }

    /// OTHER segments in output order.
    #[must_use]
    pub fn other_segments(&self) -> &[Arc<[u8]>] {
        &self.other
    }

    /// The document as written, with finalized offset keywords.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the finalized document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Total file length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.header.len()
            + self.text.len()
            + self.padding
            + self.data.len()
            + self.other.iter().map(|o| o.len()).sum::<usize>()
            + CHECKSUM_PLACEHOLDER.len()
    }

    /// Whether the file is empty (never true for a staged file).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate all parts into one buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.extend_from_slice(&self.header);
        out.extend_from_slice(&self.text);
        out.resize(out.len() + self.padding, b' ');
        out.extend_from_slice(&self.data);
        for segment in &self.other {
            out.extend_from_slice(segment);
        }
        out.extend_from_slice(CHECKSUM_PLACEHOLDER);
        out
    }

    /// Stream all parts to a writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.header)?;
        writer.write_all(&self.text)?;
        writer.write_all(&vec![b' '; self.padding])?;
        writer.write_all(&self.data)?;
        for segment in &self.other {
            writer.write_all(segment)?;
        }
        writer.write_all(CHECKSUM_PLACEHOLDER)?;
        Ok(())
    }
}

/// FCS file writer.
pub struct FcsWriter<W: Write> {
    writer: BufWriter<W>,
    options: FcsWriterOptions,
}

impl<W: Write> FcsWriter<W> {
    /// Create a new FCS writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options: FcsWriterOptions::default(),
        }
    }

    /// Create a new FCS writer with options.
    pub fn with_options(writer: W, options: FcsWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Lay out and write a document, returning the finalized snapshot.
    ///
    /// Nothing is written when layout fails.
    pub fn write_document(mut self, document: &Document) -> Result<Document> {
        let staged = stage_document(document, &self.options)?;
        staged.write_to(&mut self.writer)?;
        self.writer.flush()?;
        Ok(staged.into_document())
    }
}

impl FcsWriter<File> {
    /// Create an FCS file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }

    /// Create an FCS file with options.
    pub fn create_with_options(path: &Path, options: FcsWriterOptions) -> Result<Self> {
        Ok(Self::with_options(File::create(path)?, options))
    }
}

/// Write a document to a path.
///
/// The layout is computed before the file is created.
pub fn write_fcs(path: &Path, document: &Document, options: FcsWriterOptions) -> Result<Document> {
    let staged = stage_document(document, &options)?;
    let mut writer = BufWriter::new(File::create(path)?);
    staged.write_to(&mut writer)?;
    writer.flush()?;
    Ok(staged.into_document())
}

/// Compute the final layout of a document.
///
/// The input is never modified; the finalized keyword values are available
/// from [`StagedFcs::document`].
pub fn stage_document(document: &Document, options: &FcsWriterOptions) -> Result<StagedFcs> {
    let mut snapshot = document.clone();
    if snapshot.matrix.columns() != snapshot.par() {
        return Err(FcsError::validation(format!(
            "event matrix has {} columns but there are {} parameters",
            snapshot.matrix.columns(),
            snapshot.par()
        )));
    }
    if options.essential {
        snapshot.strip_to_required();
    }
    if options.adjust_range {
        adjust_ranges(&mut snapshot)?;
    }
    snapshot.keywords.check_supported()?;
    if snapshot.keywords.offset("$BEGINSTEXT")? != 0 {
        return Err(FcsError::unsupported("writing a supplemental TEXT segment"));
    }
    let data_type = snapshot.keywords.data_type()?;
    if data_type != DataType::Float {
        return Err(FcsError::unsupported(format!(
            "writing $DATATYPE {}",
            data_type.as_keyword()
        )));
    }
    let data = snapshot.matrix.encode(snapshot.keywords.byte_order()?);
    let other = snapshot.other.clone();

    let header_len = HEADER_LEN + 2 * OTHER_FIELD_LEN * other.len();
    let text_start = to_u64(header_len);

    snapshot.keywords.set_offset("$BEGINDATA", 0)?;
    snapshot.keywords.set_offset("$ENDDATA", 0)?;
    let baseline_len = render_text(&snapshot).len();

    let data_start = text_start + to_u64(baseline_len) + to_u64(options.text_slack);
    let data_end_exclusive = data_start + to_u64(data.len());
    let (begin_data, end_data) = if data.is_empty() {
        (0, 0)
    } else {
        (data_start, data_end_exclusive - 1)
    };
    snapshot.keywords.set_offset("$BEGINDATA", begin_data)?;
    snapshot.keywords.set_offset("$ENDDATA", end_data)?;
    let text = render_text(&snapshot);

    let delta = to_i64(text.len()) - to_i64(baseline_len);
    let limit = to_i64(options.growth_limit());
    if delta > limit {
        return Err(FcsError::AssemblerOverflow { delta, limit });
    }
    let padding = usize::try_from(to_i64(options.text_slack) - delta).unwrap_or(0);
    let text_end = text_start + to_u64(text.len()) - 1;

    let header_data = if end_data > MAX_HEADER_OFFSET {
        debug!(end_data, "DATA end beyond header field width, header shows 0/0");
        ByteRange::default()
    } else {
        ByteRange::new(begin_data, end_data)
    };

    let mut cursor = data_end_exclusive;
    let other_ranges = other
        .iter()
        .map(|segment| {
            let len = to_u64(segment.len());
            let range = ByteRange::new(cursor, (cursor + len).saturating_sub(1));
            cursor += len;
            range
        })
        .collect();

    let header = build_header(&Header {
        version: snapshot.version.clone(),
        text: ByteRange::new(text_start, text_end),
        data: header_data,
        analysis: ByteRange::default(),
        other: other_ranges,
    })?;

    debug!(
        text_start,
        text_end,
        data_start = begin_data,
        data_end = end_data,
        text_growth = delta,
        padding,
        other_segments = other.len(),
        "staged FCS layout"
    );

    Ok(StagedFcs {
        header,
        text,
        padding,
        data,
        other,
        document: snapshot,
    })
}

fn render_text(document: &Document) -> Vec<u8> {
    build_text(
        document.delimiter,
        &document.keywords,
        &document.parameters,
        document.tot(),
    )
}

/// Set every `$PnR` to the ceiling of its column maximum.
fn adjust_ranges(document: &mut Document) -> Result<()> {
    for position in 0..document.par() {
        let column = document.matrix.column(position).unwrap_or_default();
        let Some(max) = column.into_iter().reduce(f32::max) else {
            return Err(FcsError::validation(format!(
                "cannot adjust the range of parameter {} without events",
                position + 1
            )));
        };
        if let Some(parameter) = document.parameters.get_mut(position) {
            parameter.set_range(f64::from(max).ceil());
        }
    }
    Ok(())
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataMatrix;
    use crate::reader::parse_fcs;
    use crate::text::ParameterTable;

    fn sample() -> Document {
        let mut doc = Document::default();
        doc.add_parameter("FSC", 0).unwrap();
        doc.add_parameter("SSC", 1).unwrap();
        doc.replace_matrix(vec![vec![1.5, 2.0], vec![3.0, 40.2]])
            .unwrap();
        doc.set_keyword("$CYT", "Aria").unwrap();
        doc
    }

    #[test]
    fn test_layout_positions() {
        let doc = sample();
        let staged = stage_document(&doc, &FcsWriterOptions::default()).unwrap();
        let bytes = staged.to_bytes();
        assert_eq!(bytes.len(), staged.len());
        assert_eq!(&bytes[..6], b"FCS3.1");
        assert_eq!(&bytes[bytes.len() - 8..], CHECKSUM_PLACEHOLDER);

        let begin: usize = staged.document().keyword("$BEGINDATA").unwrap().parse().unwrap();
        let end: usize = staged.document().keyword("$ENDDATA").unwrap().parse().unwrap();
        assert_eq!(begin, 58 + staged.text_bytes().len() + staged.padding_len());
        assert_eq!(end - begin + 1, 16);
        assert_eq!(&bytes[begin..=end], staged.data_bytes());
    }

    #[test]
    fn test_input_not_mutated() {
        let doc = sample();
        let before = doc.clone();
        let staged = stage_document(&doc, &FcsWriterOptions::default()).unwrap();
        assert_eq!(doc, before);
        assert_eq!(doc.keyword("$BEGINDATA").as_deref(), Some("0"));
        assert_ne!(staged.document().keyword("$BEGINDATA").as_deref(), Some("0"));
    }

    #[test]
    fn test_reparse_matches_snapshot() {
        let mut doc = sample();
        doc.push_other(b"<xml/>".to_vec());
        let staged = stage_document(&doc, &FcsWriterOptions::default()).unwrap();
        let parsed = parse_fcs(&staged.to_bytes()).unwrap();
        assert_eq!(&parsed, staged.document());
        assert_eq!(&*parsed.other()[0], b"<xml/>");
    }

    #[test]
    fn test_essential_drops_other_and_optional() {
        let mut doc = sample();
        doc.push_other(b"vendor".to_vec());
        let staged = stage_document(&doc, &FcsWriterOptions::new().essential()).unwrap();
        assert_eq!(staged.header_bytes().len(), 58);
        assert!(staged.other_segments().is_empty());
        assert_eq!(staged.document().keyword("$CYT"), None);
        assert_eq!(doc.other().len(), 1);
    }

    #[test]
    fn test_adjust_range() {
        let doc = sample();
        let staged = stage_document(&doc, &FcsWriterOptions::new().adjust_range()).unwrap();
        assert_eq!(staged.document().keyword("$P1R").as_deref(), Some("3"));
        assert_eq!(staged.document().keyword("$P2R").as_deref(), Some("41"));

        let mut empty = sample();
        empty.replace_matrix(Vec::new()).unwrap();
        assert!(matches!(
            stage_document(&empty, &FcsWriterOptions::new().adjust_range()),
            Err(FcsError::Validation { .. })
        ));
    }

    #[test]
    fn test_zero_slack_overflows() {
        let doc = sample();
        let err = stage_document(&doc, &FcsWriterOptions::new().with_text_slack(0)).unwrap_err();
        assert!(matches!(err, FcsError::AssemblerOverflow { limit: 0, .. }));
    }

    #[test]
    fn test_supplemental_text_unsupported() {
        let mut doc = sample();
        doc.set_keyword("$BEGINSTEXT", "100").unwrap();
        assert!(matches!(
            stage_document(&doc, &FcsWriterOptions::default()),
            Err(FcsError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_unwritable_keywords_unsupported() {
        let mut doc = sample();
        doc.set_keyword("$MODE", "H").unwrap();
        assert!(matches!(
            stage_document(&doc, &FcsWriterOptions::default()),
            Err(FcsError::Unsupported { .. })
        ));

        let mut doc = sample();
        doc.set_keyword("$BEGINANALYSIS", "10").unwrap();
        doc.set_keyword("$ENDANALYSIS", "20").unwrap();
        assert!(matches!(
            stage_document(&doc, &FcsWriterOptions::default()),
            Err(FcsError::Unsupported { .. })
        ));
        assert!(matches!(
            stage_document(&doc, &FcsWriterOptions::new().essential()),
            Err(FcsError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_matrix_width_must_match_parameters() {
        let mut doc = sample();
        doc.matrix = DataMatrix::from_rows(vec![vec![1.0, 2.0, 3.0]], 3).unwrap();
        assert!(matches!(
            stage_document(&doc, &FcsWriterOptions::default()),
            Err(FcsError::Validation { .. })
        ));

        let mut doc = sample();
        doc.parameters = ParameterTable::new();
        assert!(matches!(
            stage_document(&doc, &FcsWriterOptions::default()),
            Err(FcsError::Validation { .. })
        ));
    }

    #[test]
    fn test_writer_streams_same_bytes() {
        let doc = sample();
        let staged = stage_document(&doc, &FcsWriterOptions::default()).unwrap();
        let mut sink = Vec::new();
        let snapshot = FcsWriter::new(&mut sink).write_document(&doc).unwrap();
        assert_eq!(sink, staged.to_bytes());
        assert_eq!(&snapshot, staged.document());
    }
}
