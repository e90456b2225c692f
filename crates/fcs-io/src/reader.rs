//! FCS file reader.
//!
//! Parsing is fail-fast: the first violation aborts with no partial
//! [`Document`]. The whole file is held in memory.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::data::DataMatrix;
use crate::document::Document;
use crate::error::{FcsError, Result};
use crate::header::{ByteRange, Header, parse_header};
use crate::text::{KeywordStore, TextSegment};
use crate::types::FcsReaderOptions;

/// FCS file reader.
pub struct FcsReader<R: Read> {
    reader: BufReader<R>,
    options: FcsReaderOptions,
}

impl<R: Read> FcsReader<R> {
    /// Create a new FCS reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            options: FcsReaderOptions::default(),
        }
    }

    /// Create a new FCS reader with options.
    pub fn with_options(reader: R, options: FcsReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the entire stream into memory and parse it.
    pub fn read_document(mut self) -> Result<Document> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_fcs_with_options(&data, &self.options)
    }
}

impl FcsReader<File> {
    /// Open an FCS file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(open_file(path)?))
    }

    /// Open an FCS file with options.
    pub fn open_with_options(path: &Path, options: FcsReaderOptions) -> Result<Self> {
        Ok(Self::with_options(open_file(path)?, options))
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FcsError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            FcsError::Io(e)
        }
    })
}

/// Read an FCS file from a path.
pub fn read_fcs(path: &Path) -> Result<Document> {
    FcsReader::open(path)?.read_document()
}

/// Parse FCS bytes already in memory.
pub fn parse_fcs(data: &[u8]) -> Result<Document> {
    parse_fcs_with_options(data, &FcsReaderOptions::default())
}

/// Parse FCS bytes with options.
pub fn parse_fcs_with_options(data: &[u8], options: &FcsReaderOptions) -> Result<Document> {
    let header = parse_header(data)?;
    debug!(
        version = %header.version,
        text_start = header.text.start,
        text_end = header.text.end,
        other_segments = header.other.len(),
        "parsed FCS header"
    );

    let text_bytes = segment(data, header.text, "TEXT")?;
    let text = TextSegment::parse(text_bytes)?;
    let keywords = &text.keywords;

    check_unsupported(&header, keywords)?;

    let par = text.parameters.len();
    if let Some(declared) = &text.declared_par {
        let declared = parse_count("$PAR", declared)?;
        if declared != par {
            return Err(FcsError::validation(format!(
                "$PAR is {declared} but {par} parameters are described"
            )));
        }
    }
    let tot = match &text.declared_tot {
        Some(declared) => parse_count("$TOT", declared)?,
        None => return Err(FcsError::format("missing $TOT keyword")),
    };

    let data_range = if header.data.defined_in_header {
        header.data
    } else {
        ByteRange::new(keywords.offset("$BEGINDATA")?, keywords.offset("$ENDDATA")?)
    };
    debug!(
        start = data_range.start,
        end = data_range.end,
        from_header = data_range.defined_in_header,
        "located DATA segment"
    );

    let needed = tot.saturating_mul(par).saturating_mul(crate::data::FLOAT_WIDTH);
    let data_bytes = if needed == 0 {
        &[][..]
    } else {
        segment(data, data_range, "DATA")?
    };
    let matrix = DataMatrix::decode(
        data_bytes,
        tot,
        par,
        keywords.data_type()?,
        keywords.byte_order()?,
    )?;
    if data_bytes.len() > needed {
        tolerate(
            options,
            &format!(
                "DATA range holds {} bytes, {needed} used",
                data_bytes.len()
            ),
        )?;
    }
    if keywords.offset("$NEXTDATA")? != 0 {
        tolerate(options, "$NEXTDATA is set; only the first data set is read")?;
    }

    let other = header
        .other
        .iter()
        .map(|range| segment(data, *range, "OTHER").map(Arc::from))
        .collect::<Result<Vec<Arc<[u8]>>>>()?;

    Document::from_parts(
        header.version,
        text.delimiter,
        text.keywords,
        text.parameters,
        matrix,
        other,
    )
}

/// Reject the legal features this crate does not implement.
fn check_unsupported(header: &Header, keywords: &KeywordStore) -> Result<()> {
    if header.analysis.defined_in_header {
        return Err(FcsError::unsupported("ANALYSIS segment"));
    }
    keywords.check_supported()
}

fn segment<'a>(data: &'a [u8], range: ByteRange, name: &str) -> Result<&'a [u8]> {
    range.slice(data).ok_or_else(|| {
        FcsError::format(format!(
            "{name} segment {}..={} lies outside the {} byte file",
            range.start,
            range.end,
            data.len()
        ))
    })
}

fn parse_count(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| FcsError::format(format!("{key} value {raw:?} is not a count")))
}

fn tolerate(options: &FcsReaderOptions, message: &str) -> Result<()> {
    if options.strict {
        return Err(FcsError::format(message.to_string()));
    }
    warn!("{message}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal file by hand: header, TEXT, DATA.
    fn handmade(text: &str, data: &[u8], header_data: bool) -> Vec<u8> {
        let text_start = 58;
        let text_end = text_start + text.len() - 1;
        let data_start = text_end + 1;
        let data_end = data_start + data.len() - 1;
        let (ds, de) = if header_data {
            (data_start, data_end)
        } else {
            (0, 0)
        };
        let mut out = format!(
            "{:<10}{:>8}{:>8}{:>8}{:>8}{:>8}{:>8}",
            "FCS3.0", text_start, text_end, ds, de, 0, 0
        )
        .into_bytes();
        out.extend_from_slice(text.as_bytes());
        out.extend_from_slice(data);
        out
    }

    fn le_floats(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn text_for(extra: &str, data_len: usize) -> String {
        // TEXT length is fixed by padding offsets to 4 digits.
        let body = format!(
            "/$BYTEORD/1,2,3,4/$DATATYPE/F/$MODE/L/$PAR/2/$TOT/2/$P1N/A/$P2N/B/{extra}"
        );
        let text_len = body.len() + "$BEGINDATA/0000/$ENDDATA/0000/".len();
        let begin = 58 + text_len;
        let end = begin + data_len - 1;
        format!("{body}$BEGINDATA/{begin:04}/$ENDDATA/{end:04}/")
    }

    #[test]
    fn test_parse_handmade_header_offsets() {
        let data = le_floats(&[1.0, 2.0, 3.0, 4.0]);
        let bytes = handmade(&text_for("", data.len()), &data, true);
        let doc = parse_fcs(&bytes).unwrap();
        assert_eq!(doc.version(), "FCS3.0");
        assert_eq!(doc.par(), 2);
        assert_eq!(doc.tot(), 2);
        assert_eq!(doc.matrix().row(1), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn test_parse_text_offsets_fallback() {
        let data = le_floats(&[1.0, 2.0, 3.0, 4.0]);
        let bytes = handmade(&text_for("", data.len()), &data, false);
        let doc = parse_fcs(&bytes).unwrap();
        assert_eq!(doc.matrix().to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_rejects_supplemental_text() {
        let data = le_floats(&[0.0; 4]);
        let bytes = handmade(
            &text_for("$BEGINSTEXT/10/$ENDSTEXT/20/", data.len()),
            &data,
            true,
        );
        assert!(matches!(
            parse_fcs(&bytes),
            Err(FcsError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_rejects_non_float() {
        let data = le_floats(&[0.0; 4]);
        let text = text_for("", data.len()).replace("$DATATYPE/F/", "$DATATYPE/I/");
        let bytes = handmade(&text, &data, true);
        assert!(matches!(
            parse_fcs(&bytes),
            Err(FcsError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_rejects_par_mismatch() {
        let data = le_floats(&[0.0; 4]);
        let text = text_for("", data.len()).replace("$PAR/2/", "$PAR/3/");
        let bytes = handmade(&text, &data, true);
        assert!(matches!(
            parse_fcs(&bytes),
            Err(FcsError::Validation { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_byte_order() {
        let data = le_floats(&[0.0; 4]);
        let text = text_for("", data.len()).replace("1,2,3,4", "2,1,4,3");
        let bytes = handmade(&text, &data, true);
        assert!(matches!(parse_fcs(&bytes), Err(FcsError::Format { .. })));
    }

    #[test]
    fn test_strict_rejects_next_data() {
        let data = le_floats(&[0.0; 4]);
        let bytes = handmade(&text_for("$NEXTDATA/999/", data.len()), &data, true);
        assert!(parse_fcs(&bytes).is_ok());
        let strict = FcsReaderOptions::new().strict();
        assert!(parse_fcs_with_options(&bytes, &strict).is_err());
    }

    #[test]
    fn test_short_data_is_format_error() {
        let data = le_floats(&[0.0; 3]);
        let bytes = handmade(&text_for("", data.len()), &data, true);
        assert!(matches!(parse_fcs(&bytes), Err(FcsError::Format { .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = read_fcs(Path::new("/definitely/not/here.fcs")).unwrap_err();
        assert!(matches!(err, FcsError::FileNotFound { .. }));
    }
}
