//! Fixed header record handling.
//!
//! # Structure
//!
//! | Offset | Length | Field          | Description                         |
//! |--------|--------|----------------|-------------------------------------|
//! | 0-9    | 10     | version        | "FCS3.0" / "FCS3.1", space padded   |
//! | 10-17  | 8      | text start     | right-justified ASCII decimal       |
//! | 18-25  | 8      | text end       |                                     |
//! | 26-33  | 8      | data start     | 0 when only recorded in TEXT        |
//! | 34-41  | 8      | data end       |                                     |
//! | 42-49  | 8      | analysis start |                                     |
//! | 50-57  | 8      | analysis end   |                                     |
//! | 58-    | 20 * 2 | OTHER ranges   | start/end pairs up to TEXT start    |

use crate::error::{FcsError, Result};

use super::range::ByteRange;

/// Length of the fixed part of the header.
pub const HEADER_LEN: usize = 58;

/// Width of the version field.
pub const VERSION_FIELD_LEN: usize = 10;

/// Width of each TEXT/DATA/ANALYSIS offset field.
pub const OFFSET_FIELD_LEN: usize = 8;

/// Width of each OTHER descriptor field.
pub const OTHER_FIELD_LEN: usize = 20;

/// Largest offset an 8-character header field can hold.
pub const MAX_HEADER_OFFSET: u64 = 99_999_999;

/// Version strings this crate understands.
pub const SUPPORTED_VERSIONS: [&str; 2] = ["FCS3.0", "FCS3.1"];

/// Parsed FCS header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Version string with padding removed.
    pub version: String,
    /// TEXT segment range.
    pub text: ByteRange,
    /// DATA segment range (may be deferred to TEXT).
    pub data: ByteRange,
    /// ANALYSIS segment range.
    pub analysis: ByteRange,
    /// OTHER segment ranges in file order.
    pub other: Vec<ByteRange>,
}

/// Parse and validate the header at the start of an FCS file.
///
/// Does not repair anything: any malformed field is a format error.
pub fn parse_header(data: &[u8]) -> Result<Header> {
    if data.len() < HEADER_LEN {
        return Err(FcsError::format(format!(
            "file too small for header: {} bytes",
            data.len()
        )));
    }

    let magic = &data[..6];
    if !SUPPORTED_VERSIONS
        .iter()
        .any(|version| version.as_bytes() == magic)
    {
        return Err(FcsError::format(format!(
            "unrecognized version {:?}",
            String::from_utf8_lossy(magic)
        )));
    }
    let version = read_string(data, 0, VERSION_FIELD_LEN);

    let mut offsets = [0u64; 6];
    for (idx, offset) in offsets.iter_mut().enumerate() {
        let start = VERSION_FIELD_LEN + idx * OFFSET_FIELD_LEN;
        *offset = parse_offset_field(&data[start..start + OFFSET_FIELD_LEN], start)?;
    }
    let [text_start, text_end, data_start, data_end, analysis_start, analysis_end] = offsets;

    if text_start < HEADER_LEN as u64 || text_start > MAX_HEADER_OFFSET {
        return Err(FcsError::format(format!(
            "TEXT start {text_start} outside {HEADER_LEN}..={MAX_HEADER_OFFSET}"
        )));
    }
    if text_end < text_start {
        return Err(FcsError::format(format!(
            "TEXT end {text_end} precedes TEXT start {text_start}"
        )));
    }

    let descriptor_end = usize::try_from(text_start)
        .ok()
        .filter(|end| *end <= data.len())
        .ok_or_else(|| FcsError::format(format!("TEXT start {text_start} beyond end of file")))?;
    let other = parse_other_descriptors(&data[HEADER_LEN..descriptor_end])?;

    Ok(Header {
        version,
        text: ByteRange::from_header(text_start, text_end),
        data: ByteRange::from_header(data_start, data_end),
        analysis: ByteRange::from_header(analysis_start, analysis_end),
        other,
    })
}

/// Build header bytes: version, six offset fields, then OTHER descriptors.
///
/// Offsets must already be display values (callers zero the DATA fields when
/// they overflow the 8-character width).
pub fn build_header(header: &Header) -> Result<Vec<u8>> {
    let mut record = vec![b' '; HEADER_LEN + header.other.len() * OTHER_FIELD_LEN * 2];

    write_left(&mut record, 0, &header.version, VERSION_FIELD_LEN)?;

    let offsets = [
        header.text.start,
        header.text.end,
        header.data.start,
        header.data.end,
        header.analysis.start,
        header.analysis.end,
    ];
    for (idx, offset) in offsets.into_iter().enumerate() {
        if offset > MAX_HEADER_OFFSET {
            return Err(FcsError::validation(format!(
                "header offset {offset} does not fit in {OFFSET_FIELD_LEN} characters"
            )));
        }
        let start = VERSION_FIELD_LEN + idx * OFFSET_FIELD_LEN;
        write_right(&mut record, start, offset, OFFSET_FIELD_LEN)?;
    }

    for (idx, range) in header.other.iter().enumerate() {
        let start = HEADER_LEN + idx * OTHER_FIELD_LEN * 2;
        write_right(&mut record, start, range.start, OTHER_FIELD_LEN)?;
        write_right(&mut record, start + OTHER_FIELD_LEN, range.end, OTHER_FIELD_LEN)?;
    }

    Ok(record)
}

/// Parse an 8-character offset field: optional leading spaces, then digits.
fn parse_offset_field(field: &[u8], position: usize) -> Result<u64> {
    let text = std::str::from_utf8(field)
        .map_err(|_| FcsError::format(format!("non-ASCII offset field at byte {position}")))?;
    let digits = text.trim_start().trim_end_matches(' ');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FcsError::format(format!(
            "malformed offset field {text:?} at byte {position}"
        )));
    }
    digits
        .parse()
        .map_err(|_| FcsError::format(format!("offset field {text:?} out of range")))
}

/// Parse the whitespace-separated OTHER start/end pairs.
fn parse_other_descriptors(bytes: &[u8]) -> Result<Vec<ByteRange>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| FcsError::format("non-ASCII bytes in OTHER descriptors"))?;
    let tokens = text
        .split_whitespace()
        .map(|token| {
            if !token.bytes().all(|b| b.is_ascii_digit()) {
                return Err(FcsError::format(format!(
                    "non-numeric OTHER descriptor {token:?}"
                )));
            }
            token
                .parse::<u64>()
                .map_err(|_| FcsError::format(format!("OTHER descriptor {token:?} out of range")))
        })
        .collect::<Result<Vec<_>>>()?;

    if !tokens.len().is_multiple_of(2) {
        return Err(FcsError::format(format!(
            "odd number of OTHER descriptor fields: {}",
            tokens.len()
        )));
    }

    Ok(tokens
        .chunks_exact(2)
        .map(|pair| ByteRange::from_header(pair[0], pair[1]))
        .collect())
}

/// Read a string from a byte slice, trimming trailing spaces.
fn read_string(data: &[u8], offset: usize, len: usize) -> String {
    data.get(offset..offset + len)
        .map(|slice| String::from_utf8_lossy(slice).trim_end().to_string())
        .unwrap_or_default()
}

/// Write a string left-justified into a space-filled buffer.
fn write_left(buf: &mut [u8], offset: usize, value: &str, len: usize) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.len() > len {
        return Err(FcsError::validation(format!(
            "{value:?} does not fit in {len} characters"
        )));
    }
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Write a number right-justified into a space-filled buffer.
fn write_right(buf: &mut [u8], offset: usize, value: u64, len: usize) -> Result<()> {
    let text = value.to_string();
    if text.len() > len {
        return Err(FcsError::validation(format!(
            "{value} does not fit in {len} characters"
        )));
    }
    let start = offset + len - text.len();
    buf[start..offset + len].copy_from_slice(text.as_bytes());
    Ok(())
}
