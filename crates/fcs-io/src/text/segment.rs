//! Delimiter scanning and escaping for TEXT bytes.
//!
//! TEXT is `<D>key<D>value<D>key<D>value<D>...` where `D` is whatever byte
//! appears first. Inside a field a doubled `DD` is a literal `D`, never a
//! field boundary followed by an empty field.

use crate::error::{FcsError, Result};

/// Raw key/value pairs scanned from TEXT, delimiters already unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText {
    /// Delimiter byte.
    pub delimiter: u8,
    /// Pairs in file order, keys with their original casing.
    pub pairs: Vec<(String, String)>,
}

/// Scan a TEXT segment into key/value pairs.
pub fn parse_text(bytes: &[u8]) -> Result<RawText> {
    let Some(&delimiter) = bytes.first() else {
        return Err(FcsError::format("TEXT segment is empty"));
    };

    let mut fields = Vec::new();
    let mut pos = 1usize;
    while pos < bytes.len() {
        let (field, next, terminated) = scan_field(bytes, pos, delimiter);
        pos = next;
        if !terminated && field.iter().all(|b| b.is_ascii_whitespace() || *b == 0) {
            break;
        }
        fields.push(field);
    }

    if !fields.len().is_multiple_of(2) {
        let dangling = fields.last().map(|f| String::from_utf8_lossy(f).into_owned());
        return Err(FcsError::format(format!(
            "TEXT keyword {dangling:?} has no value"
        )));
    }

    let mut pairs = Vec::with_capacity(fields.len() / 2);
    let mut iter = fields.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        pairs.push((decode_field(key)?, decode_field(value)?));
    }

    Ok(RawText { delimiter, pairs })
}

/// Read one field starting at `pos`.
///
/// Returns the unescaped bytes, the position after the closing delimiter and
/// whether a closing delimiter was found.
fn scan_field(bytes: &[u8], mut pos: usize, delimiter: u8) -> (Vec<u8>, usize, bool) {
    let mut field = Vec::new();
    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte == delimiter {
            if bytes.get(pos + 1) == Some(&delimiter) {
                field.push(delimiter);
                pos += 2;
                continue;
            }
            return (field, pos + 1, true);
        }
        field.push(byte);
        pos += 1;
    }
    (field, pos, false)
}

fn decode_field(field: Vec<u8>) -> Result<String> {
    String::from_utf8(field).map_err(|e| {
        FcsError::format(format!(
            "TEXT field is not valid UTF-8: {:?}",
            String::from_utf8_lossy(e.as_bytes())
        ))
    })
}

/// Incremental TEXT serializer.
#[derive(Debug, Clone)]
pub struct TextBuilder {
    delimiter: u8,
    buf: Vec<u8>,
}

impl TextBuilder {
    /// Start a TEXT segment with its leading delimiter.
    #[must_use]
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            buf: vec![delimiter],
        }
    }

    /// Append an escaped key/value pair, each followed by the delimiter.
    pub fn push_pair(&mut self, key: &str, value: &str) {
        self.push_field(key);
        self.push_field(value);
    }

    fn push_field(&mut self, field: &str) {
        for &byte in field.as_bytes() {
            self.buf.push(byte);
            if byte == self.delimiter {
                self.buf.push(byte);
            }
        }
        self.buf.push(self.delimiter);
    }

    /// Finished TEXT bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
