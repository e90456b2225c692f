//! CyTOF vendor metadata.
//!
//! Mass cytometers store an XML document (the "FCS header schema") at the
//! start of the first OTHER segment, optionally followed by raw bytes.
//! [`CytofDocument`] wraps a [`Document`] and parses that segment on first
//! use; the wrapped document is never modified.

use std::cell::OnceCell;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::document::Document;
use crate::error::{FcsError, Result};

/// A document read from a CyTOF instrument.
#[derive(Debug, Clone)]
pub struct CytofDocument {
    document: Document,
    other: OnceCell<CytofOther>,
}

impl CytofDocument {
    /// Wrap a document. Nothing is parsed yet.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            other: OnceCell::new(),
        }
    }

    /// The wrapped document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Unwrap the document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// The vendor view of `OTHER[0]`, parsed once.
    pub fn other(&self) -> Result<&CytofOther> {
        if let Some(parsed) = self.other.get() {
            return Ok(parsed);
        }
        let segment = self.document.other().first().ok_or_else(|| {
            FcsError::vendor("not a CyTOF file: there is no OTHER segment")
        })?;
        let parsed = CytofOther::parse(segment)?;
        Ok(self.other.get_or_init(|| parsed))
    }
}

/// `OTHER[0]` split into its leading XML element and the bytes after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CytofOther {
    xml: String,
    raw: Vec<u8>,
}

impl CytofOther {
    /// Split a segment at the close tag of its first element.
    pub fn parse(segment: &[u8]) -> Result<Self> {
        let start = segment
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(segment.len());
        if segment.get(start) != Some(&b'<') {
            return Err(FcsError::vendor("OTHER segment does not start with XML"));
        }

        let tag = first_element_name(&segment[start..])
            .ok_or_else(|| FcsError::vendor("no element found in OTHER XML"))?;
        let close = [b"</".as_slice(), tag, b">".as_slice()].concat();
        let end = segment
            .windows(close.len())
            .position(|window| window == close.as_slice())
            .map(|pos| pos + close.len())
            .ok_or_else(|| {
                FcsError::vendor(format!(
                    "unterminated <{}> element in OTHER segment",
                    String::from_utf8_lossy(tag)
                ))
            })?;

        let xml = std::str::from_utf8(&segment[..end])
            .map_err(|e| FcsError::vendor(format!("OTHER XML is not UTF-8: {e}")))?
            .to_string();
        Ok(Self {
            xml,
            raw: segment[end..].to_vec(),
        })
    }

    /// The XML text.
    #[must_use]
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Bytes following the XML.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Parse the XML into categories and records.
    pub fn header_schema(&self) -> Result<HeaderSchema> {
        HeaderSchema::parse(&self.xml)
    }
}

/// Name of the first element, skipping `<?...?>` and `<!...>` prologue items.
fn first_element_name(bytes: &[u8]) -> Option<&[u8]> {
    let mut pos = 0;
    while pos < bytes.len() {
        let open = pos + bytes[pos..].iter().position(|b| *b == b'<')?;
        let name_start = open + 1;
        match bytes.get(name_start) {
            Some(b'?' | b'!' | b'/') => pos = name_start,
            Some(_) => {
                let len = bytes[name_start..]
                    .iter()
                    .take_while(|b| !b.is_ascii_whitespace() && **b != b'>' && **b != b'/')
                    .count();
                return (len > 0).then(|| &bytes[name_start..name_start + len]);
            }
            None => return None,
        }
    }
    None
}

/// One record of a category: child element names and their text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRecord {
    pub fields: Vec<(String, String)>,
}

impl SchemaRecord {
    /// Text of a field; the last occurrence wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(field, _)| field == name)
            .map(|(_, text)| text.as_str())
    }
}

/// Records grouped under one element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCategory {
    pub name: String,
    pub records: Vec<SchemaRecord>,
}

/// The CyTOF header schema: root children grouped by element name, in
/// first-seen order. Namespace prefixes are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSchema {
    pub categories: Vec<SchemaCategory>,
}

impl HeaderSchema {
    /// Parse schema XML.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut schema = Self::default();
        let mut depth = 0usize;
        let mut field: Option<(String, String)> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| FcsError::vendor(format!("malformed OTHER XML: {e}")))?;
            match event {
                Event::Start(element) => {
                    depth += 1;
                    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                    match depth {
                        2 => schema.open_record(name),
                        3 => field = Some((name, String::new())),
                        _ => {}
                    }
                }
                Event::Empty(element) => {
                    let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
                    match depth {
                        1 => schema.open_record(name),
                        2 => schema.push_field(name, String::new()),
                        _ => {}
                    }
                }
                Event::Text(text) if depth == 3 => {
                    if let Some((_, value)) = field.as_mut() {
                        value.push_str(&String::from_utf8_lossy(&text));
                    }
                }
                Event::CData(text) if depth == 3 => {
                    if let Some((_, value)) = field.as_mut() {
                        value.push_str(&String::from_utf8_lossy(&text));
                    }
                }
                Event::GeneralRef(reference) if depth == 3 => {
                    if let Some((_, value)) = field.as_mut() {
                        let name = String::from_utf8_lossy(&reference).into_owned();
                        value.push_str(&resolve_entity(&name)?);
                    }
                }
                Event::End(_) => {
                    if depth == 3 {
                        if let Some((name, value)) = field.take() {
                            schema.push_field(name, value.trim().to_string());
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(schema)
    }

    fn open_record(&mut self, category: String) {
        match self.categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.records.push(SchemaRecord::default()),
            None => self.categories.push(SchemaCategory {
                name: category,
                records: vec![SchemaRecord::default()],
            }),
        }
    }

    fn push_field(&mut self, name: String, value: String) {
        if let Some(record) = self
            .categories
            .last_mut()
            .and_then(|c| c.records.last_mut())
        {
            record.fields.push((name, value));
        }
    }

    /// Category names in order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Look up a category by name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&SchemaCategory> {
        self.categories.iter().find(|c| c.name == name)
    }
}

fn resolve_entity(name: &str) -> Result<String> {
    let resolved = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(decimal) = name.strip_prefix('#') {
                decimal.parse().ok()
            } else {
                None
            };
            code.and_then(char::from_u32).ok_or_else(|| {
                FcsError::vendor(format!("unknown entity &{name}; in OTHER XML"))
            })?
        }
    };
    Ok(resolved.to_string())
}
