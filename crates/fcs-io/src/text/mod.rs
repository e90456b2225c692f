//! TEXT segment handling.
//!
//! This module handles the keyword/value metadata of an FCS file:
//! - Delimiter scanning and escaping (`segment`)
//! - Key classification and the ordered keyword store (`keywords`)
//! - Per-parameter keywords (`parameters`)
//! - The catalogue of standard keywords (`standard`)

pub mod keywords;
pub mod parameters;
pub mod segment;
pub mod standard;

pub use keywords::{Key, KeywordStore, classify_key};
pub use parameters::{Parameter, ParameterTable, generic_key};
pub use segment::{RawText, TextBuilder, parse_text};
pub use standard::{
    KeywordClass, OPTIONAL_KEYWORDS, REQUIRED_KEYWORDS, REQUIRED_PARAMETER_KEYWORDS,
    REQUIRED_STANDARD_KEYWORDS, classify_documented, keyword_description,
};

use crate::error::{FcsError, Result};

/// Keywords and parameters split out of a scanned TEXT segment.
#[derive(Debug, Clone)]
pub struct TextSegment {
    /// Delimiter byte found at TEXT[0].
    pub delimiter: u8,
    /// Non-parameter keywords in first-seen order.
    pub keywords: KeywordStore,
    /// Parameter keywords keyed by their embedded index.
    pub parameters: ParameterTable,
    /// `$PAR` as written in the file, if any.
    pub declared_par: Option<String>,
    /// `$TOT` as written in the file, if any.
    pub declared_tot: Option<String>,
}

impl TextSegment {
    /// Scan TEXT bytes and dispatch every pair to its store.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let raw = parse_text(bytes)?;
        let mut keywords = KeywordStore::new();
        let mut parameters = ParameterTable::new();
        let mut declared_par = None;
        let mut declared_tot = None;

        for (key, value) in raw.pairs {
            if key.is_empty() || value.is_empty() {
                return Err(FcsError::validation(format!(
                    "empty keyword or value in TEXT (key {key:?})"
                )));
            }
            match classify_key(&key) {
                Key::Standard(_) => keywords.insert(&key, &value)?,
                Key::Parameter { index, generic } => parameters.set_raw(index, &generic, &value)?,
                Key::Derived(name) if name == "$PAR" => declared_par = Some(value),
                Key::Derived(_) => declared_tot = Some(value),
            }
        }

        Ok(Self {
            delimiter: raw.delimiter,
            keywords,
            parameters,
            declared_par,
            declared_tot,
        })
    }
}

/// Serialize keywords, derived counts and parameters into TEXT bytes.
///
/// Order: keywords in store order, then `$PAR`, `$TOT`, then each parameter
/// renumbered compactly from 1 with its generic keys in sorted order.
///
/// Non-parameter keys keep the casing they were stored with. Parameter keys
/// are always written in canonical uppercase form, so a parsed `$p1r` comes
/// back out as `$P1R`.
#[must_use]
pub fn build_text(
    delimiter: u8,
    keywords: &KeywordStore,
    parameters: &ParameterTable,
    tot: usize,
) -> Vec<u8> {
    let mut builder = TextBuilder::new(delimiter);
    for (key, value) in keywords.iter() {
        builder.push_pair(key, value);
    }
    builder.push_pair("$PAR", &parameters.len().to_string());
    builder.push_pair("$TOT", &tot.to_string());
    for (position, parameter) in parameters.iter().enumerate() {
        let number = (position + 1).to_string();
        for (generic, value) in parameter.iter() {
            builder.push_pair(&generic.replacen('n', &number, 1), value);
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatches_keys() {
        let text = TextSegment::parse(b"/$BYTEORD/1,2,3,4/$P1N/FSC/$p1r/1024/$PAR/1/$TOT/3/$CYT/Aria/")
            .unwrap();
        assert_eq!(text.delimiter, b'/');
        assert_eq!(text.keywords.len(), 2);
        assert_eq!(text.keywords.get("$cyt"), Some("Aria"));
        assert_eq!(text.parameters.len(), 1);
        assert_eq!(text.parameters.get(0).unwrap().get("N"), Some("FSC"));
        assert_eq!(text.parameters.get(0).unwrap().get("$PnR"), Some("1024"));
        assert_eq!(text.declared_par.as_deref(), Some("1"));
        assert_eq!(text.declared_tot.as_deref(), Some("3"));
        assert!(!text.keywords.contains("$PAR"));
    }

    #[test]
    fn test_build_text_renumbers() {
        let mut parameters = ParameterTable::new();
        parameters.set_raw(4, "$PnN", "SSC").unwrap();
        parameters.set_raw(2, "$PnN", "FSC").unwrap();
        parameters.set_raw(2, "$PnB", "32").unwrap();
        let mut keywords = KeywordStore::new();
        keywords.insert("$MODE", "L").unwrap();

        let bytes = build_text(b'|', &keywords, &parameters, 7);
        assert_eq!(
            bytes,
            b"|$MODE|L|$PAR|2|$TOT|7|$P1B|32|$P1N|FSC|$P2N|SSC|".to_vec()
        );
    }

    #[test]
    fn test_build_text_uppercases_parameter_keys() {
        let text = TextSegment::parse(b"/$cyt/Aria/$p1n/FSC/$p1r/1024/").unwrap();
        let bytes = build_text(b'/', &text.keywords, &text.parameters, 0);
        assert_eq!(
            bytes,
            b"/$cyt/Aria/$PAR/1/$TOT/0/$P1N/FSC/$P1R/1024/".to_vec()
        );
    }
}
