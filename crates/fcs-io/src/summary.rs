//! Structural summary of a document.

use crate::document::Document;
use crate::text::build_text;

/// Keywords of one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSummary {
    /// `$PnN`, empty when missing.
    pub short_name: String,
    /// `(generic key, value)` in sorted order.
    pub keywords: Vec<(String, String)>,
}

/// Sizes and keyword listings of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub version: String,
    /// Length of the TEXT segment as it would be serialized now.
    pub text_bytes: usize,
    pub data_bytes: usize,
    /// `$ENDANALYSIS - $BEGINANALYSIS + 1` when `$BEGINANALYSIS` is set.
    pub analysis_bytes: Option<u64>,
    pub other_segments: usize,
    pub other_bytes: usize,
    pub events: usize,
    /// `$`-prefixed non-parameter keywords, `$PAR`/`$TOT` included, sorted.
    pub standard_keywords: Vec<(String, String)>,
    /// Keywords without a `$` prefix, sorted.
    pub custom_keywords: Vec<(String, String)>,
    pub parameters: Vec<ParameterSummary>,
}

impl Summary {
    /// Summarize a document.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let keywords = document.keywords();
        let mut standard = vec![
            ("$PAR".to_string(), document.par().to_string()),
            ("$TOT".to_string(), document.tot().to_string()),
        ];
        let mut custom = Vec::new();
        for (key, value) in keywords.iter() {
            let pair = (key.to_string(), value.to_string());
            if key.starts_with('$') {
                standard.push(pair);
            } else {
                custom.push(pair);
            }
        }
        standard.sort_by_key(|(key, _)| key.to_uppercase());
        custom.sort_by_key(|(key, _)| key.to_uppercase());

        let begin_analysis = keywords.offset("$BEGINANALYSIS").unwrap_or(0);
        let analysis_bytes = (begin_analysis != 0).then(|| {
            keywords
                .offset("$ENDANALYSIS")
                .unwrap_or(0)
                .saturating_sub(begin_analysis)
                + 1
        });

        let parameters = document
            .parameters()
            .iter()
            .map(|parameter| ParameterSummary {
                short_name: parameter.short_name().unwrap_or("").to_string(),
                keywords: parameter
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            })
            .collect();

        Self {
            version: document.version().to_string(),
            text_bytes: build_text(
                document.delimiter(),
                keywords,
                document.parameters(),
                document.tot(),
            )
            .len(),
            data_bytes: document.matrix().byte_len(),
            analysis_bytes,
            other_segments: document.other().len(),
            other_bytes: document.other().iter().map(|o| o.len()).sum(),
            events: document.tot(),
            standard_keywords: standard,
            custom_keywords: custom,
            parameters,
        }
    }
}
