//! In-memory FCS data set.
//!
//! A [`Document`] owns the keyword store, the parameter table, the event
//! matrix and the OTHER segments. `$PAR` and `$TOT` are never stored; they are
//! always the parameter count and the matrix row count.
//!
//! Cloning deep-copies keywords, parameters and events. OTHER segments are
//! reference-counted and shared between clones; they are immutable, so a
//! clone can drop or replace them without affecting the original.

use std::sync::Arc;

use crate::data::DataMatrix;
use crate::error::{FcsError, Result};
use crate::text::{
    Key, KeywordStore, Parameter, ParameterTable, REQUIRED_KEYWORDS, REQUIRED_PARAMETER_KEYWORDS,
    REQUIRED_STANDARD_KEYWORDS, classify_key,
};
use crate::types::DocumentOptions;

/// Offset keywords a bare-bones document starts with, all zero.
const ZERO_OFFSET_KEYWORDS: [&str; 7] = [
    "$BEGINANALYSIS",
    "$ENDANALYSIS",
    "$BEGINSTEXT",
    "$ENDSTEXT",
    "$BEGINDATA",
    "$ENDDATA",
    "$NEXTDATA",
];

/// One FCS data set.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) version: String,
    pub(crate) delimiter: u8,
    pub(crate) keywords: KeywordStore,
    pub(crate) parameters: ParameterTable,
    pub(crate) matrix: DataMatrix,
    pub(crate) other: Vec<Arc<[u8]>>,
}

impl Document {
    /// A bare-bones document: float list-mode data, zero offsets, no
    /// parameters and no events.
    #[must_use]
    pub fn new(options: DocumentOptions) -> Self {
        let mut keywords = KeywordStore::new();
        keywords.insert_trusted("$BYTEORD", options.byte_order.as_keyword().to_string());
        keywords.insert_trusted("$DATATYPE", "F".to_string());
        keywords.insert_trusted("$MODE", "L".to_string());
        for key in ZERO_OFFSET_KEYWORDS {
            keywords.insert_trusted(key, "0".to_string());
        }
        Self {
            version: options.version.as_str().to_string(),
            delimiter: options.delimiter,
            keywords,
            parameters: ParameterTable::new(),
            matrix: DataMatrix::with_columns(0),
            other: Vec::new(),
        }
    }

    /// Assemble a document from parsed parts, checking the column count.
    pub(crate) fn from_parts(
        version: String,
        delimiter: u8,
        keywords: KeywordStore,
        parameters: ParameterTable,
        matrix: DataMatrix,
        other: Vec<Arc<[u8]>>,
    ) -> Result<Self> {
        if matrix.columns() != parameters.len() {
            return Err(FcsError::validation(format!(
                "matrix has {} columns but there are {} parameters",
                matrix.columns(),
                parameters.len()
            )));
        }
        Ok(Self {
            version,
            delimiter,
            keywords,
            parameters,
            matrix,
            other,
        })
    }

    /// Header version string, e.g. `FCS3.1`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Replace the header version.
    pub fn set_version(&mut self, version: crate::types::FcsVersion) {
        self.version = version.as_str().to_string();
    }

    /// TEXT delimiter byte.
    #[must_use]
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Replace the TEXT delimiter.
    pub fn set_delimiter(&mut self, delimiter: u8) {
        self.delimiter = delimiter;
    }

    /// `$PAR`.
    #[must_use]
    pub fn par(&self) -> usize {
        self.parameters.len()
    }

    /// `$TOT`.
    #[must_use]
    pub fn tot(&self) -> usize {
        self.matrix.rows()
    }

    /// Non-parameter keywords.
    #[must_use]
    pub fn keywords(&self) -> &KeywordStore {
        &self.keywords
    }

    /// Mutable non-parameter keywords.
    pub fn keywords_mut(&mut self) -> &mut KeywordStore {
        &mut self.keywords
    }

    /// Look up any keyword, including `$PnX` (n is the 1-based position) and
    /// the derived `$PAR`/`$TOT`.
    #[must_use]
    pub fn keyword(&self, key: &str) -> Option<String> {
        match classify_key(key) {
            Key::Standard(_) => self.keywords.get(key).map(str::to_string),
            Key::Parameter { index, generic } => self
                .parameter_at_index(index)
                .and_then(|p| p.get(&generic))
                .map(str::to_string),
            Key::Derived("$PAR") => Some(self.par().to_string()),
            Key::Derived(_) => Some(self.tot().to_string()),
        }
    }

    /// Set any keyword. Parameter keywords must address an existing
    /// parameter; `$PAR` and `$TOT` cannot be set.
    pub fn set_keyword(&mut self, key: &str, value: &str) -> Result<()> {
        match classify_key(key) {
            Key::Standard(_) => self.keywords.insert(key, value),
            Key::Parameter { index, generic } => {
                let par = self.par();
                let parameter = position_of_index(index, par)
                    .and_then(|position| self.parameters.get_mut(position))
                    .ok_or_else(|| {
                        FcsError::validation(format!(
                            "{key} addresses parameter {index} but there are {par}"
                        ))
                    })?;
                parameter.set(&generic, value)
            }
            Key::Derived(name) => Err(FcsError::validation(format!(
                "{name} is derived from the document and cannot be set"
            ))),
        }
    }

    /// Remove a keyword, returning its value. Derived keywords are never
    /// removed.
    pub fn remove_keyword(&mut self, key: &str) -> Option<String> {
        match classify_key(key) {
            Key::Standard(_) => self.keywords.remove(key),
            Key::Parameter { index, generic } => position_of_index(index, self.par())
                .and_then(|position| self.parameters.get_mut(position))
                .and_then(|p| p.remove(&generic)),
            Key::Derived(_) => None,
        }
    }

    fn parameter_at_index(&self, index: u32) -> Option<&Parameter> {
        position_of_index(index, self.par()).and_then(|position| self.parameters.get(position))
    }

    /// Parameters in column order.
    #[must_use]
    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    /// The parameter at a 0-based position, for editing its `$Pn*` values.
    pub fn parameter_mut(&mut self, position: usize) -> Option<&mut Parameter> {
        self.parameters.get_mut(position)
    }

    /// Event matrix.
    #[must_use]
    pub fn matrix(&self) -> &DataMatrix {
        &self.matrix
    }

    /// Overwrite one event value in place.
    pub fn set_value(&mut self, row: usize, column: usize, value: f32) -> Result<()> {
        self.matrix.set(row, column, value)
    }

    /// Replace all events; `$TOT` becomes the new row count.
    pub fn replace_matrix(&mut self, rows: Vec<Vec<f32>>) -> Result<()> {
        self.matrix = DataMatrix::from_rows(rows, self.par())?;
        Ok(())
    }

    /// Replace all events with a prebuilt matrix of the right width.
    pub fn set_matrix(&mut self, matrix: DataMatrix) -> Result<()> {
        if matrix.columns() != self.par() {
            return Err(FcsError::validation(format!(
                "matrix has {} columns but there are {} parameters",
                matrix.columns(),
                self.par()
            )));
        }
        self.matrix = matrix;
        Ok(())
    }

    /// Add a parameter with default keywords at a 0-based position; every
    /// event gets a zero in the new column.
    pub fn add_parameter(&mut self, short_name: &str, position: usize) -> Result<()> {
        let fill = vec![0.0; self.tot()];
        self.insert_parameter(Parameter::with_defaults(short_name)?, position, &fill)
    }

    /// Insert a prepared parameter and its column values.
    pub fn insert_parameter(
        &mut self,
        parameter: Parameter,
        position: usize,
        column: &[f32],
    ) -> Result<()> {
        let short_name = parameter.short_name()?;
        if self.parameters.index_of(short_name).is_ok() {
            return Err(FcsError::validation(format!(
                "a parameter named {short_name:?} already exists"
            )));
        }
        if position > self.par() {
            return Err(FcsError::validation(format!(
                "cannot insert at position {position} with {} parameters",
                self.par()
            )));
        }
        if column.len() != self.tot() {
            return Err(FcsError::validation(format!(
                "column has {} values but there are {} events",
                column.len(),
                self.tot()
            )));
        }

        let mut ordered = std::mem::take(&mut self.parameters).into_ordered();
        ordered.insert(position, parameter);
        self.parameters = ParameterTable::from_ordered(ordered);
        self.matrix.insert_column(position, column);
        Ok(())
    }

    /// Remove the named parameters and their columns.
    pub fn remove_parameters(&mut self, short_names: &[&str]) -> Result<()> {
        let mut drop = Vec::with_capacity(short_names.len());
        for name in short_names {
            drop.push(self.parameters.index_of(name)?);
        }
        let keep: Vec<usize> = (0..self.par()).filter(|p| !drop.contains(p)).collect();
        self.select_columns(&keep);
        Ok(())
    }

    /// Keep only the named parameters, in their current order.
    pub fn retain_parameters(&mut self, short_names: &[&str]) -> Result<()> {
        let mut keep = Vec::with_capacity(short_names.len());
        for name in short_names {
            keep.push(self.parameters.index_of(name)?);
        }
        keep.sort_unstable();
        keep.dedup();
        self.select_columns(&keep);
        Ok(())
    }

    /// Rearrange parameters so that the new column `i` is the old column
    /// `positions[i]`. Positions must be distinct; unlisted columns are dropped.
    pub fn reorder_parameters(&mut self, positions: &[usize]) -> Result<()> {
        let par = self.par();
        let mut seen = vec![false; par];
        for &position in positions {
            match seen.get_mut(position) {
                None => {
                    return Err(FcsError::validation(format!(
                        "parameter position {position} out of range for {par} parameters"
                    )));
                }
                Some(true) => {
                    return Err(FcsError::validation(format!(
                        "parameter position {position} listed twice"
                    )));
                }
                Some(flag) => *flag = true,
            }
        }
        self.select_columns(positions);
        Ok(())
    }

    /// Rearrange parameters to follow the given short names.
    pub fn reorder_parameters_by_name(&mut self, short_names: &[&str]) -> Result<()> {
        let positions = short_names
            .iter()
            .map(|name| self.parameters.index_of(name))
            .collect::<Result<Vec<_>>>()?;
        self.reorder_parameters(&positions)
    }

    /// Rebuild parameters and columns from validated positions.
    fn select_columns(&mut self, positions: &[usize]) {
        let ordered = std::mem::take(&mut self.parameters).into_ordered();
        let selected = positions.iter().map(|&p| ordered[p].clone()).collect();
        self.parameters = ParameterTable::from_ordered(selected);
        self.matrix.select_columns(positions);
    }

    /// OTHER segments in file order.
    #[must_use]
    pub fn other(&self) -> &[Arc<[u8]>] {
        &self.other
    }

    /// Append an OTHER segment.
    pub fn push_other(&mut self, segment: impl Into<Arc<[u8]>>) {
        self.other.push(segment.into());
    }

    /// Drop all OTHER segments.
    pub fn clear_other(&mut self) {
        self.other.clear();
    }

    /// Required keywords (in catalogue form) the document does not carry.
    ///
    /// A parameter keyword counts as unset when any parameter lacks it, or
    /// when there are no parameters at all.
    #[must_use]
    pub fn unset_required_keywords(&self) -> Vec<&'static str> {
        REQUIRED_KEYWORDS
            .iter()
            .map(|(key, _)| *key)
            .filter(|key| {
                if REQUIRED_STANDARD_KEYWORDS.contains(key) {
                    !self.keywords.contains(key)
                } else if REQUIRED_PARAMETER_KEYWORDS.contains(key) {
                    self.parameters.is_empty() || self.parameters.iter().any(|p| !p.contains(key))
                } else {
                    false
                }
            })
            .collect()
    }

    /// Drop OTHER segments and every keyword outside the required set.
    pub(crate) fn strip_to_required(&mut self) {
        self.other.clear();
        self.keywords.retain(|key| {
            REQUIRED_STANDARD_KEYWORDS
                .iter()
                .any(|required| required.eq_ignore_ascii_case(key))
        });
        for parameter in self.parameters.iter_mut() {
            parameter.retain(|generic| REQUIRED_PARAMETER_KEYWORDS.contains(&generic));
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentOptions::default())
    }
}

/// Map a 1-based keyword index to a 0-based position.
fn position_of_index(index: u32, par: usize) -> Option<usize> {
    let index = usize::try_from(index).ok()?;
    (1..=par).contains(&index).then(|| index - 1)
}
