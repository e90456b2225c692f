//! Per-parameter keywords.
//!
//! Keywords such as `$P3N` are stored under their embedded index (3) and a
//! generic key (`$PnN`). Indices need not be contiguous; the TEXT serializer
//! renumbers them compactly in ascending order.
//!
//! # Standard properties
//!
//! | Key              | Accessor                 | Type                  |
//! |------------------|--------------------------|-----------------------|
//! | `$PnB`           | `bits`                   | `u32` (required)      |
//! | `$PnE`           | `amplification`          | `(f64, f64)` (req.)   |
//! | `$PnN`           | `short_name`             | `&str` (required)     |
//! | `$PnR`           | `range`                  | `f64` (required)      |
//! | `$PnCALIBRATION` | `calibration`            | `(f64, String)`       |
//! | `$PnD`           | `visualization_scale`    | `(String, f64, f64)`  |
//! | `$PnF`           | `optical_filter`         | `&str`                |
//! | `$PnG`           | `gain`                   | `f64`                 |
//! | `$PnL`           | `excitation_wavelengths` | `Vec<u32>`            |
//! | `$PnO`           | `excitation_power`       | `f64`                 |
//! | `$PnP`           | `emitted_light`          | `f64`                 |
//! | `$PnS`           | `long_name`              | `&str`                |
//! | `$PnT`           | `detector_type`          | `&str`                |
//! | `$PnV`           | `detector_voltage`       | `f64`                 |

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{FcsError, Result};

/// Default `$PnB` for float data.
pub const DEFAULT_BITS: u32 = 32;

/// Default `$PnR` given to parameters created from scratch.
pub const DEFAULT_RANGE: u32 = 262_144;

/// Normalize a parameter key to its generic form.
///
/// Accepts a bare suffix (`"N"`) or a generic key in any case (`"$pnn"`).
#[must_use]
pub fn generic_key(key: &str) -> String {
    let upper = key.to_uppercase();
    let bytes = upper.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'$' && matches!(bytes[1], b'P' | b'G') && bytes[2] == b'N'
    {
        format!("${}n{}", bytes[1] as char, &upper[3..])
    } else {
        format!("$Pn{upper}")
    }
}

/// Keywords describing one parameter (one DATA column).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    values: BTreeMap<String, String>,
}

impl Parameter {
    /// Create a parameter with only a short name.
    pub fn new(short_name: &str) -> Result<Self> {
        let mut parameter = Self::default();
        parameter.set_short_name(short_name)?;
        Ok(parameter)
    }

    /// Create a parameter carrying every required keyword with float defaults.
    pub fn with_defaults(short_name: &str) -> Result<Self> {
        let mut parameter = Self::new(short_name)?;
        parameter.set_bits(DEFAULT_BITS);
        parameter.set_amplification(0.0, 0.0);
        parameter.set_range(f64::from(DEFAULT_RANGE));
        Ok(parameter)
    }

    /// Look up a value by suffix or generic key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&generic_key(key)).map(String::as_str)
    }

    /// Whether a key is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&generic_key(key))
    }

    /// Set a value by suffix or generic key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let generic = generic_key(key);
        if generic.len() <= 3 || value.is_empty() {
            return Err(FcsError::validation(format!(
                "empty parameter keyword or value (key {key:?})"
            )));
        }
        self.values.insert(generic, value.to_string());
        Ok(())
    }

    /// Remove a value, returning it.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(&generic_key(key))
    }

    /// Keep only generic keys for which `keep` is true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.values.retain(|key, _| keep(key));
    }

    /// Iterate `(generic key, value)` in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of keywords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keyword is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert_number(&mut self, key: &str, value: f64) {
        self.values.insert(generic_key(key), format_number(value));
    }

    fn required(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| {
            FcsError::validation(format!("parameter has no {} keyword", generic_key(key)))
        })
    }

    fn parse_required<T: FromStr>(&self, key: &str) -> Result<T> {
        let raw = self.required(key)?;
        parse_value(key, raw)
    }

    fn parse_optional<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        self.get(key).map(|raw| parse_value(key, raw)).transpose()
    }

    /// `$PnN`.
    pub fn short_name(&self) -> Result<&str> {
        self.required("N")
    }

    /// Set `$PnN`.
    pub fn set_short_name(&mut self, name: &str) -> Result<()> {
        self.set("N", name)
    }

    /// `$PnB`.
    pub fn bits(&self) -> Result<u32> {
        self.parse_required("B")
    }

    /// Set `$PnB`.
    pub fn set_bits(&mut self, bits: u32) {
        self.values.insert(generic_key("B"), bits.to_string());
    }

    /// `$PnE` as `(decades, offset)`.
    pub fn amplification(&self) -> Result<(f64, f64)> {
        let raw = self.required("E")?;
        let (first, second) = raw
            .split_once(',')
            .ok_or_else(|| FcsError::validation(format!("$PnE value {raw:?} is not f1,f2")))?;
        Ok((parse_value("E", first)?, parse_value("E", second)?))
    }

    /// Set `$PnE`.
    pub fn set_amplification(&mut self, decades: f64, offset: f64) {
        self.values.insert(
            generic_key("E"),
            format!("{},{}", format_number(decades), format_number(offset)),
        );
    }

    /// `$PnR`.
    pub fn range(&self) -> Result<f64> {
        self.parse_required("R")
    }

    /// Set `$PnR` on this parameter.
    pub fn set_range(&mut self, range: f64) {
        self.insert_number("R", range);
    }

    /// `$PnCALIBRATION` as `(scale, unit)`.
    pub fn calibration(&self) -> Result<Option<(f64, String)>> {
        let Some(raw) = self.get("CALIBRATION") else {
            return Ok(None);
        };
        let (scale, unit) = raw.split_once(',').ok_or_else(|| {
            FcsError::validation(format!("$PnCALIBRATION value {raw:?} is not f,unit"))
        })?;
        Ok(Some((parse_value("CALIBRATION", scale)?, unit.to_string())))
    }

    /// Set `$PnCALIBRATION`.
    pub fn set_calibration(&mut self, scale: f64, unit: &str) -> Result<()> {
        self.set("CALIBRATION", &format!("{},{unit}", format_number(scale)))
    }

    /// `$PnD` as `(scale type, f1, f2)`.
    pub fn visualization_scale(&self) -> Result<Option<(String, f64, f64)>> {
        let Some(raw) = self.get("D") else {
            return Ok(None);
        };
        let mut parts = raw.rsplitn(3, ',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(second), Some(first), Some(kind)) => Ok(Some((
                kind.to_string(),
                parse_value("D", first)?,
                parse_value("D", second)?,
            ))),
            _ => Err(FcsError::validation(format!(
                "$PnD value {raw:?} is not type,f1,f2"
            ))),
        }
    }

    /// Set `$PnD`.
    pub fn set_visualization_scale(&mut self, kind: &str, first: f64, second: f64) -> Result<()> {
        self.set(
            "D",
            &format!("{kind},{},{}", format_number(first), format_number(second)),
        )
    }

    /// `$PnF`.
    #[must_use]
    pub fn optical_filter(&self) -> Option<&str> {
        self.get("F")
    }

    /// Set `$PnF`.
    pub fn set_optical_filter(&mut self, filter: &str) -> Result<()> {
        self.set("F", filter)
    }

    /// `$PnG`.
    pub fn gain(&self) -> Result<Option<f64>> {
        self.parse_optional("G")
    }

    /// Set `$PnG`.
    pub fn set_gain(&mut self, gain: f64) {
        self.insert_number("G", gain);
    }

    /// `$PnL`.
    pub fn excitation_wavelengths(&self) -> Result<Option<Vec<u32>>> {
        let Some(raw) = self.get("L") else {
            return Ok(None);
        };
        raw.split(',')
            .map(|part| parse_value("L", part))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Set `$PnL`.
    pub fn set_excitation_wavelengths(&mut self, wavelengths: &[u32]) -> Result<()> {
        let joined = wavelengths
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.set("L", &joined)
    }

    /// `$PnO` in mW.
    pub fn excitation_power(&self) -> Result<Option<f64>> {
        self.parse_optional("O")
    }

    /// Set `$PnO`.
    pub fn set_excitation_power(&mut self, power: f64) {
        self.insert_number("O", power);
    }

    /// `$PnP` as a percentage.
    pub fn emitted_light(&self) -> Result<Option<f64>> {
        self.parse_optional("P")
    }

    /// Set `$PnP`.
    pub fn set_emitted_light(&mut self, percent: f64) {
        self.insert_number("P", percent);
    }

    /// `$PnS`.
    #[must_use]
    pub fn long_name(&self) -> Option<&str> {
        self.get("S")
    }

    /// Set `$PnS`.
    pub fn set_long_name(&mut self, name: &str) -> Result<()> {
        self.set("S", name)
    }

    /// `$PnT`.
    #[must_use]
    pub fn detector_type(&self) -> Option<&str> {
        self.get("T")
    }

    /// Set `$PnT`.
    pub fn set_detector_type(&mut self, detector: &str) -> Result<()> {
        self.set("T", detector)
    }

    /// `$PnV` in volts.
    pub fn detector_voltage(&self) -> Result<Option<f64>> {
        self.parse_optional("V")
    }

    /// Set `$PnV`.
    pub fn set_detector_voltage(&mut self, volts: f64) {
        self.insert_number("V", volts);
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        FcsError::validation(format!("cannot parse {} value {raw:?}", generic_key(key)))
    })
}

/// Format a number without a trailing `.0` for whole values.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Parameters keyed by their 1-based index.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    entries: BTreeMap<u32, Parameter>,
}

impl ParameterTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parameters (`$PAR`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameters in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.entries.values()
    }

    /// Mutable parameters in ascending index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.entries.values_mut()
    }

    /// Parameter at a 0-based position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Parameter> {
        self.entries.values().nth(position)
    }

    /// Mutable parameter at a 0-based position.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut Parameter> {
        self.entries.values_mut().nth(position)
    }

    /// Embedded indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = u32> {
        self.entries.keys().copied()
    }

    /// 0-based position of the first parameter with this short name.
    pub fn index_of(&self, short_name: &str) -> Result<usize> {
        self.iter()
            .position(|p| p.short_name().ok() == Some(short_name))
            .ok_or_else(|| FcsError::validation(format!("no parameter named {short_name:?}")))
    }

    /// Short names in order; parameters without `$PnN` yield an empty string.
    #[must_use]
    pub fn short_names(&self) -> Vec<&str> {
        self.iter().map(|p| p.short_name().unwrap_or("")).collect()
    }

    /// Store a value found in TEXT under its embedded index.
    pub(crate) fn set_raw(&mut self, index: u32, generic: &str, value: &str) -> Result<()> {
        self.entries.entry(index).or_default().set(generic, value)
    }

    /// Build a compact table (indices 1..=n) from parameters in order.
    pub(crate) fn from_ordered(parameters: Vec<Parameter>) -> Self {
        Self {
            entries: (1u32..).zip(parameters).collect(),
        }
    }

    /// Parameters in order, consuming the table.
    pub(crate) fn into_ordered(self) -> Vec<Parameter> {
        self.entries.into_values().collect()
    }
}

impl PartialEq for ParameterTable {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}
