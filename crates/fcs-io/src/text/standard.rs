//! Catalogue of documented FCS 3.x keywords and typed access to the
//! non-parameter standard keywords.
//!
//! Documented keyword templates use a lowercase `n` where the format allows a
//! decimal index (`$PnN`, `$RnI`, `$PKNn`).

use crate::data::{ByteOrder, DataType};
use crate::error::{FcsError, Result};

use super::keywords::KeywordStore;

/// The keywords every FCS 3.x data set must carry, with descriptions.
pub const REQUIRED_KEYWORDS: [(&str, &str); 16] = [
    ("$BEGINANALYSIS", "Byte-offset to the beginning of the ANALYSIS segment."),
    ("$BEGINDATA", "Byte-offset to the beginning of the DATA segment."),
    ("$BEGINSTEXT", "Byte-offset to the beginning of a supplemental TEXT segment."),
    ("$BYTEORD", "Byte order for data acquisition computer."),
    ("$DATATYPE", "Type of data in DATA segment (ASCII, integer, floating point)."),
    ("$ENDANALYSIS", "Byte-offset to the last byte of the ANALYSIS segment."),
    ("$ENDDATA", "Byte-offset to the last byte of the DATA segment."),
    ("$ENDSTEXT", "Byte-offset to the last byte of a supplemental TEXT segment."),
    ("$MODE", "Data mode (list mode - preferred, histogram - deprecated)."),
    ("$NEXTDATA", "Byte offset to next data set in the file."),
    ("$PAR", "Number of parameters in an event."),
    ("$PnB", "Number of bits reserved for parameter number n."),
    ("$PnE", "Amplification type for parameter n."),
    ("$PnN", "Short name for parameter n."),
    ("$PnR", "Range for parameter number n."),
    ("$TOT", "Total number of events in the data set."),
];

/// Required keywords stored in the flat keyword store.
pub const REQUIRED_STANDARD_KEYWORDS: [&str; 10] = [
    "$BEGINANALYSIS",
    "$BEGINDATA",
    "$BEGINSTEXT",
    "$BYTEORD",
    "$DATATYPE",
    "$ENDANALYSIS",
    "$ENDDATA",
    "$ENDSTEXT",
    "$MODE",
    "$NEXTDATA",
];

/// Required per-parameter keywords, in generic form.
pub const REQUIRED_PARAMETER_KEYWORDS: [&str; 4] = ["$PnB", "$PnE", "$PnN", "$PnR"];

/// Documented optional keywords, with descriptions.
pub const OPTIONAL_KEYWORDS: &[(&str, &str)] = &[
    ("$ABRT", "Events lost due to data acquisition electronic coincidence."),
    ("$BTIM", "Clock time at beginning of data acquisition."),
    ("$CELLS", "Description of objects measured."),
    ("$COM", "Comment."),
    ("$CSMODE", "Cell subset mode, number of subsets to which an object may belong."),
    ("$CSVBITS", "Number of bits used to encode a cell subset identifier."),
    ("$CSVnFLAG", "The bit set as a flag for subset n."),
    ("$CYT", "Type of flow cytometer."),
    ("$CYTSN", "Flow cytometer serial number."),
    ("$DATE", "Date of data set acquisition."),
    ("$ETIM", "Clock time at end of data acquisition."),
    ("$EXP", "Name of investigator initiating the experiment."),
    ("$FIL", "Name of the data file containing the data set."),
    ("$GATE", "Number of gating parameters."),
    ("$GATING", "Specifies region combinations used for gating."),
    ("$GnE", "Amplification type for gating parameter number n (deprecated)."),
    ("$GnF", "Optical filter used for gating parameter number n (deprecated)."),
    ("$GnN", "Name of gating parameter number n (deprecated)."),
    ("$GnP", "Percent of emitted light collected by gating parameter n (deprecated)."),
    ("$GnR", "Range of gating parameter n (deprecated)."),
    ("$GnS", "Name used for gating parameter n (deprecated)."),
    ("$GnT", "Detector type for gating parameter n (deprecated)."),
    ("$GnV", "Detector voltage for gating parameter n (deprecated)."),
    ("$INST", "Institution at which data was acquired."),
    ("$LAST_MODIFIED", "Timestamp of the last modification of the data set."),
    ("$LAST_MODIFIER", "Name of the person performing last modification of a data set."),
    ("$LOST", "Number of events lost due to computer busy."),
    ("$OP", "Name of flow cytometry operator."),
    ("$ORIGINALITY", "Whether the data set has been modified or is as acquired."),
    ("$PKn", "Peak channel number of univariate histogram for parameter n (deprecated)."),
    ("$PKNn", "Count in peak channel of univariate histogram for parameter n (deprecated)."),
    ("$PLATEID", "Plate identifier."),
    ("$PLATENAME", "Plate name."),
    ("$PnCALIBRATION", "Conversion of parameter values to any well defined units, e.g., MESF."),
    ("$PnD", "Suggested visualization scale for parameter n."),
    ("$PnF", "Name of optical filter for parameter n."),
    ("$PnG", "Amplifier gain used for acquisition of parameter n."),
    ("$PnL", "Excitation wavelength(s) for parameter n."),
    ("$PnO", "Excitation power for parameter n."),
    ("$PnP", "Percent of emitted light collected by parameter n."),
    ("$PnS", "Name used for parameter n."),
    ("$PnT", "Detector type for parameter n."),
    ("$PnV", "Detector voltage for parameter n."),
    ("$PROJ", "Name of the experiment project."),
    ("$RnI", "Gating region for parameter number n."),
    ("$RnW", "Window settings for gating region n."),
    ("$SMNO", "Specimen (e.g., tube) label."),
    ("$SPILLOVER", "Fluorescence spillover matrix."),
    ("$SRC", "Source of the specimen (patient name, cell types)."),
    ("$SYS", "Type of computer and its operating system."),
    ("$TIMESTEP", "Time step for time parameter."),
    ("$TR", "Trigger, parameter and its threshold."),
    ("$VOL", "Volume of sample run during data acquisition."),
    ("$WELLID", "Well identifier."),
];

/// Where a keyword sits in the documented catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordClass {
    Required,
    Optional,
    /// Not documented by the standard (vendor or user keyword).
    Custom,
}

/// Classify a concrete keyword (`$P3N`, `$CYT`, `MYKEY`) against the catalogue.
#[must_use]
pub fn classify_documented(key: &str) -> KeywordClass {
    if find_template(&REQUIRED_KEYWORDS, key).is_some() {
        KeywordClass::Required
    } else if find_template(OPTIONAL_KEYWORDS, key).is_some() {
        KeywordClass::Optional
    } else {
        KeywordClass::Custom
    }
}

/// Description of a documented keyword, if any.
#[must_use]
pub fn keyword_description(key: &str) -> Option<&'static str> {
    find_template(&REQUIRED_KEYWORDS, key).or_else(|| find_template(OPTIONAL_KEYWORDS, key))
}

fn find_template(catalogue: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    catalogue
        .iter()
        .find(|(template, _)| matches_template(template, key))
        .map(|(_, description)| *description)
}

/// Match a keyword against a template, `n` standing for one or more digits.
fn matches_template(template: &str, key: &str) -> bool {
    let key = key.as_bytes();
    let mut pos = 0usize;
    for t in template.bytes() {
        if t == b'n' {
            let digits = key[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
            if digits == 0 {
                return false;
            }
            pos += digits;
        } else {
            match key.get(pos) {
                Some(k) if k.eq_ignore_ascii_case(&t) => pos += 1,
                _ => return false,
            }
        }
    }
    pos == key.len()
}

impl KeywordStore {
    /// A byte-offset keyword such as `$BEGINDATA`; missing reads as 0.
    pub fn offset(&self, key: &str) -> Result<u64> {
        match self.get(key) {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|_| {
                FcsError::format(format!("{key} value {raw:?} is not a byte offset"))
            }),
        }
    }

    /// Set a byte-offset keyword.
    pub fn set_offset(&mut self, key: &str, offset: u64) -> Result<()> {
        self.insert(key, &offset.to_string())
    }

    /// `$BYTEORD` as a byte order.
    pub fn byte_order(&self) -> Result<ByteOrder> {
        let raw = self
            .get("$BYTEORD")
            .ok_or_else(|| FcsError::format("missing $BYTEORD keyword"))?;
        ByteOrder::parse(raw)
    }

    /// Set `$BYTEORD`.
    pub fn set_byte_order(&mut self, order: ByteOrder) -> Result<()> {
        self.insert("$BYTEORD", order.as_keyword())
    }

    /// `$DATATYPE` as an element type.
    pub fn data_type(&self) -> Result<DataType> {
        let raw = self
            .get("$DATATYPE")
            .ok_or_else(|| FcsError::format("missing $DATATYPE keyword"))?;
        DataType::parse(raw)
    }

    /// Set `$DATATYPE`.
    pub fn set_data_type(&mut self, data_type: DataType) -> Result<()> {
        self.insert("$DATATYPE", data_type.as_keyword())
    }

    /// `$MODE`.
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        self.get("$MODE")
    }

    /// Reject features that neither the reader nor the writer handles:
    /// `$MODE` other than `L`, a supplemental TEXT segment and an ANALYSIS
    /// segment.
    pub(crate) fn check_supported(&self) -> Result<()> {
        if let Some(mode) = self.mode()
            && !mode.trim().eq_ignore_ascii_case("L")
        {
            return Err(FcsError::unsupported(format!("$MODE {mode} (only L)")));
        }
        if self.offset("$BEGINSTEXT")? != 0 && self.offset("$ENDSTEXT")? != 0 {
            return Err(FcsError::unsupported("supplemental TEXT segment"));
        }
        if self.offset("$BEGINANALYSIS")? != 0 && self.offset("$ENDANALYSIS")? != 0 {
            return Err(FcsError::unsupported("ANALYSIS segment"));
        }
        Ok(())
    }
}
