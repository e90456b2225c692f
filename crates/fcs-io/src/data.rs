//! DATA segment transcoding.
//!
//! The DATA segment holds `$TOT * $PAR` elements in row-major order: every
//! event is one row, every parameter one column. Only `$DATATYPE/F/`
//! (IEEE-754 single precision) is decoded; the byte order comes from
//! `$BYTEORD`.

use std::fmt;

use crate::error::{FcsError, Result};

/// Width of one float element in bytes.
pub const FLOAT_WIDTH: usize = 4;

/// Byte order of DATA elements as declared by `$BYTEORD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// `1,2,3,4`
    #[default]
    LittleEndian,
    /// `4,3,2,1`
    BigEndian,
}

impl ByteOrder {
    /// Parse a `$BYTEORD` value. Only the two 32-bit orders are accepted,
    /// exactly as written.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "1,2,3,4" => Ok(Self::LittleEndian),
            "4,3,2,1" => Ok(Self::BigEndian),
            other => Err(FcsError::format(format!(
                "unsupported $BYTEORD {other:?} (expected 1,2,3,4 or 4,3,2,1)"
            ))),
        }
    }

    /// The `$BYTEORD` keyword value.
    #[must_use]
    pub const fn as_keyword(self) -> &'static str {
        match self {
            Self::LittleEndian => "1,2,3,4",
            Self::BigEndian => "4,3,2,1",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LittleEndian => write!(f, "little endian"),
            Self::BigEndian => write!(f, "big endian"),
        }
    }
}

/// Element type declared by `$DATATYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// `I`: unsigned integers.
    Integer,
    /// `F`: 32-bit floats.
    Float,
    /// `D`: 64-bit floats.
    Double,
    /// `A`: ASCII.
    Ascii,
}

impl DataType {
    /// Parse a `$DATATYPE` value.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "I" => Ok(Self::Integer),
            "F" => Ok(Self::Float),
            "D" => Ok(Self::Double),
            "A" => Ok(Self::Ascii),
            other => Err(FcsError::format(format!(
                "invalid $DATATYPE {other:?} (expected I, F, D or A)"
            ))),
        }
    }

    /// The `$DATATYPE` keyword value.
    #[must_use]
    pub const fn as_keyword(self) -> &'static str {
        match self {
            Self::Integer => "I",
            Self::Float => "F",
            Self::Double => "D",
            Self::Ascii => "A",
        }
    }
}

/// Row-major matrix of 32-bit floats.
///
/// A matrix always knows its column count, even with zero rows, so an empty
/// event list still agrees with `$PAR`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMatrix {
    rows: usize,
    columns: usize,
    values: Vec<f32>,
}

impl DataMatrix {
    /// An empty matrix with the given column count.
    #[must_use]
    pub fn with_columns(columns: usize) -> Self {
        Self {
            rows: 0,
            columns,
            values: Vec::new(),
        }
    }

    /// Build from rows; every row must have `columns` values.
    pub fn from_rows(rows: Vec<Vec<f32>>, columns: usize) -> Result<Self> {
        let mut values = Vec::with_capacity(rows.len() * columns);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(FcsError::validation(format!(
                    "row {index} has {} values but there are {columns} parameters",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            columns,
            values,
        })
    }

    /// Decode `rows * columns` elements from the start of `bytes`.
    ///
    /// Only [`DataType::Float`] is supported. Bytes past the matrix are
    /// ignored; a short buffer is a format error.
    pub fn decode(
        bytes: &[u8],
        rows: usize,
        columns: usize,
        data_type: DataType,
        order: ByteOrder,
    ) -> Result<Self> {
        if data_type != DataType::Float {
            return Err(FcsError::unsupported(format!(
                "$DATATYPE {} (only F is implemented)",
                data_type.as_keyword()
            )));
        }
        let count = rows
            .checked_mul(columns)
            .ok_or_else(|| FcsError::format("$TOT * $PAR overflows"))?;
        let needed = count
            .checked_mul(FLOAT_WIDTH)
            .ok_or_else(|| FcsError::format("DATA length overflows"))?;
        if bytes.len() < needed {
            return Err(FcsError::format(format!(
                "DATA holds {} bytes but {rows} events x {columns} parameters need {needed}",
                bytes.len()
            )));
        }

        let values = bytes[..needed]
            .chunks_exact(FLOAT_WIDTH)
            .map(|chunk| {
                let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
                match order {
                    ByteOrder::LittleEndian => f32::from_le_bytes(raw),
                    ByteOrder::BigEndian => f32::from_be_bytes(raw),
                }
            })
            .collect();
        Ok(Self {
            rows,
            columns,
            values,
        })
    }

    /// Encode as exactly `rows * columns * 4` bytes.
    #[must_use]
    pub fn encode(&self, order: ByteOrder) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.values.len() * FLOAT_WIDTH);
        for value in &self.values {
            match order {
                ByteOrder::LittleEndian => out.extend_from_slice(&value.to_le_bytes()),
                ByteOrder::BigEndian => out.extend_from_slice(&value.to_be_bytes()),
            }
        }
        out
    }

    /// Number of rows (events).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (parameters).
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Byte length of the encoded matrix.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.values.len() * FLOAT_WIDTH
    }

    /// One row.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        (index < self.rows).then(|| &self.values[index * self.columns..(index + 1) * self.columns])
    }

    /// Iterate rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.rows).map(move |r| &self.values[r * self.columns..(r + 1) * self.columns])
    }

    /// Copy of one column.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<Vec<f32>> {
        (index < self.columns).then(|| self.iter_rows().map(|row| row[index]).collect())
    }

    /// One value.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        (row < self.rows && column < self.columns)
            .then(|| self.values[row * self.columns + column])
    }

    /// Overwrite one value.
    pub fn set(&mut self, row: usize, column: usize, value: f32) -> Result<()> {
        if row >= self.rows || column >= self.columns {
            return Err(FcsError::validation(format!(
                "cell ({row}, {column}) outside {}x{} matrix",
                self.rows, self.columns
            )));
        }
        self.values[row * self.columns + column] = value;
        Ok(())
    }

    /// Rows as owned vectors.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.iter_rows().map(<[f32]>::to_vec).collect()
    }

    /// Insert a column of `fill` at `position`.
    pub(crate) fn insert_column(&mut self, position: usize, fill: &[f32]) {
        let columns = self.columns + 1;
        let mut values = Vec::with_capacity(self.rows * columns);
        for (r, row) in self.iter_rows().enumerate() {
            values.extend_from_slice(&row[..position]);
            values.push(fill[r]);
            values.extend_from_slice(&row[position..]);
        }
        self.values = values;
        self.columns = columns;
    }

    /// Rebuild the matrix from the given columns, in the given order.
    pub(crate) fn select_columns(&mut self, positions: &[usize]) {
        let mut values = Vec::with_capacity(self.rows * positions.len());
        for row in self.iter_rows() {
            values.extend(positions.iter().map(|&p| row[p]));
        }
        self.values = values;
        self.columns = positions.len();
    }

    /// Rebuild the matrix from the given rows, repeats allowed.
    pub(crate) fn select_rows(&mut self, indices: &[usize]) {
        let mut values = Vec::with_capacity(indices.len() * self.columns);
        for &index in indices {
            values.extend_from_slice(&self.values[index * self.columns..(index + 1) * self.columns]);
        }
        self.values = values;
        self.rows = indices.len();
    }

    /// Append the rows of another matrix with the same column count.
    pub(crate) fn append_rows(&mut self, other: &Self) {
        self.values.extend_from_slice(&other.values);
        self.rows += other.rows;
    }
}
