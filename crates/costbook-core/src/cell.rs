//! Untyped spreadsheet values and the raw table they form.
//!
//! A [`RawTable`] is what a spreadsheet reader hands to the parser: ordered
//! rows of ordered [`Cell`]s, with no header assumed and no column typing.
//! Both types deserialize from plain JSON (`null`, strings, numbers,
//! booleans; an array of arrays for the table), so a table can be produced
//! by any external decoder.

use serde::{Deserialize, Serialize};

/// Largest magnitude rendered as an integer by [`Cell::to_text`].
const MAX_INTEGRAL_TEXT: f64 = 1e15;

/// A single untyped spreadsheet value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Missing value (blank cell, error cell, or a column past the row end).
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Whether the cell carries a value at all.
    ///
    /// `Empty`, a NaN number, and whitespace-only text are all treated as
    /// missing, the way spreadsheet readers report blank cells.
    pub fn is_present(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Number(n) => !n.is_nan(),
            Cell::Text(s) => !s.trim().is_empty(),
            Cell::Bool(_) => true,
        }
    }

    /// Whether the cell is a spreadsheet null: `Empty` or a NaN number.
    ///
    /// Unlike [`Cell::is_present`], whitespace-only text is not null. The
    /// unit-price check uses this raw test.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(n) => n.is_nan(),
            Cell::Text(_) | Cell::Bool(_) => false,
        }
    }

    /// Text rendering of the cell, or `None` when it is not present.
    ///
    /// Integral numbers render without a fractional part so numeric codes
    /// read back as `101` rather than `101.0`. Text is returned verbatim.
    pub fn to_text(&self) -> Option<String> {
        if !self.is_present() {
            return None;
        }
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < MAX_INTEGRAL_TEXT => {
                Some(format!("{}", *n as i64))
            }
            Cell::Number(n) => Some(n.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Empty => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Empty)
    }
}

/// One sheet as ordered rows of ordered cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row. Used by decoders that stream a sheet.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }
}

impl From<Vec<Vec<Cell>>> for RawTable {
    fn from(rows: Vec<Vec<Cell>>) -> Self {
        Self::new(rows)
    }
}
