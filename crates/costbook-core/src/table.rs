//! Header detection and positional row mapping.
//!
//! The sheet has no fixed header position. [`load_rows`] scans for the first
//! row accepted by a [`HeaderDetector`], discards it and everything above
//! it, and maps each remaining row onto the seven known columns:
//!
//! | Column | Field |
//! |--------|-------|
//! | 0 | code |
//! | 1 | kind |
//! | 2 | unit |
//! | 3 | description |
//! | 4 | quantity |
//! | 5 | unit price |
//! | 6 | extended amount |
//!
//! Extra columns are ignored; missing trailing columns read as [`Cell::Empty`].

use crate::cell::{Cell, RawTable};
use crate::error::ParseError;
use crate::models::Row;

/// Default label of the code column.
pub const DEFAULT_CODE_LABEL: &str = "Código";
/// Default label of the kind column.
pub const DEFAULT_KIND_LABEL: &str = "Tipo";

const COL_CODE: usize = 0;
const COL_KIND: usize = 1;
const COL_UNIT: usize = 2;
const COL_DESCRIPTION: usize = 3;
const COL_QUANTITY: usize = 4;
const COL_UNIT_PRICE: usize = 5;
const COL_AMOUNT: usize = 6;

/// Decides which row is the header.
pub trait HeaderDetector {
    fn is_header(&self, cells: &[Cell]) -> bool;

    /// Human-readable description of the expected header, used in errors.
    fn describe(&self) -> String {
        "a row accepted by the custom header detector".to_string()
    }
}

impl<F> HeaderDetector for F
where
    F: Fn(&[Cell]) -> bool,
{
    fn is_header(&self, cells: &[Cell]) -> bool {
        self(cells)
    }
}

/// Matches a header whose first two cells are exactly the given labels.
///
/// Comparison is case-sensitive and does not trim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLabels {
    pub code: String,
    pub kind: String,
}

impl HeaderLabels {
    pub fn new(code: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind: kind.into(),
        }
    }
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LABEL, DEFAULT_KIND_LABEL)
    }
}

impl HeaderDetector for HeaderLabels {
    fn is_header(&self, cells: &[Cell]) -> bool {
        matches!(
            (cells.get(COL_CODE), cells.get(COL_KIND)),
            (Some(Cell::Text(code)), Some(Cell::Text(kind)))
                if *code == self.code && *kind == self.kind
        )
    }

    fn describe(&self) -> String {
        format!("first two cells \"{}\", \"{}\"", self.code, self.kind)
    }
}

/// Locate the header and map every following row onto a [`Row`].
///
/// Row indices are 0-based offsets into the post-header sequence.
pub fn load_rows<H>(table: &RawTable, detector: &H) -> Result<Vec<Row>, ParseError>
where
    H: HeaderDetector + ?Sized,
{
    let header_at = table
        .rows()
        .iter()
        .position(|cells| detector.is_header(cells))
        .ok_or_else(|| ParseError::HeaderNotFound {
            expected: detector.describe(),
        })?;

    tracing::debug!(header_row = header_at, "found header row");

    let rows: Vec<Row> = table.rows()[header_at + 1..]
        .iter()
        .enumerate()
        .map(|(row_index, cells)| to_row(row_index, cells))
        .collect();

    tracing::info!("Loaded table with {} rows", rows.len());
    Ok(rows)
}

fn to_row(row_index: usize, cells: &[Cell]) -> Row {
    let cell = |col: usize| cells.get(col).cloned().unwrap_or_default();
    let text = |col: usize| cells.get(col).and_then(Cell::to_text);

    Row {
        row_index,
        code: text(COL_CODE),
        kind: text(COL_KIND),
        unit: text(COL_UNIT),
        description: text(COL_DESCRIPTION).unwrap_or_default(),
        quantity: cell(COL_QUANTITY),
        unit_price: cell(COL_UNIT_PRICE),
        amount: cell(COL_AMOUNT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<Cell> {
        vec![
            Cell::from("Código"),
            Cell::from("Tipo"),
            Cell::from("Ud"),
            Cell::from("Resumen"),
            Cell::from("Cantidad"),
            Cell::from("Precio (€)"),
            Cell::from("Importe (€)"),
        ]
    }

    #[test]
    fn test_header_not_found() {
        let table = RawTable::new(vec![vec![Cell::from("Code"), Cell::from("Type")]]);
        let err = load_rows(&table, &HeaderLabels::default()).unwrap_err();
        assert!(matches!(err, ParseError::HeaderNotFound { .. }));
        assert!(err.to_string().contains("Código"));
    }

    #[test]
    fn test_header_match_is_exact() {
        let labels = HeaderLabels::default();
        assert!(!labels.is_header(&[Cell::from("código"), Cell::from("Tipo")]));
        assert!(!labels.is_header(&[Cell::from("Código "), Cell::from("Tipo")]));
        assert!(!labels.is_header(&[Cell::from("Código")]));
        assert!(labels.is_header(&header()));
    }

    #[test]
    fn test_rows_before_header_are_discarded() {
        let table = RawTable::new(vec![
            vec![Cell::from("PRESUPUESTO")],
            vec![],
            header(),
            vec![Cell::from("A1"), Cell::from("Partida")],
        ]);
        let rows = load_rows(&table, &HeaderLabels::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_index, 0);
        assert_eq!(rows[0].code.as_deref(), Some("A1"));
    }

    #[test]
    fn test_only_first_header_counts() {
        let table = RawTable::new(vec![header(), vec![Cell::from("x")], header()]);
        let rows = load_rows(&table, &HeaderLabels::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].code.as_deref(), Some("Código"));
        assert_eq!(rows[1].row_index, 1);
    }

    #[test]
    fn test_positional_mapping() {
        let table = RawTable::new(vec![
            header(),
            vec![
                Cell::from("A1"),
                Cell::from("Partida"),
                Cell::from("m2"),
                Cell::from("Demolición"),
                Cell::Number(2.0),
                Cell::Number(10.0),
                Cell::Number(20.0),
                Cell::from("ignored"),
            ],
            vec![Cell::from("B1"), Cell::Empty, Cell::Empty, Cell::from("short")],
        ]);
        let rows = load_rows(&table, &HeaderLabels::default()).unwrap();
        assert_eq!(rows[0].unit.as_deref(), Some("m2"));
        assert_eq!(rows[0].description, "Demolición");
        assert_eq!(rows[0].quantity, Cell::Number(2.0));
        assert_eq!(rows[0].unit_price, Cell::Number(10.0));
        assert_eq!(rows[0].amount, Cell::Number(20.0));

        assert_eq!(rows[1].kind, None);
        assert_eq!(rows[1].description, "short");
        assert_eq!(rows[1].unit_price, Cell::Empty);
        assert_eq!(rows[1].amount, Cell::Empty);
    }

    #[test]
    fn test_closure_detector() {
        let table = RawTable::new(vec![
            vec![Cell::from("Code"), Cell::from("Type")],
            vec![Cell::from("A1")],
        ]);
        let detector = |cells: &[Cell]| cells.first() == Some(&Cell::from("Code"));
        let rows = load_rows(&table, &detector).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
