//! Single-pass main/sub entry extraction.
//!
//! Walks the row sequence once, carrying one piece of state: the currently
//! open main entry. The walk is a fold over an explicit [`Accumulator`].
//!
//! # Algorithm
//!
//! For each row, in order:
//!
//! 1. **Main entry** ([`RowRules::is_main_entry`]): emit the open entry, if
//!    any, and open a new one from this row. Its unit price is coerced and
//!    falls back to `0.0` when the cell is not numeric.
//! 2. **Chapter** ([`RowRules::is_chapter`]): emit the open entry, if any,
//!    and leave nothing open. The chapter row itself is not kept.
//! 3. **Blank** (no code, no kind, no description): skipped.
//! 4. **Anything else**: appended as a [`SubEntry`] of the open entry, or
//!    dropped when no entry is open.
//!
//! At end of input the open entry is emitted. Rows ahead of the first main
//! entry are always dropped.
//!
//! Dropped, skipped, and defaulted rows are reported as [`Diagnostic`]s.
//! Diagnostics are informational and never change what is extracted.

use serde::Serialize;

use crate::classify::RowRules;
use crate::coerce::coerce;
use crate::models::{MainEntry, ParsedDatabase, Row, SubEntry};

/// What happened to a row that did not simply become a sub-entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Non-blank row with no open main entry.
    OrphanDropped,
    /// Row with no code, kind, or description.
    EmptySkipped,
    /// Chapter row that closed the open entry (or found none open).
    ChapterBoundary,
    /// Main entry whose price cell was present but not numeric; stored as `0.0`.
    PriceDefaulted,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::OrphanDropped => "orphan_dropped",
            DiagnosticKind::EmptySkipped => "empty_skipped",
            DiagnosticKind::ChapterBoundary => "chapter_boundary",
            DiagnosticKind::PriceDefaulted => "price_defaulted",
        }
    }
}

/// A note about one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub row_index: usize,
    pub kind: DiagnosticKind,
}

/// Result of an extraction: the database plus row diagnostics.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Extraction {
    pub database: ParsedDatabase,
    pub diagnostics: Vec<Diagnostic>,
}

/// State threaded through the fold.
#[derive(Debug, Default)]
struct Accumulator {
    done: Vec<MainEntry>,
    open: Option<MainEntry>,
    diagnostics: Vec<Diagnostic>,
}

impl Accumulator {
    fn step(mut self, row: &Row, rules: &RowRules) -> Self {
        if rules.is_main_entry(row) {
            self.close();
            let entry = self.open_entry(row);
            tracing::debug!(
                code = %entry.code,
                row_index = entry.row_index,
                "Found main entry"
            );
            self.open = Some(entry);
        } else if rules.is_chapter(row) {
            self.close();
            self.note(row, DiagnosticKind::ChapterBoundary);
        } else if row.is_blank() {
            self.note(row, DiagnosticKind::EmptySkipped);
        } else if let Some(open) = self.open.as_mut() {
            open.sub_entries.push(to_sub_entry(row));
        } else {
            tracing::trace!(row_index = row.row_index, "dropping row outside any main entry");
            self.note(row, DiagnosticKind::OrphanDropped);
        }
        self
    }

    fn open_entry(&mut self, row: &Row) -> MainEntry {
        let unit_price = coerce(&row.unit_price).unwrap_or_else(|| {
            self.note(row, DiagnosticKind::PriceDefaulted);
            0.0
        });

        MainEntry {
            code: row.code.as_deref().unwrap_or_default().trim().to_string(),
            kind: row.kind.clone().unwrap_or_default(),
            unit: row.unit.clone(),
            description: row.description.trim().to_string(),
            unit_price,
            row_index: row.row_index,
            sub_entries: Vec::new(),
        }
    }

    fn close(&mut self) {
        if let Some(entry) = self.open.take() {
            tracing::trace!(
                code = %entry.code,
                sub_entries = entry.sub_entries.len(),
                "closing main entry"
            );
            self.done.push(entry);
        }
    }

    fn note(&mut self, row: &Row, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic {
            row_index: row.row_index,
            kind,
        });
    }

    fn finish(mut self) -> Extraction {
        self.close();
        tracing::debug!("Total main entries extracted: {}", self.done.len());
        Extraction {
            database: ParsedDatabase::new(self.done),
            diagnostics: self.diagnostics,
        }
    }
}

fn to_sub_entry(row: &Row) -> SubEntry {
    SubEntry {
        code: row.code.clone(),
        kind: row.kind.clone(),
        unit: row.unit.clone(),
        description: row.description.clone(),
        quantity: coerce(&row.quantity),
        unit_price: coerce(&row.unit_price),
        amount: coerce(&row.amount),
        row_index: row.row_index,
    }
}

/// Build the main/sub entry tree from post-header rows.
pub fn extract<'a, I>(rows: I, rules: &RowRules) -> Extraction
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter()
        .fold(Accumulator::default(), |acc, row| acc.step(row, rules))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn row(i: usize, code: Option<&str>, kind: Option<&str>, desc: &str, price: Cell) -> Row {
        Row {
            row_index: i,
            code: code.map(str::to_string),
            kind: kind.map(str::to_string),
            unit: None,
            description: desc.to_string(),
            quantity: Cell::Empty,
            unit_price: price,
            amount: Cell::Empty,
        }
    }

    fn main_row(i: usize, code: &str) -> Row {
        row(i, Some(code), Some("Partida"), code, Cell::Number(1.0))
    }

    fn note_row(i: usize, desc: &str) -> Row {
        row(i, None, None, desc, Cell::Empty)
    }

    fn blank_row(i: usize) -> Row {
        row(i, None, None, "", Cell::Empty)
    }

    fn kinds(ex: &Extraction) -> Vec<(usize, DiagnosticKind)> {
        ex.diagnostics.iter().map(|d| (d.row_index, d.kind)).collect()
    }

    #[test]
    fn test_empty_input() {
        let ex = extract(&Vec::<Row>::new(), &RowRules::default());
        assert!(ex.database.is_empty());
        assert!(ex.diagnostics.is_empty());
    }

    #[test]
    fn test_sub_entries_attach_to_preceding_main() {
        let rows = vec![
            main_row(0, "A1"),
            note_row(1, "first"),
            note_row(2, "second"),
            main_row(3, "A2"),
            note_row(4, "third"),
        ];
        let ex = extract(&rows, &RowRules::default());
        let db = &ex.database;
        assert_eq!(db.len(), 2);
        assert_eq!(db.entries()[0].sub_entries.len(), 2);
        assert_eq!(db.entries()[0].sub_entries[1].description, "second");
        assert_eq!(db.entries()[1].sub_entries.len(), 1);
        assert_eq!(db.entries()[1].sub_entries[0].row_index, 4);
    }

    #[test]
    fn test_leading_rows_are_dropped() {
        let rows = vec![note_row(0, "preamble"), main_row(1, "A1")];
        let ex = extract(&rows, &RowRules::default());
        assert_eq!(ex.database.len(), 1);
        assert!(ex.database.entries()[0].sub_entries.is_empty());
        assert_eq!(kinds(&ex), vec![(0, DiagnosticKind::OrphanDropped)]);
    }

    #[test]
    fn test_chapter_closes_and_clears() {
        let rows = vec![
            main_row(0, "A1"),
            note_row(1, "kept"),
            row(2, Some("02"), Some("Capítulo"), "Chapter two", Cell::Empty),
            note_row(3, "orphan"),
            main_row(4, "B1"),
        ];
        let ex = extract(&rows, &RowRules::default());
        let db = &ex.database;
        assert_eq!(db.len(), 2);
        assert_eq!(db.entries()[0].sub_entries.len(), 1);
        assert!(db.entries()[1].sub_entries.is_empty());
        assert_eq!(
            kinds(&ex),
            vec![
                (2, DiagnosticKind::ChapterBoundary),
                (3, DiagnosticKind::OrphanDropped)
            ]
        );
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let rows = vec![main_row(0, "A1"), blank_row(1), note_row(2, "x")];
        let ex = extract(&rows, &RowRules::default());
        let subs = &ex.database.entries()[0].sub_entries;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].row_index, 2);
        assert_eq!(kinds(&ex), vec![(1, DiagnosticKind::EmptySkipped)]);
    }

    #[test]
    fn test_blank_row_with_numbers_is_still_blank() {
        let mut r = blank_row(1);
        r.quantity = Cell::Number(3.0);
        let rows = vec![main_row(0, "A1"), r];
        let ex = extract(&rows, &RowRules::default());
        assert!(ex.database.entries()[0].sub_entries.is_empty());
    }

    #[test]
    fn test_unparsable_main_price_defaults_to_zero() {
        let rows = vec![row(0, Some("A1"), Some("Partida"), "Pintura", Cell::from("n/d"))];
        let ex = extract(&rows, &RowRules::default());
        assert_eq!(ex.database.entries()[0].unit_price, 0.0);
        assert_eq!(kinds(&ex), vec![(0, DiagnosticKind::PriceDefaulted)]);
    }

    #[test]
    fn test_sub_entry_numbers_coerced_independently() {
        let mut sub = note_row(1, "Peón");
        sub.quantity = Cell::from("abc");
        sub.unit_price = Cell::from("5.5");
        sub.amount = Cell::Number(11.0);
        let rows = vec![main_row(0, "A1"), sub];
        let ex = extract(&rows, &RowRules::default());
        let s = &ex.database.entries()[0].sub_entries[0];
        assert_eq!(s.quantity, None);
        assert_eq!(s.unit_price, Some(5.5));
        assert_eq!(s.amount, Some(11.0));
    }

    #[test]
    fn test_main_entry_fields_trimmed() {
        let rows = vec![row(0, Some("  A1 "), Some("Partida"), "  Demolición  ", Cell::Number(3.0))];
        let ex = extract(&rows, &RowRules::default());
        let e = &ex.database.entries()[0];
        assert_eq!(e.code, "A1");
        assert_eq!(e.description, "Demolición");
        assert_eq!(e.kind, "Partida");
        assert_eq!(e.unit_price, 3.0);
    }

    #[test]
    fn test_excluded_prefix_row_becomes_sub_entry() {
        let rows = vec![
            main_row(0, "A1"),
            row(1, Some("moc-x"), Some("Partida"), "Peón", Cell::Number(5.0)),
        ];
        let ex = extract(&rows, &RowRules::default());
        assert_eq!(ex.database.len(), 1);
        let sub = &ex.database.entries()[0].sub_entries[0];
        assert_eq!(sub.code.as_deref(), Some("moc-x"));
        assert_eq!(sub.unit_price, Some(5.0));
    }
}
