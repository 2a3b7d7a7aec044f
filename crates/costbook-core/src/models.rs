//! Core data models used throughout Costbook.
//!
//! [`Row`]s are transient: the table loader produces them and the extractor
//! turns each one into a [`MainEntry`] header, a [`SubEntry`], or nothing.
//! The resulting [`ParsedDatabase`] is read-only once built.

use serde::Serialize;

use crate::cell::Cell;

/// One post-header spreadsheet line mapped onto the seven known columns.
///
/// Numeric columns keep the raw [`Cell`] so the classifier can check the
/// price cell for presence before any coercion happens.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 0-based offset into the rows that follow the header.
    pub row_index: usize,
    pub code: Option<String>,
    pub kind: Option<String>,
    pub unit: Option<String>,
    /// Empty when the cell is missing.
    pub description: String,
    pub quantity: Cell,
    pub unit_price: Cell,
    pub amount: Cell,
}

impl Row {
    /// A row with no code, no kind, and no description.
    pub fn is_blank(&self) -> bool {
        self.code.is_none() && self.kind.is_none() && self.description.is_empty()
    }
}

/// A component line attached to the nearest preceding main entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubEntry {
    pub code: Option<String>,
    pub kind: Option<String>,
    pub unit: Option<String>,
    pub description: String,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub amount: Option<f64>,
    pub row_index: usize,
}

/// A top-level priced line item and its components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainEntry {
    /// Trimmed, never empty.
    pub code: String,
    pub kind: String,
    pub unit: Option<String>,
    /// Trimmed.
    pub description: String,
    /// `0.0` when the source cell was present but not numeric.
    pub unit_price: f64,
    pub row_index: usize,
    /// In source row order.
    pub sub_entries: Vec<SubEntry>,
}

/// The ordered main entries produced by one parse.
///
/// Order is the order in which main entries first appear in the sheet.
/// Codes are not deduplicated.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ParsedDatabase {
    entries: Vec<MainEntry>,
}

impl ParsedDatabase {
    pub(crate) fn new(entries: Vec<MainEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MainEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MainEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of sub-entries across all main entries.
    pub fn sub_entry_count(&self) -> usize {
        self.entries.iter().map(|e| e.sub_entries.len()).sum()
    }

    /// All main entries whose code equals `code` exactly, in order.
    pub fn find_by_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a MainEntry> + 'a {
        self.entries.iter().filter(move |e| e.code == code)
    }
}

impl<'a> IntoIterator for &'a ParsedDatabase {
    type Item = &'a MainEntry;
    type IntoIter = std::slice::Iter<'a, MainEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
