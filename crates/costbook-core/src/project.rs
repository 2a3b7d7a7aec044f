//! Read-only views over a [`ParsedDatabase`].
//!
//! Each view borrows from the database and keeps main-entry order. None of
//! them re-run the parse.

use serde::Serialize;

use crate::models::ParsedDatabase;

/// Code and description of one main entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CodeDescription<'a> {
    pub code: &'a str,
    pub description: &'a str,
}

/// Summary record of one main entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetailedEntry<'a> {
    pub code: &'a str,
    pub kind: &'a str,
    pub unit: Option<&'a str>,
    pub description: &'a str,
    pub unit_price: f64,
    pub sub_entry_count: usize,
}

pub fn project_code_description(db: &ParsedDatabase) -> Vec<CodeDescription<'_>> {
    db.iter()
        .map(|e| CodeDescription {
            code: &e.code,
            description: &e.description,
        })
        .collect()
}

pub fn project_description_only(db: &ParsedDatabase) -> Vec<&str> {
    db.iter().map(|e| e.description.as_str()).collect()
}

pub fn project_detailed(db: &ParsedDatabase) -> Vec<DetailedEntry<'_>> {
    db.iter()
        .map(|e| DetailedEntry {
            code: &e.code,
            kind: &e.kind,
            unit: e.unit.as_deref(),
            description: &e.description,
            unit_price: e.unit_price,
            sub_entry_count: e.sub_entries.len(),
        })
        .collect()
}
