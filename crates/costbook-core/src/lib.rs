//! # Costbook Core
//!
//! Reconstructs the implicit hierarchy of a construction-cost spreadsheet:
//! priced line items ("main entries"), each followed by the component rows
//! ("sub-entries") that belong to it.
//!
//! The sheet carries no grouping column. Structure is inferred from row
//! content and position alone:
//!
//! ```text
//! RawTable ──▶ table::load_rows ──▶ extract::extract ──▶ ParsedDatabase ──▶ project::*
//!               (find header,        (classify each row,
//!                map 7 columns)       fold into entries)
//! ```
//!
//! This crate does no I/O. Decoding a workbook into a [`RawTable`] is the
//! caller's job.
//!
//! # Example
//!
//! ```rust
//! use costbook_core::{parse, Cell, RawTable};
//!
//! let table = RawTable::new(vec![
//!     vec![Cell::from("Código"), Cell::from("Tipo")],
//!     vec![
//!         Cell::from("A1"),
//!         Cell::from("Partida"),
//!         Cell::from("m2"),
//!         Cell::from("Demolición"),
//!         Cell::from(2),
//!         Cell::from(10.0),
//!         Cell::from(20.0),
//!     ],
//!     vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::from("nota")],
//! ]);
//!
//! let db = parse(&table).unwrap();
//! assert_eq!(db.len(), 1);
//! assert_eq!(db.entries()[0].sub_entries.len(), 1);
//! ```

pub mod cell;
pub mod classify;
pub mod coerce;
pub mod error;
pub mod extract;
pub mod models;
pub mod parser;
pub mod project;
pub mod table;

pub use cell::{Cell, RawTable};
pub use classify::{is_main_entry, RowRules};
pub use coerce::coerce;
pub use error::ParseError;
pub use extract::{extract, Diagnostic, DiagnosticKind, Extraction};
pub use models::{MainEntry, ParsedDatabase, Row, SubEntry};
pub use parser::{parse, Parser};
pub use project::{
    project_code_description, project_description_only, project_detailed, CodeDescription,
    DetailedEntry,
};
pub use table::{load_rows, HeaderDetector, HeaderLabels};
