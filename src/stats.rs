//! Parse statistics and row diagnostics.
//!
//! Gives a quick summary of what a sheet produced: entry counts, price
//! range, and how many rows were dropped, skipped, or defaulted. Used by
//! `cbk stats` to check a new spreadsheet before handing it downstream.

use anyhow::Result;
use costbook_core::{DiagnosticKind, Extraction};
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

use crate::config::Config;
use crate::ingest::parse_file;

/// Aggregate figures for one extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub main_entries: usize,
    pub sub_entries: usize,
    pub entries_without_sub_entries: usize,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub total_price: f64,
    pub orphans_dropped: usize,
    pub empty_skipped: usize,
    pub chapters: usize,
    pub prices_defaulted: usize,
}

pub fn summarize(extraction: &Extraction) -> Summary {
    let db = &extraction.database;
    let prices = db.iter().map(|e| e.unit_price);
    let count = |kind: DiagnosticKind| {
        extraction
            .diagnostics
            .iter()
            .filter(|d| d.kind == kind)
            .count()
    };

    Summary {
        main_entries: db.len(),
        sub_entries: db.sub_entry_count(),
        entries_without_sub_entries: db.iter().filter(|e| e.sub_entries.is_empty()).count(),
        min_price: prices.clone().reduce(f64::min),
        max_price: prices.clone().reduce(f64::max),
        total_price: prices.sum(),
        orphans_dropped: count(DiagnosticKind::OrphanDropped),
        empty_skipped: count(DiagnosticKind::EmptySkipped),
        chapters: count(DiagnosticKind::ChapterBoundary),
        prices_defaulted: count(DiagnosticKind::PriceDefaulted),
    }
}

/// Run the stats command: parse `input` and print a summary.
pub fn run_stats(config: &Config, input: &Path, with_diagnostics: bool) -> Result<()> {
    let extraction = parse_file(config, input)?;
    let summary = summarize(&extraction);
    let source = input.display().to_string();
    print!("{}", format_summary(&source, &summary, &extraction, with_diagnostics));
    Ok(())
}

/// Human-readable summary, optionally followed by every diagnostic.
pub fn format_summary(
    source: &str,
    summary: &Summary,
    extraction: &Extraction,
    with_diagnostics: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Costbook — Parse Stats");
    let _ = writeln!(out, "======================");
    out.push('\n');
    let _ = writeln!(out, "  File:               {}", source);
    out.push('\n');
    let _ = writeln!(out, "  Main entries:       {}", summary.main_entries);
    let _ = writeln!(out, "  Sub-entries:        {}", summary.sub_entries);
    let _ = writeln!(
        out,
        "  Without components: {}",
        summary.entries_without_sub_entries
    );
    match (summary.min_price, summary.max_price) {
        (Some(min), Some(max)) => {
            let _ = writeln!(out, "  Price range:        {:.2} – {:.2} €", min, max);
        }
        _ => {
            let _ = writeln!(out, "  Price range:        -");
        }
    }
    let _ = writeln!(out, "  Price total:        {:.2} €", summary.total_price);
    out.push('\n');
    let _ = writeln!(out, "  Chapters:           {}", summary.chapters);
    let _ = writeln!(out, "  Orphans dropped:    {}", summary.orphans_dropped);
    let _ = writeln!(out, "  Empty rows skipped: {}", summary.empty_skipped);
    let _ = writeln!(out, "  Prices defaulted:   {}", summary.prices_defaulted);

    if with_diagnostics && !extraction.diagnostics.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "  {:<8} KIND", "ROW");
        for d in &extraction.diagnostics {
            let _ = writeln!(out, "  {:<8} {}", d.row_index, d.kind.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use costbook_core::{Cell, Parser, RawTable};

    fn extraction() -> Extraction {
        let table = RawTable::new(vec![
            vec![Cell::from("Código"), Cell::from("Tipo")],
            vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::from("preamble")],
            vec![
                Cell::from("A1"),
                Cell::from("Partida"),
                Cell::from("m2"),
                Cell::from("Demolición"),
                Cell::Empty,
                Cell::Number(10.0),
            ],
            vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::from("nota")],
            vec![],
            vec![Cell::from("01"), Cell::from("Capítulo")],
            vec![
                Cell::from("A2"),
                Cell::from("Partida"),
                Cell::Empty,
                Cell::from("Pintura"),
                Cell::Empty,
                Cell::from("n/d"),
            ],
        ]);
        Parser::new().parse_with_diagnostics(&table).unwrap()
    }

    #[test]
    fn test_summarize() {
        let ex = extraction();
        let s = summarize(&ex);
        assert_eq!(s.main_entries, 2);
        assert_eq!(s.sub_entries, 1);
        assert_eq!(s.entries_without_sub_entries, 1);
        assert_eq!(s.min_price, Some(0.0));
        assert_eq!(s.max_price, Some(10.0));
        assert_eq!(s.total_price, 10.0);
        assert_eq!(s.orphans_dropped, 1);
        assert_eq!(s.empty_skipped, 1);
        assert_eq!(s.chapters, 1);
        assert_eq!(s.prices_defaulted, 1);
    }

    #[test]
    fn test_summarize_empty() {
        let s = summarize(&Extraction::default());
        assert_eq!(s.main_entries, 0);
        assert_eq!(s.min_price, None);
        assert_eq!(s.total_price, 0.0);
    }

    #[test]
    fn test_format_with_diagnostics() {
        let ex = extraction();
        let out = format_summary("budget.xlsx", &summarize(&ex), &ex, true);
        assert!(out.contains("File:               budget.xlsx"));
        assert!(out.contains("Main entries:       2"));
        assert!(out.contains("orphan_dropped"));
        assert!(out.contains("price_defaulted"));

        let out = format_summary("budget.xlsx", &summarize(&ex), &ex, false);
        assert!(!out.contains("orphan_dropped"));
    }
}
