//! Text and JSON renderings of parsed databases.
//!
//! Text output is meant for people and for the matching layer's materials
//! list; JSON output wraps each view as `{ "count": N, "data": [...] }`.
//! The `full` view serializes the whole database, sub-entries included.

use anyhow::Result;
use costbook_core::{
    project_code_description, project_description_only, project_detailed, MainEntry,
    ParsedDatabase, SubEntry,
};
use serde::Serialize;
use std::fmt::Write;

/// Width of the rule under view headers.
const VIEW_RULE: usize = 80;
/// Width of the rule under the materials list header.
const LIST_RULE: usize = 100;

/// Which projection to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    /// Code and description per main entry.
    Codes,
    /// Description per main entry.
    Descriptions,
    /// Code, kind, unit, description, price, and sub-entry count.
    Detailed,
    /// Every main entry with its sub-entries.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    /// Parse the `output.format` config value.
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Format::Text),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    count: usize,
    data: T,
}

pub fn render(db: &ParsedDatabase, view: View, format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(match view {
            View::Codes => codes_text(db),
            View::Descriptions => descriptions_text(db),
            View::Detailed => detailed_text(db),
            View::Full => full_text(db),
        }),
        Format::Json => json(db, view),
    }
}

fn json(db: &ParsedDatabase, view: View) -> Result<String> {
    let count = db.len();
    let out = match view {
        View::Codes => serde_json::to_string_pretty(&Envelope {
            count,
            data: project_code_description(db),
        })?,
        View::Descriptions => serde_json::to_string_pretty(&Envelope {
            count,
            data: project_description_only(db),
        })?,
        View::Detailed => serde_json::to_string_pretty(&Envelope {
            count,
            data: project_detailed(db),
        })?,
        View::Full => serde_json::to_string_pretty(db)?,
    };
    Ok(out)
}

fn header(out: &mut String, count: usize) {
    let _ = writeln!(out, "Total materials: {}", count);
    let _ = writeln!(out, "{}", "=".repeat(VIEW_RULE));
    out.push('\n');
}

pub fn codes_text(db: &ParsedDatabase) -> String {
    let mut out = String::new();
    header(&mut out, db.len());
    for (i, item) in project_code_description(db).iter().enumerate() {
        let _ = writeln!(out, "{}. Code: {}", i + 1, item.code);
        let _ = writeln!(out, "   Description: {}", item.description);
        out.push('\n');
    }
    out
}

pub fn descriptions_text(db: &ParsedDatabase) -> String {
    let mut out = String::new();
    header(&mut out, db.len());
    for (i, description) in project_description_only(db).iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, description);
        out.push('\n');
    }
    out
}

pub fn detailed_text(db: &ParsedDatabase) -> String {
    let mut out = String::new();
    header(&mut out, db.len());
    for (i, item) in project_detailed(db).iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, item.code);
        let _ = writeln!(out, "   Description: {}", item.description);
        let _ = writeln!(
            out,
            "   Price: {} € / {}",
            format_price(item.unit_price),
            item.unit.unwrap_or("-")
        );
        let _ = writeln!(out, "   Sub-entries: {}", item.sub_entry_count);
        out.push('\n');
    }
    out
}

fn full_text(db: &ParsedDatabase) -> String {
    let mut out = String::new();
    header(&mut out, db.len());
    for entry in db {
        out.push_str(&entry_text(entry));
        out.push('\n');
    }
    out
}

/// The list file handed to the matching layer: numbered codes with their
/// descriptions underneath.
pub fn materials_list(db: &ParsedDatabase) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total Materials: {}", db.len());
    let _ = writeln!(out, "{}", "=".repeat(LIST_RULE));
    out.push('\n');
    for (i, item) in project_code_description(db).iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, item.code);
        let _ = writeln!(out, "   {}", item.description);
        out.push('\n');
    }
    out
}

/// One main entry followed by its sub-entries.
pub fn entry_text(entry: &MainEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Code:        {}", entry.code);
    let _ = writeln!(out, "Kind:        {}", entry.kind);
    let _ = writeln!(out, "Unit:        {}", entry.unit.as_deref().unwrap_or("-"));
    let _ = writeln!(out, "Description: {}", entry.description);
    let _ = writeln!(out, "Price:       {} €", format_price(entry.unit_price));
    let _ = writeln!(out, "Row:         {}", entry.row_index);
    let _ = writeln!(out, "Sub-entries ({}):", entry.sub_entries.len());
    for sub in &entry.sub_entries {
        let _ = writeln!(out, "  - {}", sub_entry_line(sub));
    }
    out
}

fn sub_entry_line(sub: &SubEntry) -> String {
    let mut line = format!(
        "{}: {}",
        sub.code.as_deref().unwrap_or("N/A"),
        sub.description
    );
    if let Some(q) = sub.quantity {
        let _ = write!(line, "  qty {}", q);
        if let Some(unit) = sub.unit.as_deref() {
            let _ = write!(line, " {}", unit);
        }
    }
    if let Some(p) = sub.unit_price {
        let _ = write!(line, "  @ {} €", format_price(p));
    }
    if let Some(a) = sub.amount {
        let _ = write!(line, "  = {} €", format_price(a));
    }
    line
}

fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use costbook_core::{parse, Cell, RawTable};

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    fn db() -> ParsedDatabase {
        let table = RawTable::new(vec![
            row(&["Código", "Tipo"]),
            row(&["A1", "Partida", "m2", "Demolición", "2", "10", "20"]),
            row(&["moc-x", "Partida", "h", "Peón", "1", "5", "5"]),
            row(&["A2", "Partida", "", "Pintura", "1", "7.5", "7.5"]),
        ]);
        parse(&table).unwrap()
    }

    #[test]
    fn test_codes_text() {
        let out = codes_text(&db());
        assert!(out.starts_with("Total materials: 2\n"));
        assert!(out.contains("1. Code: A1\n   Description: Demolición\n"));
        assert!(out.contains("2. Code: A2\n   Description: Pintura\n"));
    }

    #[test]
    fn test_descriptions_text() {
        let out = descriptions_text(&db());
        assert!(out.contains("1. Demolición\n"));
        assert!(!out.contains("A1"));
    }

    #[test]
    fn test_detailed_text() {
        let out = detailed_text(&db());
        assert!(out.contains("Price: 10.00 € / m2"));
        assert!(out.contains("Price: 7.50 € / -"));
        assert!(out.contains("Sub-entries: 1"));
    }

    #[test]
    fn test_materials_list_layout() {
        let out = materials_list(&db());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Total Materials: 2");
        assert_eq!(lines[1].len(), LIST_RULE);
        assert_eq!(lines[3], "1. A1");
        assert_eq!(lines[4], "   Demolición");
    }

    #[test]
    fn test_entry_text_lists_sub_entries() {
        let db = db();
        let out = entry_text(&db.entries()[0]);
        assert!(out.contains("Sub-entries (1):"));
        assert!(out.contains("  - moc-x: Peón  qty 1 h  @ 5.00 €  = 5.00 €"));
    }

    #[test]
    fn test_json_envelope() {
        let out = render(&db(), View::Codes, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["data"][1]["code"], "A2");

        let out = render(&db(), View::Descriptions, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["data"][0], "Demolición");
    }

    #[test]
    fn test_json_full_includes_sub_entries() {
        let out = render(&db(), View::Full, Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["sub_entries"][0]["code"], "moc-x");
        assert_eq!(value[0]["sub_entries"][0]["amount"], 5.0);
    }

    #[test]
    fn test_format_from_config() {
        assert_eq!(Format::from_config("json"), Some(Format::Json));
        assert_eq!(Format::from_config("yaml"), None);
    }
}
