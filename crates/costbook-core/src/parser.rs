//! Parser entry points.
//!
//! [`Parser`] bundles a header detector with the classification rules and
//! runs the whole pipeline: load rows, then extract. It holds no state
//! between calls, so one instance can serve many tables, from many threads
//! when its detector allows it.

use crate::cell::RawTable;
use crate::classify::RowRules;
use crate::error::ParseError;
use crate::extract::{extract, Extraction};
use crate::models::ParsedDatabase;
use crate::table::{load_rows, HeaderDetector, HeaderLabels};

#[derive(Debug, Clone, Default)]
pub struct Parser<H = HeaderLabels> {
    header: H,
    rules: RowRules,
}

impl Parser<HeaderLabels> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: HeaderDetector> Parser<H> {
    /// Replace the header detector.
    pub fn with_header<D: HeaderDetector>(self, header: D) -> Parser<D> {
        Parser {
            header,
            rules: self.rules,
        }
    }

    pub fn with_rules(mut self, rules: RowRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &RowRules {
        &self.rules
    }

    /// Parse a table into a [`ParsedDatabase`].
    pub fn parse(&self, table: &RawTable) -> Result<ParsedDatabase, ParseError> {
        self.parse_with_diagnostics(table).map(|ex| ex.database)
    }

    /// Parse a table, keeping the per-row diagnostics.
    pub fn parse_with_diagnostics(&self, table: &RawTable) -> Result<Extraction, ParseError> {
        let rows = load_rows(table, &self.header)?;
        Ok(extract(&rows, &self.rules))
    }
}

/// Parse a table with the default header labels and rules.
pub fn parse(table: &RawTable) -> Result<ParsedDatabase, ParseError> {
    Parser::new().parse(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn table(rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable::new(rows)
    }

    #[test]
    fn test_header_not_found_returns_nothing() {
        let t = table(vec![vec![Cell::from("A1"), Cell::from("Partida")]]);
        assert!(matches!(parse(&t), Err(ParseError::HeaderNotFound { .. })));
    }

    #[test]
    fn test_custom_header_and_rules() {
        let t = table(vec![
            vec![Cell::from("Code"), Cell::from("Type")],
            vec![
                Cell::from("X1"),
                Cell::from("Item"),
                Cell::from("u"),
                Cell::from("Thing"),
                Cell::Number(1.0),
                Cell::Number(4.0),
            ],
            vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::from("part")],
        ]);
        let parser = Parser::new()
            .with_header(crate::table::HeaderLabels::new("Code", "Type"))
            .with_rules(RowRules::new("Item", "Chapter", ["lab-"]));
        let db = parser.parse(&t).unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db.entries()[0].unit_price, 4.0);
        assert_eq!(db.entries()[0].sub_entries.len(), 1);
    }

    #[test]
    fn test_parser_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();
    }
}
