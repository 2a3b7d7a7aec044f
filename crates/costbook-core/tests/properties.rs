//! Property tests: parsing any table that has a header never fails, is
//! deterministic, and accounts for every row exactly once.

use costbook_core::{parse, Cell, DiagnosticKind, Parser, RawTable};
use proptest::prelude::*;

fn cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Empty),
        any::<bool>().prop_map(Cell::Bool),
        any::<f64>().prop_map(Cell::Number),
        "[a-zA-Z0-9 ./,-]{0,8}".prop_map(Cell::Text),
        prop::sample::select(vec!["Partida", "Capítulo", "moc-1", "A1", "n/d", "12.5"])
            .prop_map(Cell::from),
    ]
}

fn table() -> impl Strategy<Value = RawTable> {
    let rows = prop::collection::vec(prop::collection::vec(cell(), 0..9), 0..40);
    let preamble = prop::collection::vec(prop::collection::vec(cell(), 0..3), 0..3);
    (preamble, rows).prop_map(|(mut pre, rows)| {
        pre.push(vec![Cell::from("Código"), Cell::from("Tipo")]);
        pre.extend(rows);
        RawTable::new(pre)
    })
}

/// Rows after the first header, counted the same way the loader does.
fn post_header_len(t: &RawTable) -> usize {
    let at = t
        .rows()
        .iter()
        .position(|r| {
            r.first() == Some(&Cell::from("Código")) && r.get(1) == Some(&Cell::from("Tipo"))
        })
        .unwrap();
    t.len() - at - 1
}

proptest! {
    #[test]
    fn parse_never_fails_with_header(t in table()) {
        prop_assert!(parse(&t).is_ok());
    }

    #[test]
    fn parse_is_idempotent(t in table()) {
        let a = parse(&t).unwrap();
        let b = parse(&t).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn entries_keep_source_order(t in table()) {
        let db = parse(&t).unwrap();
        let entries = db.entries();
        for pair in entries.windows(2) {
            prop_assert!(pair[0].row_index < pair[1].row_index);
        }
        for (i, entry) in entries.iter().enumerate() {
            let upper = entries.get(i + 1).map(|e| e.row_index).unwrap_or(usize::MAX);
            let mut last = entry.row_index;
            for sub in &entry.sub_entries {
                prop_assert!(sub.row_index > last && sub.row_index < upper);
                last = sub.row_index;
            }
            prop_assert!(!entry.code.is_empty());
            prop_assert!(!entry.unit_price.is_nan());
        }
    }

    #[test]
    fn every_row_is_accounted_for_once(t in table()) {
        let ex = Parser::new().parse_with_diagnostics(&t).unwrap();
        let noted = ex
            .diagnostics
            .iter()
            .filter(|d| d.kind != DiagnosticKind::PriceDefaulted)
            .count();
        let total = ex.database.len() + ex.database.sub_entry_count() + noted;
        prop_assert_eq!(total, post_header_len(&t));
    }
}
