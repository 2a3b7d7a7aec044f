//! Row classification.
//!
//! A row opens a new main entry when all of these hold:
//!
//! 1. the code is present and non-empty after trimming;
//! 2. the kind is exactly the priced-item tag (`Partida`, no trimming);
//! 3. the unit-price cell is not null (any text counts, even blank or
//!    unparsable);
//! 4. the trimmed, lower-cased code starts with none of the excluded
//!    prefixes reserved for recurring labor and rental components.
//!
//! Classification looks at one row only. Ordering context belongs to the
//! extractor.

use crate::models::Row;

/// Default tag of a priced line item.
pub const DEFAULT_ITEM_TAG: &str = "Partida";
/// Default tag of a chapter/section boundary.
pub const DEFAULT_CHAPTER_TAG: &str = "Capítulo";
/// Default code prefixes of recurring labor and rental components.
pub const DEFAULT_EXCLUDED_PREFIXES: [&str; 4] = ["moc-", "mo-salarial", "alq-", "m.o."];

/// Tags and prefixes that drive classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRules {
    pub item_tag: String,
    pub chapter_tag: String,
    /// Stored lower-cased.
    excluded_prefixes: Vec<String>,
}

impl RowRules {
    pub fn new<I, S>(item_tag: impl Into<String>, chapter_tag: impl Into<String>, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            item_tag: item_tag.into(),
            chapter_tag: chapter_tag.into(),
            excluded_prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn excluded_prefixes(&self) -> &[String] {
        &self.excluded_prefixes
    }

    /// Whether `row` starts a new main entry.
    pub fn is_main_entry(&self, row: &Row) -> bool {
        let code = match row.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code,
            _ => return false,
        };

        if !self.kind_is(row, &self.item_tag) {
            return false;
        }

        if row.unit_price.is_null() {
            return false;
        }

        !self.is_excluded_code(code)
    }

    /// Whether `row` is a chapter/section boundary.
    pub fn is_chapter(&self, row: &Row) -> bool {
        self.kind_is(row, &self.chapter_tag)
    }

    /// Whether `code` is reserved for sub-entries regardless of its shape.
    pub fn is_excluded_code(&self, code: &str) -> bool {
        let normalized = code.trim().to_lowercase();
        self.excluded_prefixes
            .iter()
            .any(|prefix| normalized.starts_with(prefix.as_str()))
    }

    fn kind_is(&self, row: &Row, tag: &str) -> bool {
        row.kind.as_deref() == Some(tag)
    }
}

impl Default for RowRules {
    fn default() -> Self {
        Self::new(DEFAULT_ITEM_TAG, DEFAULT_CHAPTER_TAG, DEFAULT_EXCLUDED_PREFIXES)
    }
}

/// [`RowRules::is_main_entry`] with the default tags and prefixes.
pub fn is_main_entry(row: &Row) -> bool {
    RowRules::default().is_main_entry(row)
}
