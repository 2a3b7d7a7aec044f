//! Parse pipeline orchestration.
//!
//! Coordinates the full flow for one file: decode the sheet, locate the
//! header, extract main and sub entries. Every command goes through
//! [`parse_file`].

use anyhow::{Context, Result};
use costbook_core::Extraction;
use std::path::Path;

use crate::config::Config;
use crate::workbook;

/// Decode `path` and parse it with the configured layout and rules.
pub fn parse_file(config: &Config, path: &Path) -> Result<Extraction> {
    let table = workbook::load_table(path, &config.workbook_options())?;

    let extraction = config
        .parser()
        .parse_with_diagnostics(&table)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!(
        main_entries = extraction.database.len(),
        sub_entries = extraction.database.sub_entry_count(),
        diagnostics = extraction.diagnostics.len(),
        "Total main entries extracted: {}",
        extraction.database.len()
    );
    Ok(extraction)
}
