//! Main entry lookup by code.
//!
//! Codes are not unique in a cost database, so every entry carrying the
//! code is printed, in sheet order.

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::Config;
use crate::ingest::parse_file;
use crate::render;

/// CLI entry point: parse `input` and print the entries with `code`.
pub fn run_show(config: &Config, input: &Path, code: &str) -> Result<()> {
    let extraction = parse_file(config, input)?;
    let matches: Vec<_> = extraction.database.find_by_code(code.trim()).collect();

    if matches.is_empty() {
        bail!("main entry not found: {}", code);
    }

    for (i, entry) in matches.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", render::entry_text(entry));
    }
    Ok(())
}
