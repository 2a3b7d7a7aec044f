//! Write parsed views to stdout or a file.
//!
//! Backs `cbk parse` (any view, text or JSON) and `cbk list` (the materials
//! list consumed by the matching layer).

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;
use crate::ingest::parse_file;
use crate::render::{self, Format, View};

/// Parse `input` and write the requested view.
///
/// `format` overrides `output.format` from the config when given.
pub fn run_parse(
    config: &Config,
    input: &Path,
    view: View,
    format: Option<Format>,
    output: Option<&Path>,
) -> Result<()> {
    let format = match format {
        Some(f) => f,
        None => Format::from_config(&config.output.format).unwrap_or(Format::Text),
    };

    let extraction = parse_file(config, input)?;
    let content = render::render(&extraction.database, view, format)?;
    write_output(output, &content, extraction.database.len())
}

/// Parse `input` and write the materials list.
pub fn run_list(config: &Config, input: &Path, output: Option<&Path>) -> Result<()> {
    let extraction = parse_file(config, input)?;
    let content = render::materials_list(&extraction.database);
    write_output(output, &content, extraction.database.len())
}

/// Write `content` to `output`, or to stdout when no path is given.
fn write_output(output: Option<&Path>, content: &str, count: usize) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} main entries to {} ({:.2} KB)",
                count,
                path.display(),
                content.len() as f64 / 1024.0
            );
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
