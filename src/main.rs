//! # Costbook CLI (`cbk`)
//!
//! Parses construction-cost spreadsheets into main entries and their
//! sub-entries, and prints the result in one of several views.
//!
//! ## Usage
//!
//! ```bash
//! cbk --config ./config/cbk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cbk parse <file>` | Print a view of the parsed entries (text or JSON) |
//! | `cbk list <file>` | Write the numbered materials list |
//! | `cbk show <file> <code>` | Print one main entry and its sub-entries |
//! | `cbk stats <file>` | Summarize counts, prices, and skipped rows |
//!
//! ## Examples
//!
//! ```bash
//! # Code and description of every main entry
//! cbk parse budget.xlsx
//!
//! # Whole database as JSON
//! cbk parse budget.xlsx --view full --format json --output out/db.json
//!
//! # Materials list for the matching layer
//! cbk list budget.xlsx --output materials_list.txt
//!
//! # Why did a row disappear?
//! CBK_LOG=debug cbk stats budget.xlsx --diagnostics
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use costbook::config::{self, Config};
use costbook::render::{Format, View};
use costbook::{export, logging, show, stats};

const DEFAULT_CONFIG: &str = "./config/cbk.toml";

/// Costbook CLI: rebuilds main/sub entry hierarchies from
/// construction-cost spreadsheets.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, the standard `Código` / `Tipo` layout is assumed.
#[derive(Parser)]
#[command(
    name = "cbk",
    about = "Costbook — parse construction-cost spreadsheets into main entries and sub-entries",
    version,
    long_about = "Costbook finds the header row of a cost-database worksheet, classifies each \
    row below it, and groups component rows under the priced line item they follow. The result \
    can be printed as codes, descriptions, a detailed table, or the full hierarchy."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/cbk.toml`. If the default file does not exist,
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Log debug events to stderr (overridden by `CBK_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Parse a spreadsheet and print one view of its main entries.
    Parse {
        /// Input workbook (`.xlsx`) or JSON table (`.json`).
        file: PathBuf,

        /// Which projection to print.
        #[arg(long, value_enum, default_value = "codes")]
        view: View,

        /// Output format. Defaults to `output.format` from the config.
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Write the numbered materials list (code and description per entry).
    List {
        /// Input workbook (`.xlsx`) or JSON table (`.json`).
        file: PathBuf,

        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the main entries with a given code and their sub-entries.
    ///
    /// Exits with an error when no main entry carries the code.
    Show {
        /// Input workbook (`.xlsx`) or JSON table (`.json`).
        file: PathBuf,

        /// Main entry code, e.g. `E02AM010`.
        code: String,
    },

    /// Summarize a parse: entry counts, price range, and skipped rows.
    Stats {
        /// Input workbook (`.xlsx`) or JSON table (`.json`).
        file: PathBuf,

        /// List every diagnostic with its row index.
        #[arg(long)]
        diagnostics: bool,
    },
}

/// Load the config at `path`, falling back to defaults only when the
/// default path was left in place and has no file behind it.
fn resolve_config(path: &Path) -> anyhow::Result<Config> {
    if path == Path::new(DEFAULT_CONFIG) && !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(Config::minimal());
    }
    config::load_config(path)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = resolve_config(&cli.config)?;

    match cli.command {
        Commands::Parse {
            file,
            view,
            format,
            output,
        } => {
            export::run_parse(&cfg, &file, view, format, output.as_deref())?;
        }
        Commands::List { file, output } => {
            export::run_list(&cfg, &file, output.as_deref())?;
        }
        Commands::Show { file, code } => {
            show::run_show(&cfg, &file, &code)?;
        }
        Commands::Stats { file, diagnostics } => {
            stats::run_stats(&cfg, &file, diagnostics)?;
        }
    }

    Ok(())
}
