//! # Costbook
//!
//! Command-line front end for [`costbook_core`]: decodes construction-cost
//! workbooks, rebuilds their main/sub entry hierarchy, and renders the
//! result for people or for the downstream matching layer.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────────┐   ┌──────────────┐   ┌──────────┐
//! │  workbook  │──▶│ costbook-core │──▶│    render    │──▶│  stdout  │
//! │ .xlsx/json │   │ header+entries│   │ views / list │   │  / file  │
//! └────────────┘   └───────────────┘   └──────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cbk parse budget.xlsx --view detailed
//! cbk parse budget.xlsx --view full --format json --output out/db.json
//! cbk list budget.xlsx --output materials_list.txt
//! cbk show budget.xlsx E02AM010
//! cbk stats budget.xlsx --diagnostics
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`workbook`] | `.xlsx` and JSON table decoding |
//! | [`ingest`] | Decode-then-parse pipeline |
//! | [`render`] | Text and JSON views |
//! | [`export`] | `parse` and `list` commands |
//! | [`show`] | `show` command |
//! | [`stats`] | `stats` command |
//! | [`logging`] | stderr tracing subscriber |

pub mod config;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod render;
pub mod show;
pub mod stats;
pub mod workbook;

pub use costbook_core as core;
