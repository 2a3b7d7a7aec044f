//! TOML configuration.
//!
//! Every section is optional; a missing key takes the default that matches
//! the standard cost-database layout (`Código` / `Tipo` header, `Partida`
//! items, `Capítulo` chapters).

use anyhow::{Context, Result};
use costbook_core::classify::{
    DEFAULT_CHAPTER_TAG, DEFAULT_EXCLUDED_PREFIXES, DEFAULT_ITEM_TAG,
};
use costbook_core::table::{DEFAULT_CODE_LABEL, DEFAULT_KIND_LABEL};
use costbook_core::{HeaderLabels, Parser, RowRules};
use serde::Deserialize;
use std::path::Path;

use crate::workbook::WorkbookOptions;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub workbook: WorkbookConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutConfig {
    #[serde(default = "default_code_label")]
    pub code_label: String,
    #[serde(default = "default_kind_label")]
    pub kind_label: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            code_label: default_code_label(),
            kind_label: default_kind_label(),
        }
    }
}

fn default_code_label() -> String {
    DEFAULT_CODE_LABEL.to_string()
}
fn default_kind_label() -> String {
    DEFAULT_KIND_LABEL.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    #[serde(default = "default_item_tag")]
    pub item_tag: String,
    #[serde(default = "default_chapter_tag")]
    pub chapter_tag: String,
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            item_tag: default_item_tag(),
            chapter_tag: default_chapter_tag(),
            excluded_prefixes: default_excluded_prefixes(),
        }
    }
}

fn default_item_tag() -> String {
    DEFAULT_ITEM_TAG.to_string()
}
fn default_chapter_tag() -> String {
    DEFAULT_CHAPTER_TAG.to_string()
}
fn default_excluded_prefixes() -> Vec<String> {
    DEFAULT_EXCLUDED_PREFIXES
        .iter()
        .map(|p| p.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkbookConfig {
    /// Zero-based worksheet index.
    #[serde(default)]
    pub sheet: usize,
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: u64,
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        Self {
            sheet: 0,
            max_rows: default_max_rows(),
            max_entry_bytes: default_max_entry_bytes(),
        }
    }
}

fn default_max_rows() -> usize {
    200_000
}
fn default_max_entry_bytes() -> u64 {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}

impl Config {
    /// All defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// A parser configured with this file's header labels and rules.
    pub fn parser(&self) -> Parser {
        Parser::new()
            .with_header(HeaderLabels::new(
                self.layout.code_label.clone(),
                self.layout.kind_label.clone(),
            ))
            .with_rules(RowRules::new(
                self.rules.item_tag.clone(),
                self.rules.chapter_tag.clone(),
                &self.rules.excluded_prefixes,
            ))
    }

    pub fn workbook_options(&self) -> WorkbookOptions {
        WorkbookOptions {
            sheet: self.workbook.sheet,
            max_rows: self.workbook.max_rows,
            max_entry_bytes: self.workbook.max_entry_bytes,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate layout
    if config.layout.code_label.is_empty() || config.layout.kind_label.is_empty() {
        anyhow::bail!("layout.code_label and layout.kind_label must not be empty");
    }

    // Validate rules
    let item = config.rules.item_tag.trim();
    let chapter = config.rules.chapter_tag.trim();
    if item.is_empty() || chapter.is_empty() {
        anyhow::bail!("rules.item_tag and rules.chapter_tag must not be empty");
    }
    if item == chapter {
        anyhow::bail!("rules.item_tag and rules.chapter_tag must differ (both '{}')", item);
    }
    if let Some(p) = config
        .rules
        .excluded_prefixes
        .iter()
        .find(|p| p.trim().is_empty())
    {
        anyhow::bail!("rules.excluded_prefixes contains a blank prefix: {:?}", p);
    }

    // Validate workbook
    if config.workbook.max_rows == 0 {
        anyhow::bail!("workbook.max_rows must be > 0");
    }
    if config.workbook.max_entry_bytes == 0 {
        anyhow::bail!("workbook.max_entry_bytes must be > 0");
    }

    match config.output.format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Unknown output format: '{}'. Must be text or json.", other),
    }

    Ok(())
}
