//! Spreadsheet decoding: workbook bytes → [`RawTable`].
//!
//! Reads one worksheet of an `.xlsx` (OOXML) package with `zip` and
//! `quick-xml`, a legacy `.xls` (BIFF) workbook with `calamine`, or a JSON
//! array of arrays. Cells keep their sheet positions:
//! column letters from each cell reference place values in the right
//! column, and skipped row numbers become empty rows.
//!
//! Cell types follow the OOXML `t` attribute:
//!
//! | `t` | Result |
//! |-----|--------|
//! | `s` | shared string |
//! | `inlineStr`, `str`, `d` | text |
//! | `b` | boolean |
//! | `e` | empty (error values read as missing) |
//! | absent / `n` | number, or text when the value is not numeric |

use anyhow::{Context, Result};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls};
use costbook_core::{Cell, RawTable};
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";

/// Extensions accepted by [`load_table`].
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "json"];

/// Widest sheet a spreadsheet can hold (column `XFD`).
const MAX_COLUMNS: usize = 16_384;

/// Limits and sheet selection for decoding.
#[derive(Debug, Clone)]
pub struct WorkbookOptions {
    /// Zero-based worksheet index, in workbook order.
    pub sheet: usize,
    /// Maximum number of rows to decode, counting empty gap rows.
    pub max_rows: usize,
    /// Maximum decompressed size of a single package part (zip-bomb protection).
    pub max_entry_bytes: u64,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            sheet: 0,
            max_rows: 200_000,
            max_entry_bytes: 50 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("invalid workbook archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("malformed workbook XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed workbook XML attribute: {0}")]
    Attr(#[from] AttrError),
    #[error("invalid legacy workbook: {0}")]
    Xls(#[from] calamine::XlsError),
    #[error("failed to read workbook: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("workbook has no worksheets")]
    NoSheets,
    #[error("sheet index {index} out of range (workbook has {available} sheets)")]
    SheetOutOfRange { index: usize, available: usize },
    #[error("package part {part} exceeds size limit ({limit} bytes)")]
    TooLarge { part: String, limit: u64 },
    #[error("sheet exceeds row limit ({0} rows)")]
    TooManyRows(usize),
    #[error("cell reference {0} is past the last column (XFD)")]
    ColumnOutOfRange(String),
    #[error("unsupported file type '{0}' (expected one of: xlsx, xls, json)")]
    UnsupportedFormat(String),
}

type Archive<'a> = zip::ZipArchive<Cursor<&'a [u8]>>;

/// Read a workbook or JSON table from disk, dispatching on the extension.
pub fn load_table(path: &Path, options: &WorkbookOptions) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(WorkbookError::UnsupportedFormat(ext))
            .with_context(|| format!("Cannot load {}", path.display()));
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let table = match ext.as_str() {
        "json" => read_json_table(&bytes),
        "xls" => read_xls(&bytes, options),
        _ => read_xlsx(&bytes, options),
    }
    .with_context(|| format!("Failed to decode {}", path.display()))?;

    tracing::info!(rows = table.len(), path = %path.display(), "decoded sheet");
    Ok(table)
}

/// Parse a JSON array of arrays into a table.
pub fn read_json_table(bytes: &[u8]) -> Result<RawTable, WorkbookError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode one worksheet of an `.xlsx` package.
pub fn read_xlsx(bytes: &[u8], options: &WorkbookOptions) -> Result<RawTable, WorkbookError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let shared_strings = read_shared_strings(&mut archive, options.max_entry_bytes)?;
    let sheets = list_worksheets(&mut archive, options.max_entry_bytes)?;

    if sheets.is_empty() {
        return Err(WorkbookError::NoSheets);
    }
    let name = sheets
        .get(options.sheet)
        .ok_or(WorkbookError::SheetOutOfRange {
            index: options.sheet,
            available: sheets.len(),
        })?;

    tracing::debug!(sheet = %name, "reading worksheet");
    let xml = read_part(&mut archive, name, options.max_entry_bytes)?;
    read_sheet(&xml, &shared_strings, options.max_rows)
}

/// Decode one worksheet of a legacy `.xls` workbook.
///
/// The whole file is one compound document, so `max_entry_bytes` applies to
/// the file itself.
pub fn read_xls(bytes: &[u8], options: &WorkbookOptions) -> Result<RawTable, WorkbookError> {
    if bytes.len() as u64 > options.max_entry_bytes {
        return Err(WorkbookError::TooLarge {
            part: "workbook".to_string(),
            limit: options.max_entry_bytes,
        });
    }

    let mut workbook: Xls<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let sheets = workbook.sheet_names();
    if sheets.is_empty() {
        return Err(WorkbookError::NoSheets);
    }
    let name = sheets
        .get(options.sheet)
        .cloned()
        .ok_or(WorkbookError::SheetOutOfRange {
            index: options.sheet,
            available: sheets.len(),
        })?;

    tracing::debug!(sheet = %name, "reading worksheet");
    let range = workbook.worksheet_range(&name)?;
    range_to_table(&range, options.max_rows)
}

/// Lay a decoded range out at its sheet position. The range starts at its
/// first used cell, so leading rows and columns are padded back in.
fn range_to_table(range: &Range<Data>, max_rows: usize) -> Result<RawTable, WorkbookError> {
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut sink = RowSink {
        table: RawTable::default(),
        max_rows,
    };
    for (i, row) in range.rows().enumerate() {
        let mut cells = vec![Cell::Empty; first_col as usize];
        cells.extend(row.iter().map(data_to_cell));
        sink.push(Some(first_row as usize + i + 1), cells)?;
    }
    Ok(sink.table)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

fn read_part(archive: &mut Archive<'_>, name: &str, max_bytes: u64) -> Result<Vec<u8>, WorkbookError> {
    let entry = archive.by_name(name)?;
    let mut out = Vec::new();
    entry.take(max_bytes.saturating_add(1)).read_to_end(&mut out)?;
    if out.len() as u64 > max_bytes {
        return Err(WorkbookError::TooLarge {
            part: name.to_string(),
            limit: max_bytes,
        });
    }
    Ok(out)
}

/// Like [`read_part`], but a missing part is `None`.
fn read_optional_part(
    archive: &mut Archive<'_>,
    name: &str,
    max_bytes: u64,
) -> Result<Option<Vec<u8>>, WorkbookError> {
    match read_part(archive, name, max_bytes) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(WorkbookError::Archive(zip::result::ZipError::FileNotFound)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, WorkbookError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Shared strings, one per `<si>`, with rich-text runs concatenated and
/// phonetic runs (`<rPh>`) left out.
fn read_shared_strings(archive: &mut Archive<'_>, max_bytes: u64) -> Result<Vec<String>, WorkbookError> {
    let xml = match read_optional_part(archive, SHARED_STRINGS, max_bytes)? {
        Some(xml) => xml,
        None => return Ok(Vec::new()),
    };

    let mut strings = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    let mut in_phonetic = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => in_phonetic = true,
                b"t" => in_t = !in_phonetic,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(te) if in_t => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&te.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(current.take().unwrap_or_default()),
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Worksheet part names in workbook order.
///
/// Uses `xl/workbook.xml` and its relationships when present; otherwise
/// falls back to `xl/worksheets/sheetN.xml` sorted by `N`.
fn list_worksheets(archive: &mut Archive<'_>, max_bytes: u64) -> Result<Vec<String>, WorkbookError> {
    if let Some(names) = worksheets_from_workbook(archive, max_bytes)? {
        return Ok(names);
    }

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    names.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    Ok(names)
}

fn worksheets_from_workbook(
    archive: &mut Archive<'_>,
    max_bytes: u64,
) -> Result<Option<Vec<String>>, WorkbookError> {
    let (workbook, rels) = match (
        read_optional_part(archive, WORKBOOK, max_bytes)?,
        read_optional_part(archive, WORKBOOK_RELS, max_bytes)?,
    ) {
        (Some(w), Some(r)) => (w, r),
        _ => return Ok(None),
    };

    let mut targets = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(rels.as_slice());
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(&e, b"Id")?, attr_value(&e, b"Target")?) {
                    targets.push((id, target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    buf.clear();
    let mut names = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(workbook.as_slice());
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let Some(rel_id) = attr_value(&e, b"id")? {
                    if let Some((_, target)) = targets.iter().find(|(id, _)| *id == rel_id) {
                        names.push(resolve_target(target));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if names.is_empty() {
        return Ok(None);
    }
    Ok(Some(names))
}

/// Relationship targets are relative to `xl/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Zero-based column index from a cell reference such as `AB12`, or
/// `None` when the reference has no column letters.
fn column_index(reference: &str) -> Result<Option<usize>, WorkbookError> {
    let mut number: Option<usize> = None;
    for b in reference.bytes().take_while(u8::is_ascii_alphabetic) {
        let digit = usize::from(b.to_ascii_uppercase() - b'A' + 1);
        let next = number
            .unwrap_or(0)
            .checked_mul(26)
            .and_then(|n| n.checked_add(digit))
            .filter(|n| *n <= MAX_COLUMNS)
            .ok_or_else(|| WorkbookError::ColumnOutOfRange(reference.to_string()))?;
        number = Some(next);
    }
    Ok(number.map(|n| n - 1))
}

/// In-progress cell while streaming a `<c>` element.
#[derive(Default)]
struct PendingCell {
    column: usize,
    kind: Option<String>,
    value: String,
}

impl PendingCell {
    fn into_cell(self, shared_strings: &[String]) -> Cell {
        let value = self.value;
        match self.kind.as_deref() {
            Some("s") => value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| shared_strings.get(i))
                .map(|s| Cell::Text(s.clone()))
                .unwrap_or(Cell::Empty),
            Some("b") => match value.trim() {
                "1" => Cell::Bool(true),
                "0" => Cell::Bool(false),
                _ => Cell::Empty,
            },
            Some("e") => Cell::Empty,
            Some("inlineStr") | Some("str") | Some("d") => {
                if value.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(value)
                }
            }
            _ => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    Cell::Empty
                } else {
                    trimmed
                        .parse::<f64>()
                        .map(Cell::Number)
                        .unwrap_or_else(|_| Cell::Text(value))
                }
            }
        }
    }
}

/// Accumulates rows while keeping sheet row numbers aligned.
struct RowSink {
    table: RawTable,
    max_rows: usize,
}

impl RowSink {
    /// Push `cells` as sheet row `number` (1-based), filling any gap.
    fn push(&mut self, number: Option<usize>, cells: Vec<Cell>) -> Result<(), WorkbookError> {
        if let Some(number) = number {
            if number > self.max_rows {
                return Err(WorkbookError::TooManyRows(self.max_rows));
            }
            while self.table.len() + 1 < number {
                self.table.push_row(Vec::new());
            }
        }
        if self.table.len() >= self.max_rows {
            return Err(WorkbookError::TooManyRows(self.max_rows));
        }
        self.table.push_row(cells);
        Ok(())
    }
}

fn read_sheet(xml: &[u8], shared_strings: &[String], max_rows: usize) -> Result<RawTable, WorkbookError> {
    let mut sink = RowSink {
        table: RawTable::default(),
        max_rows,
    };
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut row_number: Option<usize> = None;
    let mut cells: Vec<Cell> = Vec::new();
    let mut pending: Option<PendingCell> = None;
    let mut in_value = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row_number = attr_value(&e, b"r")?.and_then(|r| r.parse().ok());
                    cells.clear();
                }
                b"c" => pending = Some(start_cell(&e, cells.len())?),
                b"v" => in_value = true,
                b"rPh" => in_phonetic = true,
                b"t" => in_value = !in_phonetic && pending.is_some(),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                let number = attr_value(&e, b"r")?.and_then(|r| r.parse().ok());
                sink.push(number, Vec::new())?;
            }
            Event::Text(te) if in_value => {
                if let Some(p) = pending.as_mut() {
                    p.value.push_str(&te.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let Some(p) = pending.take() {
                        let column = p.column;
                        let cell = p.into_cell(shared_strings);
                        if cells.len() <= column {
                            cells.resize(column + 1, Cell::Empty);
                        }
                        cells[column] = cell;
                    }
                }
                b"row" => sink.push(row_number.take(), std::mem::take(&mut cells))?,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sink.table)
}

fn start_cell(e: &BytesStart<'_>, next_column: usize) -> Result<PendingCell, WorkbookError> {
    let column = match attr_value(e, b"r")? {
        Some(reference) => column_index(&reference)?.unwrap_or(next_column),
        None => next_column,
    };
    if column >= MAX_COLUMNS {
        return Err(WorkbookError::ColumnOutOfRange(format!("#{}", column + 1)));
    }
    Ok(PendingCell {
        column,
        kind: attr_value(e, b"t")?,
        value: String::new(),
    })
}
