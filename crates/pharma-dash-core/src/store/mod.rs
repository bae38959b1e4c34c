//! Record store: loads the inventory table once and hands out read-only views.

mod columns;

pub use columns::{LISTED_MARGIN_COLUMN, REQUIRED_COLUMNS};

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{InventoryRecord, InventoryRow};
use columns::CsvRow;

/// Errors raised while loading the inventory table. All of them are fatal.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Required column missing: {0}")]
    MissingColumn(String),

    #[error("Invalid date '{value}' in column '{column}' at line {line}")]
    InvalidDate {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("Source has no header row")]
    EmptyHeader,

    #[error("Byte 0x{byte:02X} at offset {offset} is undefined in Windows-1252")]
    Encoding { offset: usize, byte: u8 },

    #[error("Malformed {encoding} text")]
    MalformedText { encoding: &'static str },
}

pub type LoadResult<T> = Result<T, DataLoadError>;

/// The loaded inventory table with derived columns. Immutable once built.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Table {
    rows: Vec<InventoryRow>,
}

impl Table {
    /// Build a table, computing the derived columns of every record.
    pub fn from_records(records: Vec<InventoryRecord>) -> Self {
        Self {
            rows: records.into_iter().map(InventoryRow::new).collect(),
        }
    }

    pub fn rows(&self) -> &[InventoryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A view over every row.
    pub fn view(&self) -> TableView<'_> {
        TableView {
            table: self,
            indices: (0..self.rows.len()).collect(),
        }
    }
}

/// A read-only subset of a [`Table`]'s rows, in original row order.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> TableView<'a> {
    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Positions of the selected rows in the underlying table.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a InventoryRow> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.rows[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether the view still covers the whole table.
    pub fn is_full(&self) -> bool {
        self.indices.len() == self.table.rows.len()
    }

    /// Narrow the view to the rows matching `predicate`.
    pub fn retain_where(&self, predicate: impl Fn(&InventoryRow) -> bool) -> TableView<'a> {
        let table = self.table;
        TableView {
            table,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| predicate(&table.rows[i]))
                .collect(),
        }
    }
}

impl PartialEq for TableView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table) && self.indices == other.indices
    }
}

/// Load the inventory table from a Windows-1252 encoded CSV reader.
pub fn load_table<R: Read>(mut reader: R) -> LoadResult<Table> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| DataLoadError::Io {
            path: "<reader>".to_string(),
            source,
        })?;
    parse_table(&bytes)
}

/// Load the inventory table from a CSV file path.
pub fn load_table_file<P: AsRef<Path>>(path: P) -> LoadResult<Table> {
    let path = path.as_ref();
    let io_error = |source| DataLoadError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut bytes))
        .map_err(io_error)?;
    parse_table(&bytes)
}

/// Bytes with no assigned character in Windows-1252.
const UNDEFINED_CP1252: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

/// Decode the source as Windows-1252, or as the encoding a leading BOM names.
///
/// encoding_rs maps the five unassigned Windows-1252 bytes to C1 controls,
/// so they are rejected before decoding.
fn decode_source(bytes: &[u8]) -> LoadResult<Cow<'_, str>> {
    if encoding_rs::Encoding::for_bom(bytes).is_none() {
        if let Some(offset) = bytes.iter().position(|b| UNDEFINED_CP1252.contains(b)) {
            return Err(DataLoadError::Encoding {
                offset,
                byte: bytes[offset],
            });
        }
    }

    let (text, encoding, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if had_errors {
        return Err(DataLoadError::MalformedText {
            encoding: encoding.name(),
        });
    }
    debug!(encoding = encoding.name(), bytes = bytes.len(), "decoded inventory source");
    Ok(text)
}

fn parse_table(bytes: &[u8]) -> LoadResult<Table> {
    let text = decode_source(bytes)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = csv_reader
        .headers()
        .map_err(|source| DataLoadError::Csv { line: 1, source })?
        .clone();
    if headers.iter().all(str::is_empty) {
        return Err(DataLoadError::EmptyHeader);
    }
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(DataLoadError::MissingColumn(missing.to_string()));
    }
    debug!(
        listed_margin = headers.iter().any(|h| h == LISTED_MARGIN_COLUMN),
        "validated inventory header"
    );

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let raw = result.map_err(|source| DataLoadError::Csv {
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;
        let line = raw.position().map(|p| p.line()).unwrap_or(0);
        let row: CsvRow = raw
            .deserialize(Some(&headers))
            .map_err(|source| DataLoadError::Csv { line, source })?;
        records.push(row.into_record(line)?);
    }

    debug!(rows = records.len(), "parsed inventory rows");
    Ok(Table::from_records(records))
}

/// Loads the inventory table on first use and caches it for the session.
///
/// There is exactly one logical table per store, so the cache has no key.
/// A failed load is not cached; the next call retries.
pub struct RecordStore {
    source: PathBuf,
    cached: Mutex<Option<Arc<Table>>>,
}

impl RecordStore {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            cached: Mutex::new(None),
        }
    }

    /// Return the cached table, loading it on the first call.
    pub fn load(&self) -> LoadResult<Arc<Table>> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = cached.as_ref() {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_table_file(&self.source)?);
        info!(
            source = %self.source.display(),
            rows = table.len(),
            "loaded inventory table"
        );
        *cached = Some(Arc::clone(&table));
        Ok(table)
    }

    pub fn is_loaded(&self) -> bool {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
