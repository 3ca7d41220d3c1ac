//! Flat CSV durable store.
//!
//! One row per completed session. Appends reconcile column-set drift across
//! records by union-padding with an empty placeholder and rewrite the file
//! whole under a temporary name before renaming it into place, so concurrent
//! readers never observe a partial record.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use muse_core::errors::{ErrorInfo, MuseError};
use muse_flow::ResponseRecord;
use serde::{Deserialize, Serialize};

/// Table representation returned from store loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// CSV-backed append target shared by all participants of a study.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Creates a store handle for the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record. A record may introduce columns absent from
    /// existing rows or omit existing ones; the schemas are unioned and
    /// missing cells padded empty. Never rejects a record over drift.
    pub fn append(&self, record: &ResponseRecord) -> Result<(), MuseError> {
        let mut table = self.load()?;
        for column in record.fields().keys() {
            if !table.columns.contains(column) {
                table.columns.push(column.clone());
                for row in &mut table.rows {
                    row.push(String::new());
                }
            }
        }
        let row = table
            .columns
            .iter()
            .map(|column| record.fields().get(column).cloned().unwrap_or_default())
            .collect();
        table.rows.push(row);
        self.rewrite(&table)
    }

    /// Loads all rows. A missing file yields an empty table. A structurally
    /// corrupt file is renamed to a timestamped quarantine name and an empty
    /// table is returned; the caller is warned, never failed.
    pub fn load(&self) -> Result<Table, MuseError> {
        if !self.path.exists() {
            return Ok(Table::default());
        }
        let bytes = fs::read(&self.path).map_err(|err| {
            MuseError::Store(
                ErrorInfo::new("store-read", "failed to read responses file")
                    .with_context("path", self.path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        match read_table(&bytes) {
            Ok(table) => Ok(table),
            Err(err) => {
                self.quarantine(&err)?;
                Ok(Table::default())
            }
        }
    }

    fn quarantine(&self, cause: &MuseError) -> Result<(), MuseError> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S");
        let quarantined = self.path.with_extension(format!("corrupt-{stamp}.csv"));
        log::warn!(
            "responses file unreadable ({cause}); quarantining as {}",
            quarantined.display()
        );
        fs::rename(&self.path, &quarantined).map_err(|err| {
            MuseError::Store(
                ErrorInfo::new("store-quarantine", "failed to quarantine corrupt store")
                    .with_context("path", self.path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })
    }

    fn rewrite(&self, table: &Table) -> Result<(), MuseError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    MuseError::Store(
                        ErrorInfo::new("store-create", "failed to create store directory")
                            .with_context("path", parent.display().to_string())
                            .with_hint(err.to_string()),
                    )
                })?;
            }
        }
        let staged = self.path.with_extension("csv.tmp");
        fs::write(&staged, export(table)?).map_err(|err| {
            MuseError::Store(
                ErrorInfo::new("store-stage", "failed to stage store rewrite")
                    .with_context("path", staged.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        fs::rename(&staged, &self.path).map_err(|err| {
            MuseError::Store(
                ErrorInfo::new("store-commit", "failed to commit store rewrite")
                    .with_context("path", self.path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })
    }
}

/// Serializes a table to portable CSV: UTF-8, comma separated, every field
/// quoted.
pub fn export(table: &Table) -> Result<Vec<u8>, MuseError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .map_err(|err| wrap_csv("export-header", err))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|err| wrap_csv("export-row", err))?;
    }
    writer
        .into_inner()
        .map_err(|err| wrap_csv("export-flush", err.into_error().into()))
}

/// Parses CSV bytes back into a table. Strict: ragged rows or invalid
/// UTF-8 are structural corruption.
pub fn read_table(bytes: &[u8]) -> Result<Table, MuseError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes);
    let columns = reader
        .headers()
        .map_err(|err| wrap_csv("load-header", err))?
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| wrap_csv("load-record", err))?;
        rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }
    Ok(Table { columns, rows })
}

fn wrap_csv(code: &str, err: csv::Error) -> MuseError {
    MuseError::Store(ErrorInfo::new(code, "CSV store failure").with_hint(err.to_string()))
}
