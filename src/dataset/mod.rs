//! Delimited dataset access: rows, the chunked TSV reader, and archive handling.

pub mod archive;
pub mod tsv;

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use archive::{ArchiveFormat, decompress_file};
pub use tsv::TsvChunkReader;

/// Marker the IMDb dumps use for an absent value.
pub const MISSING_VALUE: &str = "\\N";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source has no header row: {path}")]
    EmptySource { path: PathBuf },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Failed reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single dataset row restricted to the selected columns.
///
/// Values are `None` when the source held the missing marker or the line was
/// too short to reach the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Row {
    #[must_use]
    pub fn new(columns: Arc<[String]>, values: Vec<Option<String>>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Builds a row from `(column, value)` pairs, mostly useful in tests.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, Option<&str>)]) -> Self {
        let columns: Arc<[String]> = pairs.iter().map(|(c, _)| (*c).to_string()).collect();
        let values = pairs.iter().map(|(_, v)| v.map(str::to_string)).collect();
        Self::new(columns, values)
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)?.as_deref()
    }

    /// Reads an integer column. Unparsable values read as absent.
    #[must_use]
    pub fn get_i32(&self, column: &str) -> Option<i32> {
        let raw = self.get(column)?;
        match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::trace!(column, value = raw, "Malformed integer treated as missing");
                None
            }
        }
    }
}
