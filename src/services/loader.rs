//! Chunked, filtered, relationship-preserving bulk loader.
//!
//! Loading happens in two phases over the raw IMDb dumps:
//! 1. **Primary** (`title.basics`): rows are streamed in fixed-size chunks,
//!    filtered by a [`RowFilter`], and the first `target_count` survivors (in
//!    file order) are stored. The ids of those rows form a [`RetainedIds`] set.
//! 2. **Secondary** (`name.basics`): every row is streamed and kept only when
//!    its comma-joined `knownForTitles` list contains a retained id.
//!
//! Memory stays bounded by the chunk size plus the rows actually kept.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::LoaderConfig;
use crate::dataset::{DatasetError, Row, TsvChunkReader};
use crate::db::Store;
use crate::models::person::{KNOWN_FOR_COLUMN, LIST_SEPARATOR, PERSON_COLUMNS};
use crate::models::title::{TITLE_COLUMNS, TITLE_KEY_COLUMN};
use crate::services::filter::{MinYearFilter, RowFilter};
use crate::services::sink::{PersonSink, RecordSink, TitleSink};

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Target count must be greater than zero")]
    InvalidTarget,

    #[error("Column '{0}' must be among the selected columns")]
    ColumnNotSelected(String),

    #[error("Failed to insert into {collection}: {message}")]
    Store { collection: String, message: String },
}

impl LoaderError {
    fn store(sink: &dyn RecordSink, err: &anyhow::Error) -> Self {
        Self::Store {
            collection: sink.collection().to_string(),
            message: format!("{err:#}"),
        }
    }
}

/// Primary keys kept by the primary phase. Lives for one loader run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetainedIds(HashSet<String>);

impl RetainedIds {
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// True when any entry of the `separator`-joined `list` is retained.
    /// Entries are compared whole, never as substrings.
    #[must_use]
    pub fn intersects(&self, list: &str, separator: char) -> bool {
        list.split(separator)
            .filter(|id| !id.is_empty())
            .any(|id| self.contains(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for RetainedIds {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrimaryLoad {
    pub retained: RetainedIds,
    /// Rows the sink reported as stored.
    pub inserted: u64,
    pub chunks_read: usize,
    pub rows_scanned: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SecondaryLoad {
    pub kept: usize,
    pub inserted: u64,
    pub rows_scanned: u64,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub titles: PrimaryLoad,
    pub people: SecondaryLoad,
}

pub struct FilteredBulkLoader {
    chunk_size: usize,
}

impl FilteredBulkLoader {
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Loads at most `target_count` rows of `source` that pass `filter`.
    ///
    /// Reading stops at the end of the first chunk that brings the accumulated
    /// rows to `target_count`; the rest of the file is never read. Rows with
    /// no value in `key_column` are skipped.
    #[instrument(skip_all, fields(source = %source.display(), target_count = target_count, filter = filter.name()))]
    pub async fn load_filtered_primary(
        &self,
        source: &Path,
        sink: &dyn RecordSink,
        target_count: usize,
        keep_columns: &[&str],
        key_column: &str,
        filter: &dyn RowFilter,
    ) -> Result<PrimaryLoad, LoaderError> {
        if target_count == 0 {
            return Err(LoaderError::InvalidTarget);
        }
        if !keep_columns.contains(&key_column) {
            return Err(LoaderError::ColumnNotSelected(key_column.to_string()));
        }

        let mut reader = TsvChunkReader::open(source, keep_columns).await?;
        let mut records: Vec<Row> = Vec::new();
        let mut chunks_read = 0usize;
        let mut keyless = 0u64;

        while let Some(chunk) = reader.next_chunk(self.chunk_size).await? {
            chunks_read += 1;

            for row in chunk {
                if row.get(key_column).is_none_or(str::is_empty) {
                    keyless += 1;
                    continue;
                }
                if filter.keep(&row) {
                    records.push(row);
                }
            }

            if records.len() >= target_count {
                records.truncate(target_count);
                debug!(
                    chunks = chunks_read,
                    rows = reader.rows_read(),
                    "Target reached, stopping early"
                );
                break;
            }
        }

        if keyless > 0 {
            debug!(count = keyless, "Skipped rows without a key");
        }

        let inserted = insert_all(sink, &records, source).await?;

        let retained = records
            .iter()
            .filter_map(|row| row.get(key_column))
            .map(str::to_string)
            .collect();

        Ok(PrimaryLoad {
            retained,
            inserted,
            chunks_read,
            rows_scanned: reader.rows_read(),
        })
    }

    /// Loads every row of `source` whose `link_column` list shares an id with
    /// `retained`. The whole source is scanned.
    #[instrument(skip_all, fields(source = %source.display(), retained = retained.len()))]
    pub async fn load_connected_secondary(
        &self,
        source: &Path,
        sink: &dyn RecordSink,
        retained: &RetainedIds,
        keep_columns: &[&str],
        link_column: &str,
    ) -> Result<SecondaryLoad, LoaderError> {
        if !keep_columns.contains(&link_column) {
            return Err(LoaderError::ColumnNotSelected(link_column.to_string()));
        }

        let mut reader = TsvChunkReader::open(source, keep_columns).await?;
        let mut records: Vec<Row> = Vec::new();

        while let Some(chunk) = reader.next_chunk(self.chunk_size).await? {
            records.extend(chunk.into_iter().filter(|row| {
                row.get(link_column)
                    .is_some_and(|ids| retained.intersects(ids, LIST_SEPARATOR))
            }));
        }

        let inserted = insert_all(sink, &records, source).await?;

        Ok(SecondaryLoad {
            kept: records.len(),
            inserted,
            rows_scanned: reader.rows_read(),
        })
    }
}

async fn insert_all(sink: &dyn RecordSink, records: &[Row], source: &Path) -> Result<u64, LoaderError> {
    let file_name = source
        .file_name()
        .map_or_else(|| source.display().to_string(), |n| n.to_string_lossy().into_owned());

    if records.is_empty() {
        info!("No records to insert for {file_name}");
        return Ok(0);
    }

    let inserted = sink
        .insert_many(records)
        .await
        .map_err(|e| LoaderError::store(sink, &e))?;

    info!(
        event = "bulk_insert_finished",
        collection = sink.collection(),
        rows = records.len(),
        inserted,
        "Inserted {} records from {} into {}",
        inserted,
        file_name,
        sink.collection()
    );

    Ok(inserted)
}

/// Runs both phases against the configured files in `data_dir`.
#[instrument(skip_all, fields(data_dir = %data_dir.display()))]
pub async fn load_titles_and_people(
    store: &Store,
    config: &LoaderConfig,
    data_dir: &Path,
) -> Result<LoadReport, LoaderError> {
    let loader = FilteredBulkLoader::new(config.chunk_size);
    let titles_path: PathBuf = data_dir.join(&config.titles_file);
    let people_path: PathBuf = data_dir.join(&config.people_file);

    let filter = MinYearFilter::start_year(config.min_start_year);
    let titles = loader
        .load_filtered_primary(
            &titles_path,
            &TitleSink::new(store.clone()),
            config.subset_size,
            TITLE_COLUMNS,
            TITLE_KEY_COLUMN,
            &filter,
        )
        .await?;

    info!(
        retained = titles.retained.len(),
        chunks = titles.chunks_read,
        "Title subset loaded"
    );

    let people = loader
        .load_connected_secondary(
            &people_path,
            &PersonSink::new(store.clone()),
            &titles.retained,
            PERSON_COLUMNS,
            KNOWN_FOR_COLUMN,
        )
        .await?;

    Ok(LoadReport { titles, people })
}
