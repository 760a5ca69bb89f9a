use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::{DatasetError, MISSING_VALUE, Row};

const SEPARATOR: char = '\t';

/// Streams a tab-separated file in bounded chunks, keeping only selected columns.
///
/// Lines are decoded lossily so a stray invalid byte never ends the stream.
pub struct TsvChunkReader {
    path: PathBuf,
    reader: BufReader<File>,
    columns: Arc<[String]>,
    indices: Vec<usize>,
    buf: Vec<u8>,
    rows_read: u64,
    exhausted: bool,
}

impl TsvChunkReader {
    /// Opens `path` and resolves `columns` against its header row.
    pub async fn open(path: &Path, columns: &[&str]) -> Result<Self, DatasetError> {
        let file = File::open(path)
            .await
            .map_err(|source| DatasetError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| DatasetError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if n == 0 {
            return Err(DatasetError::EmptySource {
                path: path.to_path_buf(),
            });
        }

        let header_line = decode_line(&buf);
        let header: Vec<&str> = header_line
            .trim_start_matches('\u{feff}')
            .split(SEPARATOR)
            .collect();

        let indices = columns
            .iter()
            .map(|column| {
                header
                    .iter()
                    .position(|h| h == column)
                    .ok_or_else(|| DatasetError::MissingColumn {
                        path: path.to_path_buf(),
                        column: (*column).to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(path = ?path, columns = ?columns, "Opened TSV source");

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            indices,
            buf,
            rows_read: 0,
            exhausted: false,
        })
    }

    /// Reads up to `max_rows` rows. Returns `None` once the source is exhausted.
    pub async fn next_chunk(&mut self, max_rows: usize) -> Result<Option<Vec<Row>>, DatasetError> {
        if self.exhausted {
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(max_rows.min(4096));
        while rows.len() < max_rows {
            self.buf.clear();
            let n = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(|source| DatasetError::Read {
                    path: self.path.clone(),
                    source,
                })?;

            if n == 0 {
                self.exhausted = true;
                break;
            }

            let line = decode_line(&self.buf);
            if line.is_empty() {
                continue;
            }

            rows.push(self.parse_line(&line));
            self.rows_read += 1;
        }

        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows))
        }
    }

    fn parse_line(&self, line: &str) -> Row {
        let fields: Vec<&str> = line.split(SEPARATOR).collect();
        let values = self
            .indices
            .iter()
            .map(|&idx| match fields.get(idx) {
                Some(&v) if !v.is_empty() && v != MISSING_VALUE => Some(v.to_string()),
                _ => None,
            })
            .collect();

        Row::new(Arc::clone(&self.columns), values)
    }

    #[must_use]
    pub const fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

fn decode_line(raw: &[u8]) -> String {
    let line = String::from_utf8_lossy(raw);
    line.trim_end_matches(['\n', '\r']).to_string()
}
