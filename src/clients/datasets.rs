//! Downloads the raw IMDb archives.
//!
//! Bodies are streamed to a `.part` file next to the target and renamed into
//! place once complete, so an interrupted download never looks finished.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Download of {url} returned HTTP {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Download of {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decompress {path}: {message}")]
    Decompress { path: PathBuf, message: String },

    #[error("Data directory does not exist: {0}")]
    MissingDirectory(PathBuf),
}

impl RetrievalError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Clone)]
pub struct DatasetClient {
    http_client: reqwest::Client,
    raw_dir: PathBuf,
}

impl DatasetClient {
    pub fn new(raw_dir: impl Into<PathBuf>, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self::with_client(raw_dir, http_client))
    }

    #[must_use]
    pub fn with_client(raw_dir: impl Into<PathBuf>, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            raw_dir: raw_dir.into(),
        }
    }

    /// Local file for a named dataset: `<raw_dir>/<name><suffix>`, where the
    /// suffix is taken from the URL (`.tsv.gz` for the IMDb dumps).
    #[must_use]
    pub fn archive_path(&self, name: &str, url: &str) -> PathBuf {
        self.raw_dir.join(format!("{name}{}", archive_suffix(url)))
    }

    /// Streams `url` into `target`, returning the number of bytes written.
    #[instrument(skip(self, target), fields(path = %target.display()))]
    pub async fn download(&self, url: &str, target: &Path) -> Result<u64, RetrievalError> {
        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RetrievalError::io(parent, e))?;
        }

        let transport = |source| RetrievalError::Transport {
            url: url.to_string(),
            source,
        };

        let mut response = self.http_client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let partial = partial_path(target);
        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(|e| RetrievalError::io(&partial, e))?;

        let mut written = 0u64;
        let result: Result<(), RetrievalError> = async {
            while let Some(chunk) = response.chunk().await.map_err(transport)? {
                file.write_all(&chunk)
                    .await
                    .map_err(|e| RetrievalError::io(&partial, e))?;
                written += chunk.len() as u64;
            }
            file.flush()
                .await
                .map_err(|e| RetrievalError::io(&partial, e))
        }
        .await;

        drop(file);

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        tokio::fs::rename(&partial, target)
            .await
            .map_err(|e| RetrievalError::io(target, e))?;

        debug!(bytes = written, "Download complete");
        Ok(written)
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn archive_suffix(url: &str) -> String {
    let file_name = url
        .split(['?', '#'])
        .next()
        .and_then(|u| u.rsplit('/').next())
        .unwrap_or_default();

    if let Some(idx) = file_name.find(".tsv") {
        return file_name[idx..].to_string();
    }

    Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
