use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::clients::datasets::{DatasetClient, RetrievalError};
use crate::dataset::{ArchiveFormat, decompress_file};

#[derive(Debug, Default)]
pub struct FetchReport {
    pub downloaded: Vec<PathBuf>,
    /// Archives already on disk and left untouched.
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(String, RetrievalError)>,
}

#[derive(Debug, Default)]
pub struct DecompressReport {
    pub decompressed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, RetrievalError)>,
}

/// Downloads and unpacks the configured dataset archives.
///
/// A failure on one source is recorded and the remaining sources are still
/// processed.
pub struct RetrievalService {
    client: DatasetClient,
    force_download: bool,
}

impl RetrievalService {
    #[must_use]
    pub const fn new(client: DatasetClient, force_download: bool) -> Self {
        Self {
            client,
            force_download,
        }
    }

    #[instrument(skip_all, fields(sources = sources.len(), force = self.force_download))]
    pub async fn fetch_all(&self, sources: &BTreeMap<String, String>) -> FetchReport {
        let mut report = FetchReport::default();

        for (name, url) in sources {
            let target = self.client.archive_path(name, url);

            if target.exists() && !self.force_download {
                info!(dataset = %name, path = %target.display(), "Archive already present, skipping");
                report.skipped.push(target);
                continue;
            }

            info!(event = "dataset_download_started", dataset = %name, url = %url, "Downloading {name}");

            match self.client.download(url, &target).await {
                Ok(bytes) => {
                    info!(
                        event = "dataset_download_finished",
                        dataset = %name,
                        bytes,
                        "Downloaded {name} to {}",
                        target.display()
                    );
                    report.downloaded.push(target);
                }
                Err(e) => {
                    warn!(dataset = %name, error = %e, "Download failed");
                    report.failed.push((name.clone(), e));
                }
            }
        }

        report
    }

    /// Unpacks every `.gz`/`.zst` archive directly inside `dir` next to itself.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub async fn decompress_all(&self, dir: &Path) -> Result<DecompressReport, RetrievalError> {
        decompress_directory(dir).await
    }
}

/// Unpacks every archive directly inside `dir`, in file name order.
pub async fn decompress_directory(dir: &Path) -> Result<DecompressReport, RetrievalError> {
    if !dir.is_dir() {
        return Err(RetrievalError::MissingDirectory(dir.to_path_buf()));
    }

    let archives: Vec<(PathBuf, ArchiveFormat)> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.into_path();
            ArchiveFormat::from_path(&path).map(|format| (path, format))
        })
        .collect();

    let mut report = DecompressReport::default();

    for (input, format) in archives {
        let output = ArchiveFormat::output_path(&input);
        info!(archive = %input.display(), "Decompressing");

        let task_input = input.clone();
        let task_output = output.clone();

        // CPU-bound: off the runtime thread
        let result = tokio::task::spawn_blocking(move || {
            decompress_file(&task_input, &task_output, format)
        })
        .await;

        match result {
            Ok(Ok(bytes)) => {
                info!(
                    event = "dataset_decompressed",
                    output = %output.display(),
                    bytes,
                    "Decompressed {}",
                    input.display()
                );
                report.decompressed.push(output);
            }
            Ok(Err(e)) => {
                warn!(archive = %input.display(), error = %e, "Decompression failed");
                report.failed.push((
                    input.clone(),
                    RetrievalError::Decompress {
                        path: input,
                        message: format!("{e:#}"),
                    },
                ));
            }
            Err(join) => {
                warn!(archive = %input.display(), error = %join, "Decompression task panicked");
                report.failed.push((
                    input.clone(),
                    RetrievalError::Decompress {
                        path: input,
                        message: join.to_string(),
                    },
                ));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use std::time::Duration;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("imdb-etl-retrieval-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_gz(path: &Path, body: &[u8]) {
        let mut encoder = GzEncoder::new(std::fs::File::create(path).unwrap(), Compression::fast());
        encoder.write_all(body).unwrap();
        encoder.finish().unwrap();
    }

    #[tokio::test]
    async fn decompresses_archives_and_reports_broken_ones() {
        let dir = temp_dir();
        write_gz(&dir.join("a.tsv.gz"), b"tconst\ntt1\n");
        std::fs::write(dir.join("b.tsv.gz"), b"not gzip").unwrap();
        std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();

        let report = decompress_directory(&dir).await.unwrap();

        assert_eq!(report.decompressed, vec![dir.join("a.tsv")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, dir.join("b.tsv.gz"));
        assert_eq!(
            std::fs::read_to_string(dir.join("a.tsv")).unwrap(),
            "tconst\ntt1\n"
        );
        assert!(!dir.join("b.tsv").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join(format!("imdb-etl-missing-{}", uuid::Uuid::new_v4()));
        assert!(matches!(
            decompress_directory(&dir).await,
            Err(RetrievalError::MissingDirectory(_))
        ));
    }

    #[tokio::test]
    async fn existing_archive_is_skipped_and_failures_do_not_stop_the_run() {
        let dir = temp_dir();
        std::fs::write(dir.join("title.basics.tsv.gz"), b"cached").unwrap();

        let client = DatasetClient::new(&dir, Duration::from_secs(2)).unwrap();
        let service = RetrievalService::new(client, false);

        let sources: BTreeMap<String, String> = [
            ("name.basics", "http://127.0.0.1:9/name.basics.tsv.gz"),
            ("title.basics", "http://127.0.0.1:9/title.basics.tsv.gz"),
        ]
        .into_iter()
        .map(|(n, u)| (n.to_string(), u.to_string()))
        .collect();

        let report = service.fetch_all(&sources).await;

        assert!(report.downloaded.is_empty());
        assert_eq!(report.skipped, vec![dir.join("title.basics.tsv.gz")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "name.basics");
        assert_eq!(
            std::fs::read(dir.join("title.basics.tsv.gz")).unwrap(),
            b"cached"
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
