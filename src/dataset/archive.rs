use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Compression formats the retrieval stage knows how to unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Gzip,
    Zstd,
}

impl ArchiveFormat {
    /// Detects the format from the file suffix.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "gz" => Some(Self::Gzip),
            "zst" => Some(Self::Zstd),
            _ => None,
        }
    }

    /// Sibling path with the compression suffix stripped.
    #[must_use]
    pub fn output_path(path: &Path) -> PathBuf {
        path.with_extension("")
    }
}

/// Decompresses `input` into `output`, returning the number of bytes written.
///
/// Blocking; callers on the runtime should go through `spawn_blocking`.
/// A partially written output is removed on failure.
pub fn decompress_file(input: &Path, output: &Path, format: ArchiveFormat) -> Result<u64> {
    let result = decompress_inner(input, output, format);
    if result.is_err() {
        let _ = std::fs::remove_file(output);
    }
    result
}

fn decompress_inner(input: &Path, output: &Path, format: ArchiveFormat) -> Result<u64> {
    let source = File::open(input)
        .with_context(|| format!("Failed to open archive: {}", input.display()))?;
    let source = BufReader::new(source);

    let mut decoder: Box<dyn Read> = match format {
        ArchiveFormat::Gzip => Box::new(flate2::read::MultiGzDecoder::new(source)),
        ArchiveFormat::Zstd => {
            Box::new(zstd::Decoder::new(source).context("Failed to create zstd decoder")?)
        }
    };

    let file = File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    let mut total = 0u64;
    let mut buffer = [0u8; 64 * 1024];
    loop {
        match decoder.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                writer
                    .write_all(&buffer[..n])
                    .context("Failed to write decompressed data")?;
                total += n as u64;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e).context("Failed to decompress data"),
        }
    }

    writer.flush().context("Failed to flush output file")?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("imdb-etl-archive-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn detects_format_from_suffix() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("data/title.basics.tsv.gz")),
            Some(ArchiveFormat::Gzip)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("db.json.zst")),
            Some(ArchiveFormat::Zstd)
        );
        assert_eq!(ArchiveFormat::from_path(Path::new("title.basics.tsv")), None);
    }

    #[test]
    fn output_path_strips_compression_suffix() {
        assert_eq!(
            ArchiveFormat::output_path(Path::new("raw/name.basics.tsv.gz")),
            PathBuf::from("raw/name.basics.tsv")
        );
    }

    #[test]
    fn gzip_round_trip() {
        let dir = temp_dir();
        let input = dir.join("sample.tsv.gz");
        let output = dir.join("sample.tsv");

        let mut encoder = GzEncoder::new(File::create(&input).unwrap(), Compression::default());
        encoder.write_all(b"tconst\tprimaryTitle\ntt1\tFirst\n").unwrap();
        encoder.finish().unwrap();

        let written = decompress_file(&input, &output, ArchiveFormat::Gzip).unwrap();
        assert_eq!(written, 30);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "tconst\tprimaryTitle\ntt1\tFirst\n"
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_archive_leaves_no_output() {
        let dir = temp_dir();
        let input = dir.join("broken.tsv.gz");
        let output = dir.join("broken.tsv");
        std::fs::write(&input, b"definitely not gzip").unwrap();

        assert!(decompress_file(&input, &output, ArchiveFormat::Gzip).is_err());
        assert!(!output.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
