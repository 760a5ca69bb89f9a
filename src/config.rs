use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::services::exploration::RelationMatch;

/// Environment variable holding the store connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Environment variable holding the OMDb API key.
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub store: StoreConfig,

    pub retrieval: RetrievalConfig,

    pub loader: LoaderConfig,

    pub enrichment: EnrichmentConfig,

    pub exploration: ExplorationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub log_json: bool,

    /// Directory holding downloaded archives and their decompressed files.
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            data_dir: "data/raw".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Usually supplied through `DATABASE_URL` rather than the config file.
    #[serde(skip_serializing)]
    pub connection_string: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            max_connections: 1,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Dataset name to download URL. Downloaded in name order.
    pub sources: BTreeMap<String, String>,

    /// Download again even when the archive is already on disk.
    pub force_download: bool,

    /// Request timeout in seconds (default: 600, the archives are large)
    pub request_timeout_seconds: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let sources = [
            (
                "name.basics",
                "https://datasets.imdbws.com/name.basics.tsv.gz",
            ),
            (
                "title.basics",
                "https://datasets.imdbws.com/title.basics.tsv.gz",
            ),
            (
                "title.ratings",
                "https://datasets.imdbws.com/title.ratings.tsv.gz",
            ),
        ]
        .into_iter()
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .collect();

        Self {
            sources,
            force_download: false,
            request_timeout_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Rows read per chunk. Bounds memory independently of file size.
    pub chunk_size: usize,

    /// Number of titles to keep from the primary dataset.
    pub subset_size: usize,

    /// Titles released before this year are skipped. Missing years count as 0.
    pub min_start_year: i32,

    pub titles_file: String,

    pub people_file: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            subset_size: 2000,
            min_start_year: 2000,
            titles_file: "title.basics.tsv".to_string(),
            people_file: "name.basics.tsv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub api_url: String,

    /// Usually supplied through `OMDB_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Titles looked up per run. The free OMDb tier allows 1000 requests a day.
    pub batch_size: u64,

    /// Titles whose lookup failed this many times are no longer selected.
    /// Set to 0 to retry failed titles on every run.
    pub max_attempts: i32,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_url: "http://www.omdbapi.com/".to_string(),
            api_key: String::new(),
            batch_size: 900,
            max_attempts: 3,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    pub sample_limit: u64,

    pub join_limit: u64,

    pub count_limit: u64,

    pub relation_match: RelationMatch,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            sample_limit: 5,
            join_limit: 5,
            count_limit: 10,
            relation_match: RelationMatch::Membership,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overlays secrets from the environment. Non-empty values win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.store.connection_string = url;
        }

        if let Some(key) = lookup(OMDB_API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.enrichment.api_key = key;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("imdb-etl").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".imdb-etl").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.connection_string.trim().is_empty() {
            anyhow::bail!(
                "Store connection string is not configured (set {DATABASE_URL_ENV})"
            );
        }

        if self.loader.chunk_size == 0 {
            anyhow::bail!("loader.chunk_size must be > 0");
        }

        if self.loader.subset_size == 0 {
            anyhow::bail!("loader.subset_size must be > 0");
        }

        if self.enrichment.max_attempts < 0 {
            anyhow::bail!("enrichment.max_attempts cannot be negative");
        }

        Ok(())
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.loader.chunk_size, 10_000);
        assert_eq!(config.loader.subset_size, 2000);
        assert_eq!(config.loader.min_start_year, 2000);
        assert_eq!(config.enrichment.batch_size, 900);
        assert_eq!(config.retrieval.sources.len(), 3);
        assert_eq!(config.exploration.relation_match, RelationMatch::Membership);
    }

    #[test]
    fn test_sources_iterate_in_name_order() {
        let config = Config::default();
        let names: Vec<&str> = config.retrieval.sources.keys().map(String::as_str).collect();
        assert_eq!(names, ["name.basics", "title.basics", "title.ratings"]);
    }

    #[test]
    fn test_config_serialization_skips_secrets() {
        let mut config = Config::default();
        config.store.connection_string = "sqlite:secret.db".to_string();
        config.enrichment.api_key = "abc123".to_string();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[loader]"));
        assert!(toml_str.contains("[enrichment]"));
        assert!(!toml_str.contains("secret.db"));
        assert!(!toml_str.contains("abc123"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [loader]
            subset_size = 50

            [exploration]
            relation_match = "substring"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.loader.subset_size, 50);
        assert_eq!(config.loader.chunk_size, 10_000);
        assert_eq!(config.exploration.relation_match, RelationMatch::Substring);
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            DATABASE_URL_ENV => Some("sqlite:data/imdb.db".to_string()),
            OMDB_API_KEY_ENV => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.store.connection_string, "sqlite:data/imdb.db");
        assert!(config.enrichment.api_key.is_empty());
    }

    #[test]
    fn test_validate_requires_connection_string() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(DATABASE_URL_ENV));

        let mut config = Config::default();
        config.store.connection_string = "sqlite::memory:".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.store.connection_string = "sqlite::memory:".to_string();
        config.loader.chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
