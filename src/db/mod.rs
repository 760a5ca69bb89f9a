use crate::config::StoreConfig;
use crate::entities::{movies, people, reviews};
use crate::models::{PersonRecord, ReviewRecord, TitleRecord};
use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub mod migrator;
pub mod repositories;

pub use repositories::relations::{
    MoviePersonRow, RelatedCountRow, RelatedPerson, RelationMatch,
};

/// Handle to the document store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 1, 1).await
    }

    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::with_pool_options(
            &config.connection_string,
            config.max_connections,
            config.min_connections,
        )
        .await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path) = sqlite_file_path(db_url) {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !path.exists() {
                std::fs::File::create(&path).with_context(|| {
                    format!("Failed to create database file: {}", path.display())
                })?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections.max(1))
            .min_connections(min_connections.min(max_connections.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Store unavailable: failed to connect")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply store migrations")?;

        info!(
            "Store connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Releases the connection pool.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        debug!("Store connection closed");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn movie_repo(&self) -> repositories::movie::MovieRepository {
        repositories::movie::MovieRepository::new(self.conn.clone())
    }

    fn person_repo(&self) -> repositories::person::PersonRepository {
        repositories::person::PersonRepository::new(self.conn.clone())
    }

    fn review_repo(&self) -> repositories::review::ReviewRepository {
        repositories::review::ReviewRepository::new(self.conn.clone())
    }

    fn relation_repo(&self) -> repositories::relations::RelationRepository {
        repositories::relations::RelationRepository::new(self.conn.clone())
    }

    pub async fn insert_titles(&self, titles: &[TitleRecord]) -> Result<u64> {
        self.movie_repo().insert_many(titles).await
    }

    pub async fn count_movies(&self) -> Result<u64> {
        self.movie_repo().count().await
    }

    pub async fn count_enriched_movies(&self) -> Result<u64> {
        self.movie_repo().count_enriched().await
    }

    pub async fn get_movie(&self, tconst: &str) -> Result<Option<movies::Model>> {
        self.movie_repo().get(tconst).await
    }

    pub async fn first_movies(&self, limit: u64) -> Result<Vec<movies::Model>> {
        self.movie_repo().first(limit).await
    }

    pub async fn pending_enrichment(&self, limit: u64, max_attempts: i32) -> Result<Vec<String>> {
        self.movie_repo()
            .pending_enrichment(limit, max_attempts)
            .await
    }

    /// OMDb answered without a record: counts toward `max_attempts`.
    pub async fn mark_lookup_missed(&self, tconst: &str) -> Result<()> {
        self.movie_repo().set_answered(tconst, false).await?;
        Ok(())
    }

    /// The request itself failed: the title stays pending without using an attempt.
    pub async fn mark_lookup_failed(&self, tconst: &str) -> Result<()> {
        self.movie_repo().set_loaded(tconst, false).await?;
        Ok(())
    }

    pub async fn insert_people(&self, people: &[PersonRecord]) -> Result<u64> {
        self.person_repo().insert_many(people).await
    }

    pub async fn count_people(&self) -> Result<u64> {
        self.person_repo().count().await
    }

    pub async fn first_people(&self, limit: u64) -> Result<Vec<people::Model>> {
        self.person_repo().first(limit).await
    }

    pub async fn record_review(&self, review: &ReviewRecord) -> Result<()> {
        self.review_repo().insert_and_flag(review).await
    }

    pub async fn count_reviews(&self) -> Result<u64> {
        self.review_repo().count().await
    }

    pub async fn get_reviews_for_title(&self, tconst: &str) -> Result<Vec<reviews::Model>> {
        self.review_repo().for_title(tconst).await
    }

    pub async fn related_people(
        &self,
        tconst: &str,
        strategy: RelationMatch,
    ) -> Result<Vec<RelatedPerson>> {
        self.relation_repo().related_people(tconst, strategy).await
    }

    pub async fn movies_with_people(
        &self,
        strategy: RelationMatch,
        limit: u64,
    ) -> Result<Vec<MoviePersonRow>> {
        self.relation_repo()
            .movies_with_people(strategy, limit)
            .await
    }

    pub async fn related_people_counts(
        &self,
        strategy: RelationMatch,
        limit: u64,
    ) -> Result<Vec<RelatedCountRow>> {
        self.relation_repo().related_counts(strategy, limit).await
    }
}

/// File backing a `sqlite:` URL, or `None` for in-memory and non-SQLite URLs.
fn sqlite_file_path(db_url: &str) -> Option<PathBuf> {
    let rest = db_url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path.contains(":memory:") || path.starts_with("file:") {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}
