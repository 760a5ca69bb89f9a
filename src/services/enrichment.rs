//! Incremental OMDb enrichment of stored titles.
//!
//! Each run selects up to `batch_size` titles that have not been enriched
//! (flag absent or false), looks each one up once, and records the outcome on
//! the title. A hit stores a review and sets the flag to true in the same
//! transaction. A "not found" answer sets it to false and counts toward
//! `max_attempts`. A failed request (transport error, timeout, rate limit)
//! also sets it to false but does not count, so an outage never retires a
//! title.
//!
//! Store errors while recording a single title are logged and counted as
//! failures; only failing to select the batch aborts the run.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::clients::omdb::{OmdbClient, TitleLookup};
use crate::config::{EnrichmentConfig, OMDB_API_KEY_ENV};
use crate::db::Store;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("OMDb API key is not configured (set {OMDB_API_KEY_ENV})")]
    MissingApiKey,

    #[error("Lookup failed for {id}: {message}")]
    LookupFailed { id: String, message: String },

    #[error("Failed to create OMDb client: {0}")]
    Client(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for EnrichmentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Enriched,
    NotFound,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub selected: usize,
    pub enriched: usize,
    pub not_found: usize,
    pub failed: usize,
}

pub struct EnrichmentService {
    store: Store,
    lookup: Arc<dyn TitleLookup>,
    max_attempts: i32,
}

impl EnrichmentService {
    #[must_use]
    pub fn new(store: Store, lookup: Arc<dyn TitleLookup>, max_attempts: i32) -> Self {
        Self {
            store,
            lookup,
            max_attempts,
        }
    }

    /// Builds the service with a live [`OmdbClient`].
    pub fn from_config(store: Store, config: &EnrichmentConfig) -> Result<Self, EnrichmentError> {
        if config.api_key.trim().is_empty() {
            return Err(EnrichmentError::MissingApiKey);
        }

        let client = OmdbClient::with_config(
            config.api_url.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )
        .map_err(|e| EnrichmentError::Client(format!("{e:#}")))?;

        Ok(Self::new(store, Arc::new(client), config.max_attempts))
    }

    /// Enriches at most `max` pending titles, one lookup each.
    #[instrument(skip(self))]
    pub async fn enrich_batch(&self, max: u64) -> Result<EnrichmentReport, EnrichmentError> {
        let pending = self
            .store
            .pending_enrichment(max, self.max_attempts)
            .await?;

        let mut report = EnrichmentReport {
            selected: pending.len(),
            ..EnrichmentReport::default()
        };

        if pending.is_empty() {
            info!("No titles pending enrichment");
            return Ok(report);
        }

        info!(
            event = "enrichment_started",
            count = pending.len(),
            "Enriching {} titles",
            pending.len()
        );

        for tconst in &pending {
            let (outcome, written) = match self.lookup.lookup(tconst).await {
                Ok(Some(title)) => (
                    Outcome::Enriched,
                    self.store.record_review(&title.into_review(tconst)).await,
                ),
                Ok(None) => (
                    Outcome::NotFound,
                    self.store.mark_lookup_missed(tconst).await,
                ),
                Err(e) => {
                    let err = EnrichmentError::LookupFailed {
                        id: tconst.clone(),
                        message: format!("{e:#}"),
                    };
                    warn!(error = %err, "OMDb lookup failed");
                    (Outcome::Failed, self.store.mark_lookup_failed(tconst).await)
                }
            };

            match (outcome, written) {
                (_, Err(e)) => {
                    warn!(
                        tconst = %tconst,
                        error = %format!("{e:#}"),
                        "Failed to record enrichment outcome"
                    );
                    report.failed += 1;
                }
                (Outcome::Enriched, Ok(())) => {
                    report.enriched += 1;
                    debug!(tconst = %tconst, "Stored OMDb review");
                }
                (Outcome::NotFound, Ok(())) => {
                    report.not_found += 1;
                    debug!(tconst = %tconst, "No OMDb record");
                }
                (Outcome::Failed, Ok(())) => report.failed += 1,
            }
        }

        info!(
            event = "enrichment_finished",
            selected = report.selected,
            enriched = report.enriched,
            not_found = report.not_found,
            failed = report.failed,
            "Enrichment run complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_config_requires_api_key() {
        let store = Store::new("sqlite::memory:").await.unwrap();

        let config = EnrichmentConfig::default();
        assert!(matches!(
            EnrichmentService::from_config(store.clone(), &config),
            Err(EnrichmentError::MissingApiKey)
        ));

        let config = EnrichmentConfig {
            api_key: "k".to_string(),
            ..EnrichmentConfig::default()
        };
        assert!(EnrichmentService::from_config(store, &config).is_ok());
    }
}
