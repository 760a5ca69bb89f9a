use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::models::review::{OMDB_SOURCE, RatingEntry, ReviewRecord};

/// OMDb writes this where a field has no value.
const NOT_AVAILABLE: &str = "N/A";

/// Body of an OMDb `?i=<id>` lookup.
///
/// Misses still come back as HTTP 200 with `"Response": "False"` and an
/// `Error` message, so [`OmdbTitle::is_found`] must be checked.
#[derive(Debug, Clone, Deserialize)]
pub struct OmdbTitle {
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<RatingEntry>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl OmdbTitle {
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }

    /// `imdbRating` as a number; `"N/A"` and garbage read as absent.
    #[must_use]
    pub fn normalized_rating(&self) -> Option<f64> {
        self.imdb_rating
            .as_deref()
            .filter(|r| *r != NOT_AVAILABLE)
            .and_then(|r| r.trim().parse().ok())
    }

    #[must_use]
    pub fn into_review(self, tconst: &str) -> ReviewRecord {
        let imdb_rating = self.normalized_rating();
        ReviewRecord {
            tconst: tconst.to_string(),
            title: self.title,
            year: self.year,
            plot: self.plot,
            ratings: self.ratings,
            imdb_rating,
            source: OMDB_SOURCE.to_string(),
        }
    }
}

/// Looks up external metadata for a title id.
///
/// `Ok(None)` means the service answered but has no usable record.
#[async_trait::async_trait]
pub trait TitleLookup: Send + Sync {
    async fn lookup(&self, id: &str) -> Result<Option<OmdbTitle>>;
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn with_config(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OMDb HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn lookup_url(&self, id: &str) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid OMDb base URL: {}", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair("i", id);
        Ok(url)
    }

    pub async fn get_title(&self, id: &str) -> Result<Option<OmdbTitle>> {
        let url = self.lookup_url(id)?;
        debug!(id, "Querying OMDb");

        let response = self.client.get(url).send().await.map_err(|e| {
            // reqwest errors carry the request URL, which holds the key
            anyhow::anyhow!("OMDb request failed: {}", e.without_url())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow::anyhow!("OMDb API error: {status}"));
        }

        let body: OmdbTitle = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Invalid OMDb response: {}", e.without_url()))?;

        if !body.is_found() {
            debug!(
                id,
                reason = body.error.as_deref().unwrap_or("unknown"),
                "OMDb has no record"
            );
            return Ok(None);
        }

        Ok(Some(body))
    }
}

#[async_trait::async_trait]
impl TitleLookup for OmdbClient {
    async fn lookup(&self, id: &str) -> Result<Option<OmdbTitle>> {
        self.get_title(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_found_response() {
        let json = r#"{
            "Title": "Example",
            "Year": "2004",
            "Plot": "Something happens.",
            "Ratings": [{"Source": "Internet Movie Database", "Value": "7.1/10"}],
            "imdbRating": "7.1",
            "Response": "True"
        }"#;

        let title: OmdbTitle = serde_json::from_str(json).unwrap();
        assert!(title.is_found());
        assert_eq!(title.normalized_rating(), Some(7.1));

        let review = title.into_review("tt0000001");
        assert_eq!(review.tconst, "tt0000001");
        assert_eq!(review.source, "OMDB");
        assert_eq!(review.ratings.len(), 1);
        assert_eq!(review.ratings[0].value, "7.1/10");
    }

    #[test]
    fn parses_miss_response() {
        let json = r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#;
        let title: OmdbTitle = serde_json::from_str(json).unwrap();
        assert!(!title.is_found());
        assert!(title.ratings.is_empty());
        assert_eq!(title.error.as_deref(), Some("Incorrect IMDb ID."));
    }

    #[test]
    fn not_available_rating_is_absent() {
        let json = r#"{"Response": "True", "imdbRating": "N/A"}"#;
        let title: OmdbTitle = serde_json::from_str(json).unwrap();
        assert_eq!(title.normalized_rating(), None);
    }

    #[test]
    fn lookup_url_carries_key_and_id() {
        let client =
            OmdbClient::with_config("http://www.omdbapi.com/", "k3y", Duration::from_secs(5))
                .unwrap();
        let url = client.lookup_url("tt0111161").unwrap();
        assert_eq!(url.as_str(), "http://www.omdbapi.com/?apikey=k3y&i=tt0111161");
    }
}
