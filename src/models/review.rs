use serde::{Deserialize, Serialize};

/// Provenance tag stored on every review.
pub const OMDB_SOURCE: &str = "OMDB";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingEntry {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRecord {
    pub tconst: String,
    pub title: Option<String>,
    pub year: Option<String>,
    pub plot: Option<String>,
    pub ratings: Vec<RatingEntry>,
    pub imdb_rating: Option<f64>,
    pub source: String,
}
