//! Read-only diagnostics over the loaded collections.

use anyhow::Result;
use serde::Serialize;
use tracing::instrument;

use crate::db::{MoviePersonRow, Store};
use crate::entities::{movies, people};

pub use crate::db::{RelatedCountRow, RelatedPerson, RelationMatch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionCounts {
    pub movies: u64,
    pub people: u64,
    pub reviews: u64,
    pub enriched_movies: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieSummary {
    pub tconst: String,
    pub primary_title: Option<String>,
    pub start_year: Option<i32>,
    pub genres: Option<String>,
    pub runtime_minutes: Option<i32>,
    pub omdb_loaded: Option<bool>,
}

impl From<movies::Model> for MovieSummary {
    fn from(model: movies::Model) -> Self {
        Self {
            tconst: model.tconst,
            primary_title: model.primary_title,
            start_year: model.start_year,
            genres: model.genres,
            runtime_minutes: model.runtime_minutes,
            omdb_loaded: model.omdb_loaded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonSummary {
    pub nconst: String,
    pub primary_name: Option<String>,
    pub primary_profession: Option<String>,
    pub known_for_titles: Option<String>,
}

impl From<people::Model> for PersonSummary {
    fn from(model: people::Model) -> Self {
        Self {
            nconst: model.nconst,
            primary_name: model.primary_name,
            primary_profession: model.primary_profession,
            known_for_titles: model.known_for_titles,
        }
    }
}

/// A title with the people whose known-for list references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieWithPeople {
    pub movie: MovieSummary,
    pub related_people: Vec<RelatedPerson>,
}

pub struct ExplorationService {
    store: Store,
}

impl ExplorationService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn counts(&self) -> Result<CollectionCounts> {
        Ok(CollectionCounts {
            movies: self.store.count_movies().await?,
            people: self.store.count_people().await?,
            reviews: self.store.count_reviews().await?,
            enriched_movies: self.store.count_enriched_movies().await?,
        })
    }

    pub async fn sample_movies(&self, limit: u64) -> Result<Vec<MovieSummary>> {
        let rows = self.store.first_movies(limit).await?;
        Ok(rows.into_iter().map(MovieSummary::from).collect())
    }

    pub async fn sample_people(&self, limit: u64) -> Result<Vec<PersonSummary>> {
        let rows = self.store.first_people(limit).await?;
        Ok(rows.into_iter().map(PersonSummary::from).collect())
    }

    /// People related to the first stored title, or `None` when no titles exist.
    #[instrument(skip(self))]
    pub async fn sample_relationship(
        &self,
        strategy: RelationMatch,
    ) -> Result<Option<MovieWithPeople>> {
        let Some(first) = self.store.first_movies(1).await?.into_iter().next() else {
            return Ok(None);
        };

        let related_people = self.store.related_people(&first.tconst, strategy).await?;
        Ok(Some(MovieWithPeople {
            movie: first.into(),
            related_people,
        }))
    }

    /// One-to-many title to person join over the first `limit` titles.
    #[instrument(skip(self))]
    pub async fn movies_with_people(
        &self,
        strategy: RelationMatch,
        limit: u64,
    ) -> Result<Vec<MovieWithPeople>> {
        let rows = self.store.movies_with_people(strategy, limit).await?;
        Ok(group_by_movie(rows))
    }

    pub async fn relationship_counts(
        &self,
        strategy: RelationMatch,
        limit: u64,
    ) -> Result<Vec<RelatedCountRow>> {
        self.store.related_people_counts(strategy, limit).await
    }
}

/// Folds join rows, already ordered by title, into one entry per title.
fn group_by_movie(rows: Vec<MoviePersonRow>) -> Vec<MovieWithPeople> {
    let mut joined: Vec<MovieWithPeople> = Vec::new();

    for row in rows {
        let person = row.person();

        if let Some(last) = joined.last_mut()
            && last.movie.tconst == row.tconst
        {
            last.related_people.extend(person);
            continue;
        }

        joined.push(MovieWithPeople {
            movie: MovieSummary {
                tconst: row.tconst,
                primary_title: row.primary_title,
                start_year: row.start_year,
                genres: row.genres,
                runtime_minutes: row.runtime_minutes,
                omdb_loaded: row.omdb_loaded,
            },
            related_people: person.into_iter().collect(),
        });
    }

    joined
}
