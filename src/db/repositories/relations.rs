//! Title ↔ person joins over the comma-joined `known_for_titles` column.

use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement};
use serde::{Deserialize, Serialize};

/// How a title id is matched against a person's known-for list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationMatch {
    /// Id appears anywhere in the raw string, so `tt123` also hits `tt1234`.
    Substring,
    /// Id equals one of the comma-separated entries.
    #[default]
    Membership,
}

impl RelationMatch {
    /// SQL predicate over `p.known_for_titles` for the title id `id_expr`.
    #[must_use]
    pub fn condition(self, id_expr: &str) -> String {
        match self {
            Self::Substring => format!("instr(p.known_for_titles, {id_expr}) > 0"),
            Self::Membership => format!(
                "instr(',' || p.known_for_titles || ',', ',' || {id_expr} || ',') > 0"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct RelatedPerson {
    pub nconst: String,
    pub primary_name: Option<String>,
    pub primary_profession: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct RelatedCountRow {
    pub tconst: String,
    pub primary_title: Option<String>,
    pub related_people_count: i64,
}

/// One row of the title to person left join. Person columns are absent for
/// titles nobody references.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct MoviePersonRow {
    pub tconst: String,
    pub primary_title: Option<String>,
    pub start_year: Option<i32>,
    pub genres: Option<String>,
    pub runtime_minutes: Option<i32>,
    pub omdb_loaded: Option<bool>,
    pub nconst: Option<String>,
    pub primary_name: Option<String>,
    pub primary_profession: Option<String>,
}

impl MoviePersonRow {
    #[must_use]
    pub fn person(&self) -> Option<RelatedPerson> {
        Some(RelatedPerson {
            nconst: self.nconst.clone()?,
            primary_name: self.primary_name.clone(),
            primary_profession: self.primary_profession.clone(),
        })
    }
}

pub struct RelationRepository {
    conn: DatabaseConnection,
}

impl RelationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn related_people(
        &self,
        tconst: &str,
        strategy: RelationMatch,
    ) -> Result<Vec<RelatedPerson>> {
        let sql = format!(
            "SELECT p.nconst, p.primary_name, p.primary_profession \
             FROM people p WHERE {} ORDER BY p.id",
            strategy.condition("?")
        );
        let stmt = Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            sql,
            [tconst.into()],
        );

        Ok(RelatedPerson::find_by_statement(stmt)
            .all(&self.conn)
            .await?)
    }

    /// The first `limit` titles in load order left-joined with their related
    /// people, ordered by title then person load order.
    pub async fn movies_with_people(
        &self,
        strategy: RelationMatch,
        limit: u64,
    ) -> Result<Vec<MoviePersonRow>> {
        let sql = format!(
            "SELECT m.tconst, m.primary_title, m.start_year, m.genres, m.runtime_minutes, \
             m.omdb_loaded, p.nconst, p.primary_name, p.primary_profession \
             FROM (SELECT * FROM movies ORDER BY id LIMIT ?) m \
             LEFT JOIN people p ON {} \
             ORDER BY m.id, p.id",
            strategy.condition("m.tconst")
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let stmt =
            Statement::from_sql_and_values(self.conn.get_database_backend(), sql, [limit.into()]);

        Ok(MoviePersonRow::find_by_statement(stmt)
            .all(&self.conn)
            .await?)
    }

    /// Related-person count for the first `limit` titles in load order.
    pub async fn related_counts(
        &self,
        strategy: RelationMatch,
        limit: u64,
    ) -> Result<Vec<RelatedCountRow>> {
        let sql = format!(
            "SELECT m.tconst, m.primary_title, \
             (SELECT COUNT(*) FROM people p WHERE {}) AS related_people_count \
             FROM movies m ORDER BY m.id LIMIT ?",
            strategy.condition("m.tconst")
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let stmt =
            Statement::from_sql_and_values(self.conn.get_database_backend(), sql, [limit.into()]);

        Ok(RelatedCountRow::find_by_statement(stmt)
            .all(&self.conn)
            .await?)
    }
}
