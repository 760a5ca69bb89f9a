use serde::Serialize;

use crate::dataset::Row;

/// Columns kept from `title.basics.tsv`.
pub const TITLE_COLUMNS: &[&str] = &[
    "tconst",
    "primaryTitle",
    "startYear",
    "genres",
    "runtimeMinutes",
];

pub const TITLE_KEY_COLUMN: &str = "tconst";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleRecord {
    pub tconst: String,
    pub primary_title: Option<String>,
    pub start_year: Option<i32>,
    pub genres: Option<String>,
    pub runtime_minutes: Option<i32>,
}

impl TitleRecord {
    /// Returns `None` when the row has no title id.
    #[must_use]
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            tconst: row.get(TITLE_KEY_COLUMN)?.to_string(),
            primary_title: row.get("primaryTitle").map(str::to_string),
            start_year: row.get_i32("startYear"),
            genres: row.get("genres").map(str::to_string),
            runtime_minutes: row.get_i32("runtimeMinutes"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_row_maps_columns() {
        let row = Row::from_pairs(&[
            ("tconst", Some("tt0120737")),
            ("primaryTitle", Some("The Fellowship of the Ring")),
            ("startYear", Some("2001")),
            ("genres", Some("Action,Adventure,Drama")),
            ("runtimeMinutes", Some("abc")),
        ]);

        let title = TitleRecord::from_row(&row).unwrap();
        assert_eq!(title.tconst, "tt0120737");
        assert_eq!(title.start_year, Some(2001));
        assert_eq!(title.runtime_minutes, None);
        assert_eq!(title.genres.as_deref(), Some("Action,Adventure,Drama"));
    }

    #[test]
    fn from_row_requires_key() {
        let row = Row::from_pairs(&[("tconst", None), ("primaryTitle", Some("Nameless"))]);
        assert!(TitleRecord::from_row(&row).is_none());
    }
}
