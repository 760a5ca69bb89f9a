use serde::Serialize;

use crate::dataset::Row;

/// Columns kept from `name.basics.tsv`.
pub const PERSON_COLUMNS: &[&str] = &[
    "nconst",
    "primaryName",
    "primaryProfession",
    "knownForTitles",
];

pub const PERSON_KEY_COLUMN: &str = "nconst";

/// Multi-valued column linking a person to title ids.
pub const KNOWN_FOR_COLUMN: &str = "knownForTitles";

pub const LIST_SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRecord {
    pub nconst: String,
    pub primary_name: Option<String>,
    pub primary_profession: Option<String>,
    pub known_for_titles: Option<String>,
}

impl PersonRecord {
    #[must_use]
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            nconst: row.get(PERSON_KEY_COLUMN)?.to_string(),
            primary_name: row.get("primaryName").map(str::to_string),
            primary_profession: row.get("primaryProfession").map(str::to_string),
            known_for_titles: row.get(KNOWN_FOR_COLUMN).map(str::to_string),
        })
    }
}
