//! Row predicates applied by the bulk loader.

use crate::dataset::Row;

/// Decides whether a primary-dataset row is kept.
pub trait RowFilter: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    fn keep(&self, row: &Row) -> bool;
}

/// Keeps every row.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl RowFilter for AcceptAll {
    fn name(&self) -> &str {
        "accept_all"
    }

    fn keep(&self, _row: &Row) -> bool {
        true
    }
}

/// Keeps rows whose year column is at least `min_year`.
///
/// Missing or unparsable years are replaced by `missing_as` before comparing,
/// which is 0 by default so such rows fail any realistic threshold.
#[derive(Debug, Clone)]
pub struct MinYearFilter {
    column: String,
    min_year: i32,
    missing_as: i32,
}

impl MinYearFilter {
    #[must_use]
    pub fn new(column: impl Into<String>, min_year: i32) -> Self {
        Self {
            column: column.into(),
            min_year,
            missing_as: 0,
        }
    }

    /// `startYear >= min_year`, the filter used for `title.basics`.
    #[must_use]
    pub fn start_year(min_year: i32) -> Self {
        Self::new("startYear", min_year)
    }

    #[must_use]
    pub const fn with_missing_as(mut self, year: i32) -> Self {
        self.missing_as = year;
        self
    }
}

impl RowFilter for MinYearFilter {
    fn name(&self) -> &str {
        "min_year"
    }

    fn keep(&self, row: &Row) -> bool {
        row.get_i32(&self.column).unwrap_or(self.missing_as) >= self.min_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year_row(year: Option<&str>) -> Row {
        Row::from_pairs(&[("tconst", Some("tt1")), ("startYear", year)])
    }

    #[test]
    fn min_year_compares_inclusively() {
        let filter = MinYearFilter::start_year(2000);
        assert!(filter.keep(&year_row(Some("2000"))));
        assert!(filter.keep(&year_row(Some("2024"))));
        assert!(!filter.keep(&year_row(Some("1999"))));
    }

    #[test]
    fn missing_and_malformed_years_fall_back() {
        let filter = MinYearFilter::start_year(2000);
        assert!(!filter.keep(&year_row(None)));
        assert!(!filter.keep(&year_row(Some("unknown"))));

        let lenient = MinYearFilter::start_year(2000).with_missing_as(i32::MAX);
        assert!(lenient.keep(&year_row(None)));
    }

    #[test]
    fn accept_all_keeps_everything() {
        assert!(AcceptAll.keep(&year_row(None)));
    }
}
