pub mod movie;
pub mod person;
pub mod relations;
pub mod review;

/// Rows per INSERT statement. SQLite caps bound parameters at 999 on older
/// builds; with at most 8 columns, 100 rows stays well below it.
pub const INSERT_BATCH_SIZE: usize = 100;
