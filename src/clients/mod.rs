pub mod datasets;
pub mod omdb;
