pub mod prelude;

pub mod movies;
pub mod people;
pub mod reviews;
