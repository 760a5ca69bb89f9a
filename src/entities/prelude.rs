pub use super::movies::Entity as Movies;
pub use super::people::Entity as People;
pub use super::reviews::Entity as Reviews;
