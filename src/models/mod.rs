pub mod person;
pub mod review;
pub mod title;

pub use person::PersonRecord;
pub use review::{RatingEntry, ReviewRecord};
pub use title::TitleRecord;
