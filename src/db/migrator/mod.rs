use sea_orm_migration::prelude::*;

mod m20241104_create_movies_and_people;
mod m20241109_add_reviews;
mod m20241118_add_omdb_attempts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241104_create_movies_and_people::Migration),
            Box::new(m20241109_add_reviews::Migration),
            Box::new(m20241118_add_omdb_attempts::Migration),
        ]
    }
}
