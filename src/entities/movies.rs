use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub tconst: String,
    pub primary_title: Option<String>,
    pub start_year: Option<i32>,
    pub genres: Option<String>,
    pub runtime_minutes: Option<i32>,
    /// Absent until the first OMDb lookup, then true on a hit and false on a miss.
    pub omdb_loaded: Option<bool>,
    pub omdb_attempts: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
