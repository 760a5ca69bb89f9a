use crate::db::repositories::INSERT_BATCH_SIZE;
use crate::entities::{people, prelude::*};
use crate::models::PersonRecord;
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::NotSet, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};

pub struct PersonRepository {
    conn: DatabaseConnection,
}

impl PersonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn insert_many(&self, people: &[PersonRecord]) -> Result<u64> {
        if people.is_empty() {
            return Ok(0);
        }

        let txn = self.conn.begin().await?;
        let mut inserted = 0;
        for chunk in people.chunks(INSERT_BATCH_SIZE) {
            let models = chunk.iter().map(|p| people::ActiveModel {
                id: NotSet,
                nconst: Set(p.nconst.clone()),
                primary_name: Set(p.primary_name.clone()),
                primary_profession: Set(p.primary_profession.clone()),
                known_for_titles: Set(p.known_for_titles.clone()),
            });

            inserted += People::insert_many(models)
                .on_conflict(
                    OnConflict::column(people::Column::Nconst)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(inserted)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(People::find().count(&self.conn).await?)
    }

    pub async fn first(&self, limit: u64) -> Result<Vec<people::Model>> {
        let rows = People::find()
            .order_by_asc(people::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}
