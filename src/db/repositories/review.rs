use crate::db::repositories::movie::MovieRepository;
use crate::entities::{prelude::*, reviews};
use crate::models::ReviewRecord;
use anyhow::Result;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

pub struct ReviewRepository {
    conn: DatabaseConnection,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Stores the review and flags its title as enriched in one transaction.
    pub async fn insert_and_flag(&self, review: &ReviewRecord) -> Result<()> {
        let ratings = serde_json::to_string(&review.ratings)?;

        let model = reviews::ActiveModel {
            id: NotSet,
            tconst: Set(review.tconst.clone()),
            title: Set(review.title.clone()),
            year: Set(review.year.clone()),
            plot: Set(review.plot.clone()),
            ratings: Set(ratings),
            imdb_rating: Set(review.imdb_rating),
            source: Set(review.source.clone()),
            fetched_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let txn = self.conn.begin().await?;
        Reviews::insert(model).exec(&txn).await?;
        MovieRepository::record_attempt(&txn, &review.tconst, true).await?;
        txn.commit().await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Reviews::find().count(&self.conn).await?)
    }

    pub async fn for_title(&self, tconst: &str) -> Result<Vec<reviews::Model>> {
        let rows = Reviews::find()
            .filter(reviews::Column::Tconst.eq(tconst))
            .order_by_asc(reviews::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}
