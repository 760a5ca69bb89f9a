use crate::db::repositories::INSERT_BATCH_SIZE;
use crate::entities::{movies, prelude::*};
use crate::models::TitleRecord;
use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn to_active_model(title: &TitleRecord) -> movies::ActiveModel {
        movies::ActiveModel {
            id: NotSet,
            tconst: Set(title.tconst.clone()),
            primary_title: Set(title.primary_title.clone()),
            start_year: Set(title.start_year),
            genres: Set(title.genres.clone()),
            runtime_minutes: Set(title.runtime_minutes),
            omdb_loaded: Set(None),
            omdb_attempts: Set(0),
        }
    }

    /// Inserts all titles in one transaction. Ids already stored are skipped.
    pub async fn insert_many(&self, titles: &[TitleRecord]) -> Result<u64> {
        if titles.is_empty() {
            return Ok(0);
        }

        let txn = self.conn.begin().await?;
        let mut inserted = 0;
        for chunk in titles.chunks(INSERT_BATCH_SIZE) {
            inserted += Movies::insert_many(chunk.iter().map(Self::to_active_model))
                .on_conflict(
                    OnConflict::column(movies::Column::Tconst)
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
        Ok(Movies::find().count(&self.conn).await?)
    }

    pub async fn count_enriched(&self) -> Result<u64> {
        let count = Movies::find()
            .filter(movies::Column::OmdbLoaded.eq(true))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn get(&self, tconst: &str) -> Result<Option<movies::Model>> {
        let model = Movies::find()
            .filter(movies::Column::Tconst.eq(tconst))
            .one(&self.conn)
            .await?;
        Ok(model)
    }

    /// First `limit` titles in load order.
    pub async fn first(&self, limit: u64) -> Result<Vec<movies::Model>> {
        let rows = Movies::find()
            .order_by_asc(movies::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    /// Ids of titles never enriched or whose last lookup missed.
    ///
    /// With `max_attempts > 0`, titles OMDb already answered "not found" for
    /// that many times are left out.
    pub async fn pending_enrichment(&self, limit: u64, max_attempts: i32) -> Result<Vec<String>> {
        let mut query = Movies::find()
            .select_only()
            .column(movies::Column::Tconst)
            .filter(
                Condition::any()
                    .add(movies::Column::OmdbLoaded.is_null())
                    .add(movies::Column::OmdbLoaded.eq(false)),
            );

        if max_attempts > 0 {
            query = query.filter(movies::Column::OmdbAttempts.lt(max_attempts));
        }

        let ids = query
            .order_by_asc(movies::Column::Id)
            .limit(limit)
            .into_tuple::<String>()
            .all(&self.conn)
            .await?;
        Ok(ids)
    }

    /// Sets the enrichment flag and counts one answered lookup.
    pub async fn record_attempt<C: ConnectionTrait>(
        conn: &C,
        tconst: &str,
        loaded: bool,
    ) -> Result<u64> {
        let result = Movies::update_many()
            .col_expr(movies::Column::OmdbLoaded, Expr::value(loaded))
            .col_expr(
                movies::Column::OmdbAttempts,
                Expr::col(movies::Column::OmdbAttempts).add(1),
            )
            .filter(movies::Column::Tconst.eq(tconst))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn set_answered(&self, tconst: &str, loaded: bool) -> Result<u64> {
        Self::record_attempt(&self.conn, tconst, loaded).await
    }

    /// Sets the enrichment flag only. The attempt counter is left alone.
    pub async fn set_loaded(&self, tconst: &str, loaded: bool) -> Result<u64> {
        let result = Movies::update_many()
            .col_expr(movies::Column::OmdbLoaded, Expr::value(loaded))
            .filter(movies::Column::Tconst.eq(tconst))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
