use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::Tconst).string().not_null())
                    .col(ColumnDef::new(Reviews::Title).string())
                    .col(ColumnDef::new(Reviews::Year).string())
                    .col(ColumnDef::new(Reviews::Plot).text())
                    .col(
                        ColumnDef::new(Reviews::Ratings)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Reviews::ImdbRating).double())
                    .col(ColumnDef::new(Reviews::Source).string().not_null())
                    .col(ColumnDef::new(Reviews::FetchedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_tconst")
                    .table(Reviews::Table)
                    .col(Reviews::Tconst)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    Tconst,
    Title,
    Year,
    Plot,
    Ratings,
    ImdbRating,
    Source,
    FetchedAt,
}
