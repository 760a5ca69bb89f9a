use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Movies::Tconst)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Movies::PrimaryTitle).string())
                    .col(ColumnDef::new(Movies::StartYear).integer())
                    .col(ColumnDef::new(Movies::Genres).string())
                    .col(ColumnDef::new(Movies::RuntimeMinutes).integer())
                    .col(ColumnDef::new(Movies::OmdbLoaded).boolean())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(People::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(People::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(People::Nconst)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(People::PrimaryName).string())
                    .col(ColumnDef::new(People::PrimaryProfession).string())
                    .col(ColumnDef::new(People::KnownForTitles).string())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(People::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Movies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Tconst,
    PrimaryTitle,
    StartYear,
    Genres,
    RuntimeMinutes,
    OmdbLoaded,
}

#[derive(DeriveIden)]
enum People {
    Table,
    Id,
    Nconst,
    PrimaryName,
    PrimaryProfession,
    KnownForTitles,
}
