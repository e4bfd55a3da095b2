//! Storage chambers.
//!
//! A chamber is a named cold room with a capacity. Names are unique.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Chambers {
    Table,
    Id,
    Name,
    Slug,
    Capacity,
    Version,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Chambers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Chambers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Chambers::Name).string().not_null())
                    .col(ColumnDef::new(Chambers::Slug).string().not_null())
                    .col(ColumnDef::new(Chambers::Capacity).double().not_null())
                    .col(
                        ColumnDef::new(Chambers::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Chambers::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-chambers-name-unique")
                    .table(Chambers::Table)
                    .col(Chambers::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Chambers::Table).to_owned())
            .await
    }
}
