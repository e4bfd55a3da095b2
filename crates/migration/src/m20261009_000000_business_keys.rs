//! Hard uniqueness constraints on business keys.
//!
//! The engine checks these keys before writing, but two concurrent writers can
//! both pass the check. These indexes make the second write fail so it can be
//! reported as a conflict.

use sea_orm_migration::prelude::*;

use super::m20261002_000000_init::{LedgerEntries, Parties, Transactions};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-vouchar_no-unique")
                    .table(Transactions::Table)
                    .col(Transactions::VoucharNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // `sr_no` joins a transaction to its ledger entry.
        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-sr_no")
                    .table(Transactions::Table)
                    .col(Transactions::SrNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_entries-sr_no-unique")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::SrNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Customer and agent phones are separate uniqueness domains. NULL
        // phones do not collide, so phone-less customers are allowed.
        manager
            .create_index(
                Index::create()
                    .name("idx-parties-kind-phone-unique")
                    .table(Parties::Table)
                    .col(Parties::Kind)
                    .col(Parties::Phone)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-parties-kind-name-father")
                    .table(Parties::Table)
                    .col(Parties::Kind)
                    .col(Parties::Name)
                    .col(Parties::Father)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-parties-kind-name-father")
                    .table(Parties::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-parties-kind-phone-unique")
                    .table(Parties::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-ledger_entries-sr_no-unique")
                    .table(LedgerEntries::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-transactions-sr_no")
                    .table(Transactions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-transactions-vouchar_no-unique")
                    .table(Transactions::Table)
                    .to_owned(),
            )
            .await
    }
}
