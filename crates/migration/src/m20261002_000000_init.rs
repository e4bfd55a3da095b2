//! Initial schema migration.
//!
//! Creates the complete schema for coldstore:
//!
//! - `users`: authentication and roles
//! - `parties`: customer and agent registries, partitioned by `kind`
//! - `transactions`: intake/delivery records with embedded party snapshots
//! - `ledger_entries`: financial entries derived from a transaction
//!
//! Party snapshots are stored as prefixed columns (`customer_*`, `agent_*`)
//! on the owning row, never as a foreign key: they must survive edits and
//! deletes of the registry record they were copied from.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
}

#[derive(Iden)]
pub(crate) enum Parties {
    Table,
    Id,
    Kind,
    Name,
    Slug,
    Father,
    Phone,
    Address,
    Version,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum Transactions {
    Table,
    Id,
    Date,
    InventoryType,
    VoucharNo,
    SrNo,
    Name,
    Year,
    Quantity,
    Version,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum LedgerEntries {
    Table,
    Id,
    SrNo,
    Year,
    LoanAmount,
    LoanRate,
    LoanProfit,
    LoanPayable,
    Quantity,
    Rate,
    ServiceAmount,
    EmptyBagQuantity,
    EmptyBagRate,
    EmptyBagAmount,
    TotalAmount,
    Version,
    CreatedAt,
}

/// Adds the columns of an embedded party snapshot (`{prefix}_id`,
/// `{prefix}_name`, ...) to `table`.
fn snapshot_columns(table: &mut TableCreateStatement, prefix: &str, required: bool) {
    let column = |field: &str| Alias::new(format!("{prefix}_{field}"));
    let mut text = |field: &str| {
        let mut def = ColumnDef::new(column(field));
        def.string();
        if required {
            def.not_null();
        }
        table.col(&mut def);
    };
    text("id");
    text("name");
    text("slug");
    text("father");

    table.col(ColumnDef::new(column("phone")).string());
    table.col(ColumnDef::new(column("address")).string());
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("USER"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Party registries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Parties::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Parties::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Parties::Kind).string().not_null())
                    .col(ColumnDef::new(Parties::Name).string().not_null())
                    .col(ColumnDef::new(Parties::Slug).string().not_null())
                    .col(ColumnDef::new(Parties::Father).string().not_null())
                    .col(ColumnDef::new(Parties::Phone).string())
                    .col(ColumnDef::new(Parties::Address).string())
                    .col(
                        ColumnDef::new(Parties::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Parties::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Transactions
        // ───────────────────────────────────────────────────────────────────
        let mut transactions = Table::create();
        transactions
            .table(Transactions::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Transactions::Id)
                    .string()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(Transactions::Date).timestamp().not_null())
            .col(
                ColumnDef::new(Transactions::InventoryType)
                    .string()
                    .not_null()
                    .default("RECEIVE"),
            )
            .col(
                ColumnDef::new(Transactions::VoucharNo)
                    .big_integer()
                    .not_null(),
            )
            .col(ColumnDef::new(Transactions::SrNo).string().not_null())
            .col(ColumnDef::new(Transactions::Name).string().not_null())
            .col(ColumnDef::new(Transactions::Year).integer().not_null())
            .col(ColumnDef::new(Transactions::Quantity).double().not_null());
        snapshot_columns(&mut transactions, "customer", true);
        snapshot_columns(&mut transactions, "agent", false);
        transactions
            .col(
                ColumnDef::new(Transactions::Version)
                    .integer()
                    .not_null()
                    .default(1),
            )
            .col(
                ColumnDef::new(Transactions::CreatedAt)
                    .timestamp()
                    .not_null(),
            );
        manager.create_table(transactions.to_owned()).await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Ledger entries
        // ───────────────────────────────────────────────────────────────────
        let mut ledger_entries = Table::create();
        ledger_entries
            .table(LedgerEntries::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(LedgerEntries::Id)
                    .string()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(LedgerEntries::SrNo).string().not_null())
            .col(ColumnDef::new(LedgerEntries::Year).integer().not_null());
        snapshot_columns(&mut ledger_entries, "customer", true);
        snapshot_columns(&mut ledger_entries, "agent", false);
        for amount in [
            LedgerEntries::LoanAmount,
            LedgerEntries::LoanRate,
            LedgerEntries::LoanProfit,
            LedgerEntries::LoanPayable,
            LedgerEntries::Quantity,
            LedgerEntries::Rate,
            LedgerEntries::ServiceAmount,
            LedgerEntries::EmptyBagQuantity,
            LedgerEntries::EmptyBagRate,
            LedgerEntries::EmptyBagAmount,
            LedgerEntries::TotalAmount,
        ] {
            ledger_entries.col(ColumnDef::new(amount).double().not_null().default(0.0));
        }
        ledger_entries
            .col(
                ColumnDef::new(LedgerEntries::Version)
                    .integer()
                    .not_null()
                    .default(1),
            )
            .col(
                ColumnDef::new(LedgerEntries::CreatedAt)
                    .timestamp()
                    .not_null(),
            );
        manager.create_table(ledger_entries.to_owned()).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parties::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
