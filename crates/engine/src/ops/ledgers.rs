use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, LedgerCmd, LedgerEntry, Page, PageRequest, ResultEngine, Transaction,
    ledger::{self, into_entries},
    page::fetch_page,
    transactions,
    util::{parse_uuid, validate_range},
};

use super::{Engine, contains_any, normalize_search, with_tx};

const SEARCH_COLUMNS: [&str; 4] = ["sr_no", "customer_name", "customer_phone", "agent_phone"];

fn ledger_sort_column(field: &str) -> Option<ledger::Column> {
    match field {
        "sr_no" => Some(ledger::Column::SrNo),
        "year" => Some(ledger::Column::Year),
        "loan_amount" => Some(ledger::Column::LoanAmount),
        "loan_payable" => Some(ledger::Column::LoanPayable),
        "quantity" => Some(ledger::Column::Quantity),
        "service_amount" => Some(ledger::Column::ServiceAmount),
        "total_amount" => Some(ledger::Column::TotalAmount),
        "version" => Some(ledger::Column::Version),
        "createdAt" | "created_at" => Some(ledger::Column::CreatedAt),
        _ => None,
    }
}

fn sorted(
    select: Select<ledger::Entity>,
    request: &PageRequest,
) -> ResultEngine<Select<ledger::Entity>> {
    match &request.sort {
        Some(sort) => sort.apply(select, ledger_sort_column),
        None => Ok(select.order_by_asc(ledger::Column::CreatedAt)),
    }
}

impl Engine {
    /// Creates the ledger entry of the transaction with `cmd.sr_no`.
    ///
    /// `year` and both party snapshots are copied from the transaction;
    /// `cmd.year` is not read. When several transactions share the serial
    /// number the earliest recorded one is used.
    pub async fn new_ledger_entry(&self, cmd: &LedgerCmd) -> ResultEngine<LedgerEntry> {
        let amounts = cmd.inputs.derive()?;
        with_tx!(self, |db_tx| {
            let taken = ledger::Entity::find()
                .filter(ledger::Column::SrNo.eq(cmd.sr_no.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(format!("sr_no {}", cmd.sr_no)));
            }

            let source = transactions::Entity::find()
                .filter(transactions::Column::SrNo.eq(cmd.sr_no.as_str()))
                .order_by_asc(transactions::Column::CreatedAt)
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound(format!("transaction sr_no {}", cmd.sr_no))
                })?;
            let source = Transaction::try_from(source)?;

            let entry = LedgerEntry {
                id: Uuid::new_v4(),
                sr_no: source.sr_no,
                year: source.year,
                customer: source.customer,
                agent: source.agent,
                inputs: cmd.inputs,
                amounts,
                version: 1,
                created_at: Utc::now(),
            };
            ledger::ActiveModel::from(&entry).insert(&db_tx).await?;
            info!(
                id = %entry.id,
                sr_no = %entry.sr_no,
                total = entry.amounts.total_amount,
                "ledger entry created"
            );
            Ok(entry)
        })
    }

    /// Lists ledger entries, optionally filtered by a case-sensitive
    /// substring of `sr_no`, customer name, customer phone or agent phone.
    pub async fn ledger_entries(
        &self,
        param: Option<&str>,
        request: &PageRequest,
    ) -> ResultEngine<Page<LedgerEntry>> {
        let mut select = ledger::Entity::find();
        if let Some(needle) = normalize_search(param) {
            select = select.filter(contains_any(&SEARCH_COLUMNS, needle));
        }
        fetch_page(&self.database, sorted(select, request)?, request)
            .await?
            .try_map(into_entries)
    }

    /// Lists ledger entries created in `[start, end]`.
    pub async fn ledger_entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        request: &PageRequest,
    ) -> ResultEngine<Page<LedgerEntry>> {
        validate_range(start, end)?;
        let select = ledger::Entity::find().filter(ledger::Column::CreatedAt.between(start, end));
        fetch_page(&self.database, sorted(select, request)?, request)
            .await?
            .try_map(into_entries)
    }

    /// Return a ledger entry by identity.
    pub async fn ledger_entry(&self, id: &str) -> ResultEngine<LedgerEntry> {
        self.require_ledger_entry(&self.database, id).await
    }

    /// Replaces the numeric inputs of an entry and recomputes its amounts.
    ///
    /// `cmd.sr_no` must equal the stored serial number, otherwise the call
    /// fails with `Forbidden` and nothing changes. Party snapshots are never
    /// touched.
    pub async fn update_ledger_entry(
        &self,
        id: &str,
        cmd: &LedgerCmd,
    ) -> ResultEngine<LedgerEntry> {
        with_tx!(self, |db_tx| {
            let mut entry = self.require_ledger_entry(&db_tx, id).await?;
            if entry.sr_no != cmd.sr_no {
                return Err(EngineError::Forbidden(format!(
                    "sr_no {} does not match {}",
                    cmd.sr_no, entry.sr_no
                )));
            }

            entry.apply(cmd.inputs)?;
            entry.year = cmd.year;
            entry.version += 1;
            ledger::ActiveModel::from(&entry).update(&db_tx).await?;
            info!(id = %entry.id, version = entry.version, "ledger entry updated");
            Ok(entry)
        })
    }

    /// Removes a ledger entry and returns it.
    pub async fn delete_ledger_entry(&self, id: &str) -> ResultEngine<LedgerEntry> {
        with_tx!(self, |db_tx| {
            let entry = self.require_ledger_entry(&db_tx, id).await?;
            ledger::Entity::delete_by_id(entry.id.to_string())
                .exec(&db_tx)
                .await?;
            info!(id = %entry.id, sr_no = %entry.sr_no, "ledger entry deleted");
            Ok(entry)
        })
    }

    async fn require_ledger_entry<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> ResultEngine<LedgerEntry> {
        let entry_id = parse_uuid(id, "ledger")?;
        let model = ledger::Entity::find_by_id(entry_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("ledger {id}")))?;
        LedgerEntry::try_from(model)
    }
}
