use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, Page, PageRequest, ResultEngine, Transaction, TransactionCmd,
    page::fetch_page,
    transactions::{self, into_transactions},
    util::{parse_uuid, validate_range},
};

use super::{Engine, contains_any, normalize_search, resolver, with_tx};

const SEARCH_COLUMNS: [&str; 4] = ["sr_no", "customer_name", "customer_phone", "agent_phone"];

fn transaction_sort_column(field: &str) -> Option<transactions::Column> {
    match field {
        "date" => Some(transactions::Column::Date),
        "inventoryType" => Some(transactions::Column::InventoryType),
        "vouchar_no" => Some(transactions::Column::VoucharNo),
        "sr_no" => Some(transactions::Column::SrNo),
        "name" => Some(transactions::Column::Name),
        "year" => Some(transactions::Column::Year),
        "quantity" => Some(transactions::Column::Quantity),
        "version" => Some(transactions::Column::Version),
        "createdAt" | "created_at" => Some(transactions::Column::CreatedAt),
        _ => None,
    }
}

fn sorted(
    select: Select<transactions::Entity>,
    request: &PageRequest,
) -> ResultEngine<Select<transactions::Entity>> {
    match &request.sort {
        Some(sort) => sort.apply(select, transaction_sort_column),
        None => Ok(select.order_by_asc(transactions::Column::CreatedAt)),
    }
}

impl Engine {
    /// Records an intake/delivery transaction.
    ///
    /// The customer is always resolved, the agent only when its payload
    /// carries a phone. Fails with `ExistingKey` if `vouchar_no` is taken and
    /// with `KeyNotFound` if the agent is not registered; in both cases
    /// nothing is written.
    pub async fn record_transaction(&self, cmd: &TransactionCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let taken = transactions::Entity::find()
                .filter(transactions::Column::VoucharNo.eq(cmd.vouchar_no))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(format!(
                    "vouchar_no {}",
                    cmd.vouchar_no
                )));
            }

            let (customer, agent) = resolver(&db_tx)
                .resolve_pair(&cmd.customer, cmd.agent.as_ref())
                .await?;
            let now = Utc::now();
            let tx = Transaction {
                id: Uuid::new_v4(),
                date: cmd.date,
                inventory_type: cmd.inventory_type,
                vouchar_no: cmd.vouchar_no,
                sr_no: cmd.sr_no.clone(),
                name: cmd.name.trim().to_string(),
                year: cmd.year,
                quantity: cmd.quantity,
                customer,
                agent,
                version: 1,
                created_at: now,
            };
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            info!(
                id = %tx.id,
                vouchar_no = tx.vouchar_no,
                sr_no = %tx.sr_no,
                "transaction recorded"
            );
            Ok(tx)
        })
    }

    /// Lists transactions, optionally filtered by a case-sensitive substring
    /// of `sr_no`, customer name, customer phone or agent phone.
    pub async fn transactions(
        &self,
        param: Option<&str>,
        request: &PageRequest,
    ) -> ResultEngine<Page<Transaction>> {
        let mut select = transactions::Entity::find();
        if let Some(needle) = normalize_search(param) {
            select = select.filter(contains_any(&SEARCH_COLUMNS, needle));
        }
        fetch_page(&self.database, sorted(select, request)?, request)
            .await?
            .try_map(into_transactions)
    }

    /// Lists transactions whose `date` falls in `[start, end]`.
    pub async fn transactions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        request: &PageRequest,
    ) -> ResultEngine<Page<Transaction>> {
        validate_range(start, end)?;
        let select =
            transactions::Entity::find().filter(transactions::Column::Date.between(start, end));
        fetch_page(&self.database, sorted(select, request)?, request)
            .await?
            .try_map(into_transactions)
    }

    /// Return a transaction by identity.
    pub async fn transaction(&self, id: &str) -> ResultEngine<Transaction> {
        self.require_transaction(&self.database, id).await
    }

    /// Rewrites a transaction from `cmd`, re-running party resolution.
    ///
    /// `cmd.vouchar_no` is ignored: the voucher number never changes.
    pub async fn update_transaction(
        &self,
        id: &str,
        cmd: &TransactionCmd,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let current = self.require_transaction(&db_tx, id).await?;
            let (customer, agent) = resolver(&db_tx)
                .resolve_pair(&cmd.customer, cmd.agent.as_ref())
                .await?;
            let tx = Transaction {
                date: cmd.date,
                inventory_type: cmd.inventory_type,
                sr_no: cmd.sr_no.clone(),
                name: cmd.name.trim().to_string(),
                year: cmd.year,
                quantity: cmd.quantity,
                customer,
                agent,
                version: current.version + 1,
                ..current
            };
            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            info!(id = %tx.id, version = tx.version, "transaction updated");
            Ok(tx)
        })
    }

    /// Removes a transaction and returns it.
    pub async fn delete_transaction(&self, id: &str) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let tx = self.require_transaction(&db_tx, id).await?;
            transactions::Entity::delete_by_id(tx.id.to_string())
                .exec(&db_tx)
                .await?;
            info!(id = %tx.id, vouchar_no = tx.vouchar_no, "transaction deleted");
            Ok(tx)
        })
    }

    async fn require_transaction<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> ResultEngine<Transaction> {
        let tx_id = parse_uuid(id, "transaction")?;
        let model = transactions::Entity::find_by_id(tx_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")))?;
        Transaction::try_from(model)
    }
}
