use sea_orm::{Condition, ConnectionTrait, DatabaseConnection, sea_query::Expr};

use crate::{
    PartyKind, ResultEngine,
    registry::PartyRegistry,
    resolver::PartyResolver,
};

mod chambers;
mod ledgers;
mod parties;
mod transactions;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// A resolver over both registries, bound to `conn`.
fn resolver<C: ConnectionTrait>(conn: &C) -> PartyResolver<PartyRegistry<'_, C>> {
    PartyResolver::new(
        PartyRegistry::new(conn, PartyKind::Customer),
        PartyRegistry::new(conn, PartyKind::Agent),
    )
}

/// Case-sensitive substring match of `needle` against any of `columns`.
///
/// `instr` is used instead of `LIKE`, which ignores ASCII case in SQLite.
fn contains_any(columns: &[&str], needle: &str) -> Condition {
    columns.iter().fold(Condition::any(), |cond, column| {
        cond.add(Expr::cust_with_values(
            format!("instr({column}, ?) > 0"),
            [needle.to_string()],
        ))
    })
}

fn normalize_search(param: Option<&str>) -> Option<&str> {
    param.map(str::trim).filter(|s| !s.is_empty())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
