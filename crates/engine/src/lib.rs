//! Coldstore domain engine.
//!
//! The engine keeps the party registries (customers and agents), records
//! intake/delivery transactions against resolved parties and derives ledger
//! entries from them. All state lives in the database behind [`Engine`].

pub use chambers::Chamber;
pub use commands::{ChamberInput, LedgerCmd, PartyInput, TransactionCmd};
pub use error::EngineError;
pub use ledger::{LedgerAmounts, LedgerEntry, LedgerInputs};
pub use ops::{Engine, EngineBuilder};
pub use page::{DEFAULT_LIMIT, MAX_LIMIT, Page, PageRequest, RANGE_LIMIT, Sort};
pub use parties::{Party, PartyKind, slugify};
pub use snapshot::PartySnapshot;
pub use transactions::{InventoryType, Transaction};

mod chambers;
mod commands;
mod error;
mod ledger;
mod ops;
mod page;
mod parties;
mod registry;
mod resolver;
mod snapshot;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
