//! Command structs for engine operations.
//!
//! These are the typed request structures the engine accepts. The HTTP layer
//! converts request bodies into them after shape validation; the engine never
//! sees raw payloads.

use chrono::{DateTime, Utc};

use crate::{InventoryType, LedgerInputs};

/// A submitted party payload (customer or agent).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartyInput {
    pub name: String,
    pub father: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl PartyInput {
    #[must_use]
    pub fn new(name: impl Into<String>, father: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            father: father.into(),
            phone: None,
            address: None,
        }
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Returns the trimmed phone, or `None` if it is missing or blank.
    pub fn normalized_phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }

    /// Returns the trimmed address, or `None` if it is missing or blank.
    pub fn normalized_address(&self) -> Option<&str> {
        non_blank(self.address.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Create or update an intake/delivery transaction.
///
/// On update `vouchar_no` is ignored: the voucher number is fixed at
/// creation.
#[derive(Clone, Debug)]
pub struct TransactionCmd {
    pub date: DateTime<Utc>,
    pub inventory_type: InventoryType,
    pub vouchar_no: i64,
    pub sr_no: String,
    pub name: String,
    pub year: i32,
    pub quantity: f64,
    pub customer: PartyInput,
    pub agent: Option<PartyInput>,
}

impl TransactionCmd {
    #[must_use]
    pub fn new(
        vouchar_no: i64,
        sr_no: impl Into<String>,
        name: impl Into<String>,
        customer: PartyInput,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            inventory_type: InventoryType::default(),
            vouchar_no,
            sr_no: sr_no.into(),
            name: name.into(),
            year: 0,
            quantity: 0.0,
            customer,
            agent: None,
        }
    }

    #[must_use]
    pub fn inventory_type(mut self, inventory_type: InventoryType) -> Self {
        self.inventory_type = inventory_type;
        self
    }

    #[must_use]
    pub fn year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub fn agent(mut self, agent: PartyInput) -> Self {
        self.agent = Some(agent);
        self
    }
}

/// Create or update a ledger entry.
///
/// Only the raw numeric inputs are carried: derived amounts are always
/// recomputed and party data always comes from the referenced transaction.
/// `year` is only read on update; on create it is copied from the
/// transaction.
#[derive(Clone, Debug)]
pub struct LedgerCmd {
    pub sr_no: String,
    pub year: i32,
    pub inputs: LedgerInputs,
}

impl LedgerCmd {
    #[must_use]
    pub fn new(sr_no: impl Into<String>, year: i32, inputs: LedgerInputs) -> Self {
        Self {
            sr_no: sr_no.into(),
            year,
            inputs,
        }
    }
}

/// Create or update a storage chamber.
#[derive(Clone, Debug, PartialEq)]
pub struct ChamberInput {
    pub name: String,
    pub capacity: f64,
}

impl ChamberInput {
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: f64) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }
}
