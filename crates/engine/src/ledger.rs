//! Ledger primitives.
//!
//! A `LedgerEntry` is the financial side of a transaction, joined to it by
//! `sr_no`. Clients submit raw inputs only; every derived amount is computed
//! by [`LedgerInputs::derive`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, PartySnapshot, ResultEngine,
    snapshot::{SnapshotColumns, optional_snapshot},
    util::parse_uuid,
};

/// Raw numeric inputs of a ledger entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerInputs {
    pub loan_amount: f64,
    pub loan_rate: f64,
    pub quantity: f64,
    pub rate: f64,
    pub empty_bag_quantity: f64,
    pub empty_bag_rate: f64,
}

/// Amounts computed from [`LedgerInputs`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerAmounts {
    pub loan_profit: f64,
    pub loan_payable: f64,
    pub service_amount: f64,
    pub empty_bag_amount: f64,
    pub total_amount: f64,
}

impl LedgerInputs {
    /// Computes the derived amounts.
    ///
    /// Fails with [`EngineError::InvalidInput`] when an input or a result is
    /// not a finite number, since such an amount cannot be stored or sent.
    pub fn derive(&self) -> ResultEngine<LedgerAmounts> {
        let loan_profit = self.loan_amount * self.loan_rate / 100.0;
        let loan_payable = loan_profit + self.loan_amount;
        let service_amount = self.quantity * self.rate;
        let empty_bag_amount = self.empty_bag_quantity * self.empty_bag_rate;
        let amounts = LedgerAmounts {
            loan_profit,
            loan_payable,
            service_amount,
            empty_bag_amount,
            total_amount: loan_payable + empty_bag_amount + service_amount,
        };
        let values = [
            ("loan_profit", amounts.loan_profit),
            ("loan_payable", amounts.loan_payable),
            ("service_amount", amounts.service_amount),
            ("empty_bag_amount", amounts.empty_bag_amount),
            ("total_amount", amounts.total_amount),
        ];
        match values.iter().find(|(_, value)| !value.is_finite()) {
            Some((field, _)) => Err(EngineError::InvalidInput(format!(
                "{field} is out of range"
            ))),
            None => Ok(amounts),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub sr_no: String,
    pub year: i32,
    pub customer: PartySnapshot,
    pub agent: Option<PartySnapshot>,
    pub inputs: LedgerInputs,
    pub amounts: LedgerAmounts,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Replaces the inputs and recomputes every derived amount.
    pub(crate) fn apply(&mut self, inputs: LedgerInputs) -> ResultEngine<()> {
        self.amounts = inputs.derive()?;
        self.inputs = inputs;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sr_no: String,
    pub year: i32,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_slug: String,
    pub customer_father: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub agent_id: Option<String>,
    pub agent_name: Option<String>,
    pub agent_slug: Option<String>,
    pub agent_father: Option<String>,
    pub agent_phone: Option<String>,
    pub agent_address: Option<String>,
    pub loan_amount: f64,
    pub loan_rate: f64,
    pub loan_profit: f64,
    pub loan_payable: f64,
    pub quantity: f64,
    pub rate: f64,
    pub service_amount: f64,
    pub empty_bag_quantity: f64,
    pub empty_bag_rate: f64,
    pub empty_bag_amount: f64,
    pub total_amount: f64,
    pub version: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        let customer = SnapshotColumns::from(&entry.customer);
        let agent = entry.agent.as_ref().map(SnapshotColumns::from);
        let LedgerInputs {
            loan_amount,
            loan_rate,
            quantity,
            rate,
            empty_bag_quantity,
            empty_bag_rate,
        } = entry.inputs;
        let LedgerAmounts {
            loan_profit,
            loan_payable,
            service_amount,
            empty_bag_amount,
            total_amount,
        } = entry.amounts;

        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            sr_no: ActiveValue::Set(entry.sr_no.clone()),
            year: ActiveValue::Set(entry.year),
            customer_id: ActiveValue::Set(customer.id),
            customer_name: ActiveValue::Set(customer.name),
            customer_slug: ActiveValue::Set(customer.slug),
            customer_father: ActiveValue::Set(customer.father),
            customer_phone: ActiveValue::Set(customer.phone),
            customer_address: ActiveValue::Set(customer.address),
            agent_id: ActiveValue::Set(agent.as_ref().map(|a| a.id.clone())),
            agent_name: ActiveValue::Set(agent.as_ref().map(|a| a.name.clone())),
            agent_slug: ActiveValue::Set(agent.as_ref().map(|a| a.slug.clone())),
            agent_father: ActiveValue::Set(agent.as_ref().map(|a| a.father.clone())),
            agent_phone: ActiveValue::Set(agent.as_ref().and_then(|a| a.phone.clone())),
            agent_address: ActiveValue::Set(agent.as_ref().and_then(|a| a.address.clone())),
            loan_amount: ActiveValue::Set(loan_amount),
            loan_rate: ActiveValue::Set(loan_rate),
            loan_profit: ActiveValue::Set(loan_profit),
            loan_payable: ActiveValue::Set(loan_payable),
            quantity: ActiveValue::Set(quantity),
            rate: ActiveValue::Set(rate),
            service_amount: ActiveValue::Set(service_amount),
            empty_bag_quantity: ActiveValue::Set(empty_bag_quantity),
            empty_bag_rate: ActiveValue::Set(empty_bag_rate),
            empty_bag_amount: ActiveValue::Set(empty_bag_amount),
            total_amount: ActiveValue::Set(total_amount),
            version: ActiveValue::Set(entry.version),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let customer = PartySnapshot::try_from(SnapshotColumns {
            id: model.customer_id,
            name: model.customer_name,
            slug: model.customer_slug,
            father: model.customer_father,
            phone: model.customer_phone,
            address: model.customer_address,
        })?;
        let agent = optional_snapshot(
            model.agent_id,
            model.agent_name,
            model.agent_slug,
            model.agent_father,
            model.agent_phone,
            model.agent_address,
        )?;

        Ok(Self {
            id: parse_uuid(&model.id, "ledger")?,
            sr_no: model.sr_no,
            year: model.year,
            customer,
            agent,
            inputs: LedgerInputs {
                loan_amount: model.loan_amount,
                loan_rate: model.loan_rate,
                quantity: model.quantity,
                rate: model.rate,
                empty_bag_quantity: model.empty_bag_quantity,
                empty_bag_rate: model.empty_bag_rate,
            },
            amounts: LedgerAmounts {
                loan_profit: model.loan_profit,
                loan_payable: model.loan_payable,
                service_amount: model.service_amount,
                empty_bag_amount: model.empty_bag_amount,
                total_amount: model.total_amount,
            },
            version: model.version,
            created_at: model.created_at,
        })
    }
}

pub(crate) fn into_entries(models: Vec<Model>) -> ResultEngine<Vec<LedgerEntry>> {
    models.into_iter().map(LedgerEntry::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_reference_amounts() {
        let inputs = LedgerInputs {
            loan_amount: 20000.0,
            loan_rate: 12.0,
            quantity: 40.0,
            rate: 250.0,
            empty_bag_quantity: 70.0,
            empty_bag_rate: 78.0,
        };
        let amounts = inputs.derive().unwrap();

        assert_eq!(amounts.loan_profit, 2400.0);
        assert_eq!(amounts.loan_payable, 22400.0);
        assert_eq!(amounts.service_amount, 10000.0);
        assert_eq!(amounts.empty_bag_amount, 5460.0);
        assert_eq!(amounts.total_amount, 37860.0);
    }

    #[test]
    fn zero_inputs_derive_zero() {
        assert_eq!(
            LedgerInputs::default().derive().unwrap(),
            LedgerAmounts::default()
        );
    }

    #[test]
    fn totals_hold_for_fractional_inputs() {
        let inputs = LedgerInputs {
            loan_amount: 1234.5,
            loan_rate: 7.25,
            quantity: 3.5,
            rate: 19.99,
            empty_bag_quantity: 11.0,
            empty_bag_rate: 0.5,
        };
        let a = inputs.derive().unwrap();

        assert_eq!(a.loan_profit, inputs.loan_amount * inputs.loan_rate / 100.0);
        assert_eq!(a.loan_payable, a.loan_profit + inputs.loan_amount);
        assert_eq!(
            a.total_amount,
            a.loan_payable + a.empty_bag_amount + a.service_amount
        );
    }

    #[test]
    fn overflowing_amounts_are_rejected() {
        let inputs = LedgerInputs {
            quantity: 1e200,
            rate: 1e200,
            ..LedgerInputs::default()
        };
        assert_eq!(
            inputs.derive(),
            Err(EngineError::InvalidInput(
                "service_amount is out of range".to_string()
            ))
        );

        let mut entry_inputs = LedgerInputs {
            loan_amount: f64::MAX,
            loan_rate: 100.0,
            ..LedgerInputs::default()
        };
        assert!(entry_inputs.derive().is_err());
        entry_inputs.loan_rate = 0.0;
        assert!(entry_inputs.derive().is_ok());
    }
}
