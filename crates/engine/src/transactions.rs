//! Transaction primitives.
//!
//! A `Transaction` records goods entering (`RECEIVE`) or leaving
//! (`DELIVERY`) the store. It embeds snapshots of the customer and, optionally,
//! the agent it was resolved against.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, PartySnapshot, ResultEngine,
    snapshot::{SnapshotColumns, optional_snapshot},
    util::parse_uuid,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryType {
    #[default]
    Receive,
    Delivery,
}

impl InventoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Receive => "RECEIVE",
            Self::Delivery => "DELIVERY",
        }
    }
}

impl TryFrom<&str> for InventoryType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "RECEIVE" => Ok(Self::Receive),
            "DELIVERY" => Ok(Self::Delivery),
            other => Err(EngineError::InvalidInput(format!(
                "invalid inventory type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub inventory_type: InventoryType,
    pub vouchar_no: i64,
    pub sr_no: String,
    pub name: String,
    pub year: i32,
    pub quantity: f64,
    pub customer: PartySnapshot,
    pub agent: Option<PartySnapshot>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: DateTimeUtc,
    pub inventory_type: String,
    pub vouchar_no: i64,
    pub sr_no: String,
    pub name: String,
    pub year: i32,
    pub quantity: f64,
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
    pub version: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        let customer = SnapshotColumns::from(&tx.customer);
        let agent = tx.agent.as_ref().map(SnapshotColumns::from);

        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            date: ActiveValue::Set(tx.date),
            inventory_type: ActiveValue::Set(tx.inventory_type.as_str().to_string()),
            vouchar_no: ActiveValue::Set(tx.vouchar_no),
            sr_no: ActiveValue::Set(tx.sr_no.clone()),
            name: ActiveValue::Set(tx.name.clone()),
            year: ActiveValue::Set(tx.year),
            quantity: ActiveValue::Set(tx.quantity),
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
            version: ActiveValue::Set(tx.version),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
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
            id: parse_uuid(&model.id, "transaction")?,
            date: model.date,
            inventory_type: InventoryType::try_from(model.inventory_type.as_str())?,
            vouchar_no: model.vouchar_no,
            sr_no: model.sr_no,
            name: model.name,
            year: model.year,
            quantity: model.quantity,
            customer,
            agent,
            version: model.version,
            created_at: model.created_at,
        })
    }
}

pub(crate) fn into_transactions(models: Vec<Model>) -> ResultEngine<Vec<Transaction>> {
    models.into_iter().map(Transaction::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Party, PartyInput, PartyKind};

    fn sample(agent: Option<PartySnapshot>) -> Transaction {
        let customer = Party::new(
            PartyKind::Customer,
            &PartyInput::new("customer1", "customerFather").phone("01912239655"),
        );
        Transaction {
            id: Uuid::new_v4(),
            date: Utc::now(),
            inventory_type: InventoryType::Delivery,
            vouchar_no: 2,
            sr_no: "2/30".to_string(),
            name: "potato".to_string(),
            year: 2024,
            quantity: 12.5,
            customer: PartySnapshot::capture(&customer),
            agent,
            version: 1,
            created_at: Utc::now(),
        }
    }

    fn into_model(active: ActiveModel) -> Model {
        Model {
            id: active.id.unwrap(),
            date: active.date.unwrap(),
            inventory_type: active.inventory_type.unwrap(),
            vouchar_no: active.vouchar_no.unwrap(),
            sr_no: active.sr_no.unwrap(),
            name: active.name.unwrap(),
            year: active.year.unwrap(),
            quantity: active.quantity.unwrap(),
            customer_id: active.customer_id.unwrap(),
            customer_name: active.customer_name.unwrap(),
            customer_slug: active.customer_slug.unwrap(),
            customer_father: active.customer_father.unwrap(),
            customer_phone: active.customer_phone.unwrap(),
            customer_address: active.customer_address.unwrap(),
            agent_id: active.agent_id.unwrap(),
            agent_name: active.agent_name.unwrap(),
            agent_slug: active.agent_slug.unwrap(),
            agent_father: active.agent_father.unwrap(),
            agent_phone: active.agent_phone.unwrap(),
            agent_address: active.agent_address.unwrap(),
            version: active.version.unwrap(),
            created_at: active.created_at.unwrap(),
        }
    }

    #[test]
    fn agentless_row_has_null_agent_columns() {
        let tx = sample(None);
        let model = into_model(ActiveModel::from(&tx));

        assert_eq!(model.inventory_type, "DELIVERY");
        assert!(model.agent_id.is_none());
        assert!(model.agent_name.is_none());
        assert_eq!(Transaction::try_from(model).unwrap(), tx);
    }

    #[test]
    fn agent_snapshot_survives_storage() {
        let agent = Party::new(
            PartyKind::Agent,
            &PartyInput::new("agent1", "agentFather").phone("01712345678"),
        );
        let tx = sample(Some(PartySnapshot::capture(&agent)));
        let model = into_model(ActiveModel::from(&tx));

        assert_eq!(model.agent_phone.as_deref(), Some("01712345678"));
        assert_eq!(Transaction::try_from(model).unwrap().agent, tx.agent);
    }

    #[test]
    fn inventory_type_defaults_to_receive() {
        assert_eq!(InventoryType::default(), InventoryType::Receive);
        assert!(InventoryType::try_from("LOST").is_err());
    }
}
