//! Party primitives.
//!
//! A `Party` is a counterparty identity kept in one of two registries:
//! customers and agents. Both registries share the same shape and live in the
//! same table, partitioned by `kind`, so each kind is its own uniqueness
//! domain for phone numbers.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, PartyInput, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    Customer,
    Agent,
}

impl PartyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Agent => "agent",
        }
    }
}

impl TryFrom<&str> for PartyKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "customer" => Ok(Self::Customer),
            "agent" => Ok(Self::Agent),
            other => Err(EngineError::InvalidInput(format!(
                "invalid party kind: {other}"
            ))),
        }
    }
}

/// A registry record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: Uuid,
    pub kind: PartyKind,
    pub name: String,
    pub slug: String,
    pub father: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

impl Party {
    /// Builds a new, not yet persisted, registry record from a submitted
    /// payload.
    pub fn new(kind: PartyKind, input: &PartyInput) -> Self {
        let name = input.name.trim().to_string();
        Self {
            id: Uuid::new_v4(),
            kind,
            slug: slugify(&name),
            name,
            father: input.father.trim().to_string(),
            phone: input.normalized_phone().map(ToString::to_string),
            address: input.normalized_address().map(ToString::to_string),
            version: 1,
            created_at: Utc::now(),
        }
    }
}

/// Lowercases `name` and joins its whitespace-separated words with `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub name: String,
    pub slug: String,
    pub father: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub version: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Party> for ActiveModel {
    fn from(party: &Party) -> Self {
        Self {
            id: ActiveValue::Set(party.id.to_string()),
            kind: ActiveValue::Set(party.kind.as_str().to_string()),
            name: ActiveValue::Set(party.name.clone()),
            slug: ActiveValue::Set(party.slug.clone()),
            father: ActiveValue::Set(party.father.clone()),
            phone: ActiveValue::Set(party.phone.clone()),
            address: ActiveValue::Set(party.address.clone()),
            version: ActiveValue::Set(party.version),
            created_at: ActiveValue::Set(party.created_at),
        }
    }
}

impl TryFrom<Model> for Party {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "party")?,
            kind: PartyKind::try_from(model.kind.as_str())?,
            name: model.name,
            slug: model.slug,
            father: model.father,
            phone: model.phone,
            address: model.address,
            version: model.version,
            created_at: model.created_at,
        })
    }
}

pub(crate) fn into_parties(models: Vec<Model>) -> ResultEngine<Vec<Party>> {
    models.into_iter().map(Party::try_from).collect()
}
