//! Storage chambers: the cold rooms goods are kept in.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ChamberInput, EngineError, ResultEngine, parties::slugify, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chamber {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub capacity: f64,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

impl Chamber {
    pub fn new(input: &ChamberInput) -> Self {
        let name = input.name.trim().to_string();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            capacity: input.capacity,
            version: 1,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chambers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub capacity: f64,
    pub version: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Chamber> for ActiveModel {
    fn from(chamber: &Chamber) -> Self {
        Self {
            id: ActiveValue::Set(chamber.id.to_string()),
            name: ActiveValue::Set(chamber.name.clone()),
            slug: ActiveValue::Set(chamber.slug.clone()),
            capacity: ActiveValue::Set(chamber.capacity),
            version: ActiveValue::Set(chamber.version),
            created_at: ActiveValue::Set(chamber.created_at),
        }
    }
}

impl TryFrom<Model> for Chamber {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "chamber")?,
            name: model.name,
            slug: model.slug,
            capacity: model.capacity,
            version: model.version,
            created_at: model.created_at,
        })
    }
}

pub(crate) fn into_chambers(models: Vec<Model>) -> ResultEngine<Vec<Chamber>> {
    models.into_iter().map(Chamber::try_from).collect()
}
