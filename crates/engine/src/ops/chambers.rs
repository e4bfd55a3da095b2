use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;

use crate::{
    Chamber, ChamberInput, EngineError, Page, PageRequest, ResultEngine,
    chambers::{self, into_chambers},
    page::fetch_page,
    util::parse_uuid,
};

use super::{Engine, with_tx};

fn chamber_sort_column(field: &str) -> Option<chambers::Column> {
    match field {
        "name" => Some(chambers::Column::Name),
        "capacity" => Some(chambers::Column::Capacity),
        "createdAt" | "created_at" => Some(chambers::Column::CreatedAt),
        _ => None,
    }
}

impl Engine {
    /// Adds a chamber. Names are unique.
    pub async fn new_chamber(&self, input: &ChamberInput) -> ResultEngine<Chamber> {
        let chamber = Chamber::new(input);
        with_tx!(self, |db_tx| {
            self.ensure_chamber_name_free(&db_tx, &chamber.name, None)
                .await?;
            chambers::ActiveModel::from(&chamber).insert(&db_tx).await?;
            info!(id = %chamber.id, name = %chamber.name, "chamber created");
            Ok(chamber)
        })
    }

    pub async fn chambers(&self, request: &PageRequest) -> ResultEngine<Page<Chamber>> {
        let select = chambers::Entity::find();
        let select = match &request.sort {
            Some(sort) => sort.apply(select, chamber_sort_column)?,
            None => select.order_by_asc(chambers::Column::Name),
        };
        fetch_page(&self.database, select, request)
            .await?
            .try_map(into_chambers)
    }

    pub async fn chamber(&self, id: &str) -> ResultEngine<Chamber> {
        self.require_chamber(&self.database, id).await
    }

    /// Renames and resizes a chamber, bumping its version.
    pub async fn update_chamber(&self, id: &str, input: &ChamberInput) -> ResultEngine<Chamber> {
        with_tx!(self, |db_tx| {
            let current = self.require_chamber(&db_tx, id).await?;
            let chamber = Chamber {
                id: current.id,
                created_at: current.created_at,
                version: current.version + 1,
                ..Chamber::new(input)
            };
            self.ensure_chamber_name_free(&db_tx, &chamber.name, Some(&chamber.id.to_string()))
                .await?;
            chambers::ActiveModel::from(&chamber).update(&db_tx).await?;
            info!(id = %chamber.id, version = chamber.version, "chamber updated");
            Ok(chamber)
        })
    }

    pub async fn delete_chamber(&self, id: &str) -> ResultEngine<Chamber> {
        with_tx!(self, |db_tx| {
            let chamber = self.require_chamber(&db_tx, id).await?;
            chambers::Entity::delete_by_id(chamber.id.to_string())
                .exec(&db_tx)
                .await?;
            info!(id = %chamber.id, "chamber deleted");
            Ok(chamber)
        })
    }

    async fn ensure_chamber_name_free<C: ConnectionTrait>(
        &self,
        conn: &C,
        name: &str,
        except: Option<&str>,
    ) -> ResultEngine<()> {
        let mut select = chambers::Entity::find().filter(chambers::Column::Name.eq(name));
        if let Some(id) = except {
            select = select.filter(chambers::Column::Id.ne(id));
        }
        if select.one(conn).await?.is_some() {
            return Err(EngineError::ExistingKey(format!("chamber {name}")));
        }
        Ok(())
    }

    async fn require_chamber<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> ResultEngine<Chamber> {
        let chamber_id = parse_uuid(id, "chamber")?;
        let model = chambers::Entity::find_by_id(chamber_id.to_string())
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("chamber {id}")))?;
        Chamber::try_from(model)
    }
}
