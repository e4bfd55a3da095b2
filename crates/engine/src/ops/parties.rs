use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;

use crate::{
    EngineError, Page, PageRequest, Party, PartyInput, PartyKind, ResultEngine,
    page::fetch_page,
    parties::{self, into_parties},
    registry::{PartyRegistry, PartyStore},
    util::parse_uuid,
};

use super::{Engine, contains_any, normalize_search, resolver, with_tx};

fn party_sort_column(field: &str) -> Option<parties::Column> {
    match field {
        "name" => Some(parties::Column::Name),
        "slug" => Some(parties::Column::Slug),
        "father" => Some(parties::Column::Father),
        "phone" => Some(parties::Column::Phone),
        "version" => Some(parties::Column::Version),
        "createdAt" | "created_at" => Some(parties::Column::CreatedAt),
        _ => None,
    }
}

/// Agents are only ever looked up by phone, so one without a phone could
/// never be referenced.
fn require_agent_phone(kind: PartyKind, input: &PartyInput) -> ResultEngine<()> {
    if kind == PartyKind::Agent && input.normalized_phone().is_none() {
        return Err(EngineError::InvalidInput("agent phone is required".to_string()));
    }
    Ok(())
}

impl Engine {
    /// Registers a new party.
    ///
    /// Fails with `ExistingKey` if the registry already holds the same
    /// non-empty phone or the same (name, father) pair, and with
    /// `InvalidInput` for an agent without a phone.
    pub async fn new_party(&self, kind: PartyKind, input: &PartyInput) -> ResultEngine<Party> {
        require_agent_phone(kind, input)?;
        let party = Party::new(kind, input);
        with_tx!(self, |db_tx| {
            let registry = PartyRegistry::new(&db_tx, kind);
            if let Some(phone) = party.phone.as_deref()
                && registry.find_by_phone(phone).await?.is_some()
            {
                return Err(EngineError::ExistingKey(format!(
                    "{} phone {phone}",
                    kind.as_str()
                )));
            }
            if registry
                .find_by_name_father(&party.name, &party.father)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(format!(
                    "{} {} / {}",
                    kind.as_str(),
                    party.name,
                    party.father
                )));
            }
            registry.insert(&party).await?;
            info!(id = %party.id, kind = kind.as_str(), name = %party.name, "party registered");
            Ok(party)
        })
    }

    /// Lists a registry, optionally filtered by a case-sensitive substring of
    /// name, father or phone. Sorted by name unless `request.sort` is given.
    pub async fn parties(
        &self,
        kind: PartyKind,
        param: Option<&str>,
        request: &PageRequest,
    ) -> ResultEngine<Page<Party>> {
        let mut select =
            parties::Entity::find().filter(parties::Column::Kind.eq(kind.as_str()));
        if let Some(needle) = normalize_search(param) {
            select = select.filter(contains_any(&["name", "father", "phone"], needle));
        }
        let select = match &request.sort {
            Some(sort) => sort.apply(select, party_sort_column)?,
            None => select.order_by_asc(parties::Column::Name),
        };
        fetch_page(&self.database, select, request)
            .await?
            .try_map(into_parties)
    }

    /// Return a party from its registry.
    pub async fn party(&self, kind: PartyKind, id: &str) -> ResultEngine<Party> {
        self.require_party(&self.database, kind, id).await
    }

    /// Overwrites a party's fields and bumps its version.
    ///
    /// Snapshots already embedded in transactions and ledger entries are not
    /// touched.
    pub async fn update_party(
        &self,
        kind: PartyKind,
        id: &str,
        input: &PartyInput,
    ) -> ResultEngine<Party> {
        require_agent_phone(kind, input)?;
        with_tx!(self, |db_tx| {
            let current = self.require_party(&db_tx, kind, id).await?;
            let mut party = Party::new(kind, input);
            party.id = current.id;
            party.created_at = current.created_at;
            party.version = current.version + 1;

            if let Some(phone) = party.phone.as_deref() {
                let taken = parties::Entity::find()
                    .filter(parties::Column::Kind.eq(kind.as_str()))
                    .filter(parties::Column::Phone.eq(phone))
                    .filter(parties::Column::Id.ne(party.id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::ExistingKey(format!(
                        "{} phone {phone}",
                        kind.as_str()
                    )));
                }
            }

            let model = parties::ActiveModel::from(&party).update(&db_tx).await?;
            info!(id = %party.id, version = party.version, "party updated");
            Party::try_from(model)
        })
    }

    /// Removes a party and returns it.
    pub async fn delete_party(&self, kind: PartyKind, id: &str) -> ResultEngine<Party> {
        with_tx!(self, |db_tx| {
            let party = self.require_party(&db_tx, kind, id).await?;
            parties::Entity::delete_by_id(party.id.to_string())
                .exec(&db_tx)
                .await?;
            info!(id = %party.id, kind = kind.as_str(), "party deleted");
            Ok(party)
        })
    }

    /// Resolves a submitted payload against the registry of `kind`.
    ///
    /// Agents must already exist; customers are created when unmatched.
    pub async fn resolve_party(&self, kind: PartyKind, input: &PartyInput) -> ResultEngine<Party> {
        with_tx!(self, |db_tx| resolver(&db_tx).resolve(kind, input).await)
    }

    async fn require_party<C: ConnectionTrait>(
        &self,
        conn: &C,
        kind: PartyKind,
        id: &str,
    ) -> ResultEngine<Party> {
        let party_id = parse_uuid(id, kind.as_str())?;
        let model = parties::Entity::find_by_id(party_id.to_string())
            .filter(parties::Column::Kind.eq(kind.as_str()))
            .one(conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("{} {id}", kind.as_str())))?;
        Party::try_from(model)
    }
}
