//! Embedded party snapshots.
//!
//! A [`PartySnapshot`] is a by-value copy of a [`Party`] taken at resolution
//! time. It keeps the registry identity it was copied from but is never
//! re-read from the registry: later edits or deletes of the source record
//! leave it untouched. The only way to build one outside the storage layer is
//! [`PartySnapshot::capture`].

use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, Party, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartySnapshot {
    id: Uuid,
    name: String,
    slug: String,
    father: String,
    phone: Option<String>,
    address: Option<String>,
}

impl PartySnapshot {
    /// Copies the identity fields of a registry record.
    pub fn capture(party: &Party) -> Self {
        Self {
            id: party.id,
            name: party.name.clone(),
            slug: party.slug.clone(),
            father: party.father.clone(),
            phone: party.phone.clone(),
            address: party.address.clone(),
        }
    }

    /// Identity of the registry record this snapshot was copied from.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn father(&self) -> &str {
        &self.father
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

/// Flattened `{prefix}_*` columns of a snapshot, as stored on the owning row.
#[derive(Clone, Debug, Default)]
pub(crate) struct SnapshotColumns {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub father: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<&PartySnapshot> for SnapshotColumns {
    fn from(snapshot: &PartySnapshot) -> Self {
        Self {
            id: snapshot.id.to_string(),
            name: snapshot.name.clone(),
            slug: snapshot.slug.clone(),
            father: snapshot.father.clone(),
            phone: snapshot.phone.clone(),
            address: snapshot.address.clone(),
        }
    }
}

impl TryFrom<SnapshotColumns> for PartySnapshot {
    type Error = EngineError;

    fn try_from(columns: SnapshotColumns) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&columns.id, "party")?,
            name: columns.name,
            slug: columns.slug,
            father: columns.father,
            phone: columns.phone,
            address: columns.address,
        })
    }
}

/// Rebuilds an optional snapshot: a row without a `{prefix}_id` has none.
pub(crate) fn optional_snapshot(
    id: Option<String>,
    name: Option<String>,
    slug: Option<String>,
    father: Option<String>,
    phone: Option<String>,
    address: Option<String>,
) -> ResultEngine<Option<PartySnapshot>> {
    let Some(id) = id else {
        return Ok(None);
    };
    let columns = SnapshotColumns {
        id,
        name: name.unwrap_or_default(),
        slug: slug.unwrap_or_default(),
        father: father.unwrap_or_default(),
        phone,
        address,
    };
    PartySnapshot::try_from(columns).map(Some)
}
