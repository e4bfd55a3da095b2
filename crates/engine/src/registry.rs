//! Party registries.
//!
//! Customers and agents are two registries over the same table. A
//! [`PartyRegistry`] is a handle on one of them, bound to a connection (or an
//! open database transaction) for the duration of one operation.

use sea_orm::{ConnectionTrait, QueryFilter, Select, prelude::*};

use crate::{Party, PartyKind, ResultEngine, parties};

/// Exact-field lookups and inserts against one registry.
pub(crate) trait PartyStore {
    async fn find_by_phone(&self, phone: &str) -> ResultEngine<Option<Party>>;

    async fn find_by_name_father(&self, name: &str, father: &str)
    -> ResultEngine<Option<Party>>;

    async fn insert(&self, party: &Party) -> ResultEngine<()>;
}

pub(crate) struct PartyRegistry<'a, C> {
    conn: &'a C,
    kind: PartyKind,
}

impl<'a, C: ConnectionTrait> PartyRegistry<'a, C> {
    pub(crate) fn new(conn: &'a C, kind: PartyKind) -> Self {
        Self { conn, kind }
    }

    fn scoped(&self) -> Select<parties::Entity> {
        parties::Entity::find().filter(parties::Column::Kind.eq(self.kind.as_str()))
    }
}

impl<C: ConnectionTrait> PartyStore for PartyRegistry<'_, C> {
    async fn find_by_phone(&self, phone: &str) -> ResultEngine<Option<Party>> {
        self.scoped()
            .filter(parties::Column::Phone.eq(phone))
            .one(self.conn)
            .await?
            .map(Party::try_from)
            .transpose()
    }

    async fn find_by_name_father(
        &self,
        name: &str,
        father: &str,
    ) -> ResultEngine<Option<Party>> {
        self.scoped()
            .filter(parties::Column::Name.eq(name))
            .filter(parties::Column::Father.eq(father))
            .one(self.conn)
            .await?
            .map(Party::try_from)
            .transpose()
    }

    async fn insert(&self, party: &Party) -> ResultEngine<()> {
        parties::ActiveModel::from(party).insert(self.conn).await?;
        Ok(())
    }
}
