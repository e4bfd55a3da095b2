//! Operator accounts used for HTTP basic authentication.

use sea_orm::entity::prelude::*;

pub(crate) const ADMIN_ROLE: &str = "ADMIN";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}
