pub use sea_orm_migration::prelude::*;

mod m20261002_000000_init;
mod m20261009_000000_business_keys;
mod m20261012_000000_chambers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261002_000000_init::Migration),
            Box::new(m20261009_000000_business_keys::Migration),
            Box::new(m20261012_000000_chambers::Migration),
        ]
    }
}
