pub use sea_orm_migration::prelude::*;

mod m20261019_090000_consumables;
mod m20261019_090100_pours;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_090000_consumables::Migration),
            Box::new(m20261019_090100_pours::Migration),
        ]
    }
}
