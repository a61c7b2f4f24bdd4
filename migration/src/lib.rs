pub use sea_orm_migration::prelude::*;

mod m20241001_000001_create_account_tables;
mod m20241001_000002_create_requests_table;
mod m20241001_000003_create_catalog_items_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_account_tables::Migration),
            Box::new(m20241001_000002_create_requests_table::Migration),
            Box::new(m20241001_000003_create_catalog_items_table::Migration),
        ]
    }
}
