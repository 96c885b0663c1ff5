pub use sea_orm_migration::prelude::*;

mod m20250815_000001_create_identity_tables;
mod m20250815_000002_create_catalog_tables;
mod m20250815_000003_create_user_audit;
mod m20250815_000004_seed_defaults;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250815_000001_create_identity_tables::Migration),
            Box::new(m20250815_000002_create_catalog_tables::Migration),
            Box::new(m20250815_000003_create_user_audit::Migration),
            Box::new(m20250815_000004_seed_defaults::Migration),
        ]
    }
}
