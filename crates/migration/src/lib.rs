pub use sea_orm_migration::prelude::*;

mod m20251001_000000_users;
mod m20251001_000100_months;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000000_users::Migration),
            Box::new(m20251001_000100_months::Migration),
        ]
    }
}
