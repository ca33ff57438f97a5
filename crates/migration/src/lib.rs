pub use sea_orm_migration::prelude::*;

mod m20260601_000001_users;
mod m20260601_000002_members;
mod m20260601_000003_waste_types;
mod m20260601_000004_deposits;
mod m20260601_000005_cash_transactions;
mod m20260601_000006_balance_history;
mod m20260601_000007_sessions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_users::Migration),
            Box::new(m20260601_000002_members::Migration),
            Box::new(m20260601_000003_waste_types::Migration),
            Box::new(m20260601_000004_deposits::Migration),
            Box::new(m20260601_000005_cash_transactions::Migration),
            Box::new(m20260601_000006_balance_history::Migration),
            Box::new(m20260601_000007_sessions::Migration),
        ]
    }
}
