//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_catalogs;
mod m20260801_000002_create_statuses;
mod m20260801_000003_create_testers;
mod m20260801_000004_create_projects;
mod m20260801_000005_create_test_cases;
mod m20260801_000006_create_runs;
mod m20260801_000007_create_attachments;
mod m20260801_000008_create_executions;
mod m20260801_000009_seed_defaults;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_catalogs::Migration),
            Box::new(m20260801_000002_create_statuses::Migration),
            Box::new(m20260801_000003_create_testers::Migration),
            Box::new(m20260801_000004_create_projects::Migration),
            Box::new(m20260801_000005_create_test_cases::Migration),
            Box::new(m20260801_000006_create_runs::Migration),
            Box::new(m20260801_000007_create_attachments::Migration),
            Box::new(m20260801_000008_create_executions::Migration),
            Box::new(m20260801_000009_seed_defaults::Migration),
        ]
    }
}
