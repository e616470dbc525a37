//! Migration: Create runs.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE runs (
                    id SERIAL PRIMARY KEY,
                    project_id INTEGER NOT NULL REFERENCES projects(id),
                    name VARCHAR(500) NOT NULL,

                    started_at TIMESTAMPTZ,
                    done_at TIMESTAMPTZ,

                    test_suite_metadata TEXT
                );

                CREATE INDEX idx_runs_project_id ON runs(project_id);
                CREATE INDEX idx_runs_started_at ON runs(started_at DESC NULLS LAST);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS runs CASCADE;")
            .await?;

        Ok(())
    }
}
