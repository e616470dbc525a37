//! Migration: Create statuses.
//!
//! Each status carries a `role` tag alongside its display name so that
//! default-status selection and aggregation survive renames.

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
                CREATE TABLE statuses (
                    id SERIAL PRIMARY KEY,
                    status_set_id INTEGER NOT NULL REFERENCES status_sets(id),
                    name VARCHAR(255) NOT NULL,
                    description TEXT,
                    role VARCHAR(32) NOT NULL DEFAULT 'other',

                    CONSTRAINT statuses_set_name_unique UNIQUE (status_set_id, name)
                );

                CREATE INDEX idx_statuses_status_set_id ON statuses(status_set_id);
                CREATE INDEX idx_statuses_role ON statuses(role);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS statuses CASCADE;")
            .await?;

        Ok(())
    }
}
