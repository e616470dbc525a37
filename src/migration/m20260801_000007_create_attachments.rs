//! Migration: Create attachments.

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
                CREATE TABLE attachments (
                    id SERIAL PRIMARY KEY,

                    parent_attachment_id INTEGER REFERENCES attachments(id),
                    uploaded_by INTEGER NOT NULL REFERENCES testers(id),
                    resolution_id INTEGER REFERENCES resolutions(id),

                    filename VARCHAR(500) NOT NULL,
                    relative_path VARCHAR(500) NOT NULL,

                    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    presentmon_file BOOLEAN,
                    presentmon_version VARCHAR(64),

                    settings JSONB
                );

                CREATE INDEX idx_attachments_parent ON attachments(parent_attachment_id);
                CREATE INDEX idx_attachments_uploaded_by ON attachments(uploaded_by);
                CREATE INDEX idx_attachments_filename ON attachments(filename);
                CREATE INDEX idx_attachments_uploaded_at ON attachments(uploaded_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS attachments CASCADE;")
            .await?;

        Ok(())
    }
}
