//! Migration: Create executions.
//!
//! The `(run_id, test_case_version_id)` unique constraint is the sole
//! concurrency safety net for bulk materialization: a racing insert loses
//! and is skipped per-pair.

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
                CREATE TABLE executions (
                    id SERIAL PRIMARY KEY,

                    device_id INTEGER NOT NULL REFERENCES devices(id),
                    run_id INTEGER NOT NULL REFERENCES runs(id) ON DELETE CASCADE,
                    test_case_version_id INTEGER NOT NULL REFERENCES test_case_versions(id),

                    executed_by INTEGER NOT NULL REFERENCES testers(id),
                    status_id INTEGER NOT NULL REFERENCES statuses(id),

                    attachment_id INTEGER REFERENCES attachments(id),

                    actual_result TEXT,
                    executed_at TIMESTAMPTZ,

                    execution_order INTEGER NOT NULL,

                    CONSTRAINT executions_run_version_unique
                        UNIQUE (run_id, test_case_version_id)
                );

                CREATE INDEX idx_executions_run_id ON executions(run_id);
                CREATE INDEX idx_executions_device_id ON executions(device_id);
                CREATE INDEX idx_executions_executed_by ON executions(executed_by);
                CREATE INDEX idx_executions_status_id ON executions(status_id);
                CREATE INDEX idx_executions_executed_at ON executions(executed_at DESC NULLS LAST);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS executions CASCADE;")
            .await?;

        Ok(())
    }
}
