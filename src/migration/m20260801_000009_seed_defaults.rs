//! Migration: Seed the default status set and tester types.
//!
//! The materializer requires a status with role `not_run`; its absence is a
//! configuration error at request time, so it ships with the schema.

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
                INSERT INTO status_sets (name) VALUES ('Default');

                INSERT INTO statuses (status_set_id, name, description, role)
                SELECT s.id, v.name, v.description, v.role
                FROM status_sets s,
                    (VALUES
                        ('Not Run', 'Not yet executed', 'not_run'),
                        ('In Progress', 'Execution has started', 'in_progress'),
                        ('Pass', 'Executed successfully', 'passed'),
                        ('Fail', 'Executed with failures', 'failed'),
                        ('Blocked', 'Cannot be executed', 'blocked'),
                        ('Not Implemented', 'Test not implemented', 'other')
                    ) AS v(name, description, role)
                WHERE s.name = 'Default';

                INSERT INTO tester_types (name, description) VALUES
                    ('Admin', 'Full administrative access'),
                    ('Tester', 'Standard test execution access');
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DELETE FROM tester_types WHERE name IN ('Admin', 'Tester');
                DELETE FROM statuses
                    WHERE status_set_id IN (SELECT id FROM status_sets WHERE name = 'Default');
                DELETE FROM status_sets WHERE name = 'Default';
                "#,
            )
            .await?;

        Ok(())
    }
}
