//! Migration: Create test cases, their versions, and suite membership.

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
                CREATE TABLE test_cases (
                    id SERIAL PRIMARY KEY,
                    scenario_id INTEGER NOT NULL REFERENCES scenarios(id),
                    status_set_id INTEGER NOT NULL REFERENCES status_sets(id)
                );

                CREATE TABLE test_case_versions (
                    id SERIAL PRIMARY KEY,
                    test_case_id INTEGER NOT NULL REFERENCES test_cases(id) ON DELETE CASCADE,
                    created_by INTEGER NOT NULL REFERENCES testers(id),

                    release_ready BOOLEAN NOT NULL DEFAULT FALSE,
                    version INTEGER NOT NULL,
                    name VARCHAR(500),
                    description TEXT,
                    steps TEXT,
                    expected_result TEXT,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    CONSTRAINT test_case_versions_case_version_unique
                        UNIQUE (test_case_id, version)
                );

                CREATE TABLE suitcases (
                    id SERIAL PRIMARY KEY,
                    test_case_id INTEGER NOT NULL REFERENCES test_cases(id),
                    test_suite_id INTEGER NOT NULL REFERENCES test_suites(id),

                    CONSTRAINT suitcases_case_suite_unique
                        UNIQUE (test_case_id, test_suite_id)
                );

                CREATE INDEX idx_test_cases_scenario_id ON test_cases(scenario_id);
                CREATE INDEX idx_test_case_versions_test_case_id
                    ON test_case_versions(test_case_id);
                CREATE INDEX idx_suitcases_test_suite_id ON suitcases(test_suite_id);
                CREATE INDEX idx_suitcases_test_case_id ON suitcases(test_case_id);
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
                DROP TABLE IF EXISTS suitcases CASCADE;
                DROP TABLE IF EXISTS test_case_versions CASCADE;
                DROP TABLE IF EXISTS test_cases CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
