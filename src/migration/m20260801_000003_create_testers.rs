//! Migration: Create testers and tester groups.
//!
//! The two tables reference each other (group membership one way, group
//! creator/owner the other), so the group-side constraints are added after
//! both tables exist.

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
                CREATE TABLE tester_groups (
                    id SERIAL PRIMARY KEY,
                    created_by_id INTEGER NOT NULL,
                    owner_id INTEGER NOT NULL,
                    name VARCHAR(255) NOT NULL UNIQUE
                );

                CREATE TABLE testers (
                    id SERIAL PRIMARY KEY,
                    tester_group_id INTEGER REFERENCES tester_groups(id),
                    tester_type_id INTEGER NOT NULL REFERENCES tester_types(id),

                    first_name VARCHAR(255) NOT NULL,
                    last_name VARCHAR(255) NOT NULL,
                    email VARCHAR(255) NOT NULL UNIQUE,
                    password_hash VARCHAR(255) NOT NULL,

                    active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    last_login_at TIMESTAMPTZ
                );

                ALTER TABLE tester_groups
                    ADD CONSTRAINT fk_tester_groups_created_by
                        FOREIGN KEY (created_by_id) REFERENCES testers(id),
                    ADD CONSTRAINT fk_tester_groups_owner
                        FOREIGN KEY (owner_id) REFERENCES testers(id);

                CREATE INDEX idx_testers_tester_type_id ON testers(tester_type_id);
                CREATE INDEX idx_testers_tester_group_id ON testers(tester_group_id);
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
                DROP TABLE IF EXISTS testers CASCADE;
                DROP TABLE IF EXISTS tester_groups CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
