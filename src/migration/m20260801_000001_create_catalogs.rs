//! Migration: Create the flat catalog tables.
//!
//! Clients, tester types, display resolutions, scenarios, status sets, and
//! test suites have no foreign keys between them.

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
                CREATE TABLE clients (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(255) NOT NULL
                );

                CREATE TABLE tester_types (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(255) NOT NULL UNIQUE,
                    description TEXT
                );

                CREATE TABLE resolutions (
                    id SERIAL PRIMARY KEY,
                    h INTEGER NOT NULL,
                    w INTEGER NOT NULL,
                    CONSTRAINT resolutions_hw_unique UNIQUE (h, w)
                );

                CREATE TABLE scenarios (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(255) NOT NULL UNIQUE
                );

                CREATE TABLE status_sets (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(255) NOT NULL UNIQUE
                );

                CREATE TABLE test_suites (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(255) NOT NULL UNIQUE
                );
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
                DROP TABLE IF EXISTS test_suites CASCADE;
                DROP TABLE IF EXISTS status_sets CASCADE;
                DROP TABLE IF EXISTS scenarios CASCADE;
                DROP TABLE IF EXISTS resolutions CASCADE;
                DROP TABLE IF EXISTS tester_types CASCADE;
                DROP TABLE IF EXISTS clients CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
