//! Database module providing connection management, migrations, and queries.

pub mod attachments;
pub mod catalog;
pub mod executions;
pub mod runs;
pub mod statuses;
pub mod suites;
pub mod test_cases;
pub mod testers;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Database connection pool wrapper around a SeaORM connection.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Get the underlying connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply all pending migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;
        Ok(())
    }

    /// Verify database connectivity with a trivial query.
    pub async fn ping(&self) -> AppResult<()> {
        self.conn
            .execute_raw(Statement::from_string(
                self.conn.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await
            .map_err(|e| AppError::Database(format!("Database ping failed: {}", e)))?;
        Ok(())
    }
}

/// Clamp user-supplied pagination to sane bounds.
pub(crate) fn clamp_page(limit: i64, offset: i64) -> (u64, u64) {
    (limit.clamp(1, 100) as u64, offset.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_bounds() {
        assert_eq!(clamp_page(20, 0), (20, 0));
        assert_eq!(clamp_page(0, -5), (1, 0));
        assert_eq!(clamp_page(5000, 10), (100, 10));
    }
}
