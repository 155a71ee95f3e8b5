//! Database connection manager backed by an r2d2 SQLite pool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use patrolarc_domain::{DatabaseConfig, PatrolArcError, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::errors::InfraError;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Pooled SQLite connection.
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database manager that owns the connection pool.
pub struct DbManager {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl DbManager {
    /// Open (or create) the database at `db_path`.
    ///
    /// Every pooled connection runs in WAL mode with the given busy timeout,
    /// so concurrent taps wait on each other instead of failing outright.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32, busy_timeout: Duration) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();

        let manager = SqliteConnectionManager::file(&path)
            .with_init(move |conn| apply_connection_pragmas(conn, busy_timeout));

        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .connection_timeout(busy_timeout.max(Duration::from_secs(1)))
            .build(manager)
            .map_err(|err| {
                warn!(db_path = %path.display(), error = %err, "failed to create connection pool");
                PatrolArcError::from(InfraError::from(err))
            })?;

        info!(
            db_path = %path.display(),
            max_connections = pool.max_size(),
            "sqlite pool initialised"
        );

        Ok(Self { pool, path })
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::new(&config.path, config.pool_size, Duration::from_millis(config.busy_timeout_ms))
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<DbConnection> {
        self.pool.get().map_err(|err| InfraError::from(err).into())
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the database answers a trivial query.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0)).map_err(map_sql_error)?;
        Ok(())
    }
}

fn apply_connection_pragmas(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;\n\
         PRAGMA wal_autocheckpoint=1000;\n\
         PRAGMA synchronous=NORMAL;\n\
         PRAGMA foreign_keys=ON;",
    )?;
    conn.busy_timeout(busy_timeout)
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> PatrolArcError {
    PatrolArcError::from(InfraError::from(err))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn manager(dir: &TempDir) -> DbManager {
        DbManager::new(dir.path().join("test.db"), 4, Duration::from_millis(500))
            .expect("manager created")
    }

    #[test]
    fn migrations_create_schema_version() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager = manager(&temp_dir);
        manager.run_migrations().expect("migrations run");

        let conn = manager.get_connection().expect("connection acquired");
        let version: i32 =
            conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0)).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn migrations_are_idempotent() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager = manager(&temp_dir);
        manager.run_migrations().expect("first run");
        manager.run_migrations().expect("second run");
    }

    #[test]
    fn connections_run_in_wal_mode() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager = manager(&temp_dir);

        let conn = manager.get_connection().expect("connection acquired");
        let mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0)).unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn health_check_succeeds_for_valid_database() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager = manager(&temp_dir);
        manager.run_migrations().expect("migrations run");

        manager.health_check().expect("health check passed");
    }

    #[test]
    fn from_config_uses_configured_path() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let config = DatabaseConfig {
            path: temp_dir.path().join("cfg.db").to_string_lossy().into_owned(),
            ..DatabaseConfig::default()
        };

        let manager = DbManager::from_config(&config).expect("manager created");
        assert!(manager.path().ends_with("cfg.db"));
    }
}
