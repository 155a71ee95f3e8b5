//! Inspect-type master data backed by the `inspect_types` table.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use patrolarc_core::ValidTypeProvider;
use patrolarc_domain::{PatrolArcError, Result as DomainResult};
use rusqlite::params;
use tokio::task;

use super::manager::{map_sql_error, DbManager};
use crate::errors::InfraError;

/// Reads the valid-working-type allow-list from SQLite.
pub struct SqliteInspectTypeRepository {
    db: Arc<DbManager>,
}

impl SqliteInspectTypeRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or update a type and its validity flag.
    pub async fn upsert(&self, name: &str, is_valid: bool) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let name = name.to_owned();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO inspect_types (name, is_valid) VALUES (?1, ?2) \
                 ON CONFLICT(name) DO UPDATE SET is_valid = excluded.is_valid",
                params![name, i64::from(is_valid)],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl ValidTypeProvider for SqliteInspectTypeRepository {
    async fn active_valid_types(&self) -> DomainResult<HashSet<String>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<HashSet<String>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare("SELECT name FROM inspect_types WHERE is_valid = 1")
                .map_err(map_sql_error)?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<HashSet<String>>>()
                .map_err(map_sql_error)?;
            Ok(names)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_join_error(err: task::JoinError) -> PatrolArcError {
    InfraError::from(err).into()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn only_valid_types_are_listed() {
        let dir = TempDir::new().expect("temp dir created");
        let db = DbManager::new(dir.path().join("types.db"), 2, std::time::Duration::from_secs(1))
            .expect("manager created");
        db.run_migrations().expect("migrations run");
        let repo = SqliteInspectTypeRepository::new(Arc::new(db));

        repo.upsert("patrol", true).await.unwrap();
        repo.upsert("training", false).await.unwrap();
        repo.upsert("incoming inspection", true).await.unwrap();
        repo.upsert("incoming inspection", false).await.unwrap();

        let types = repo.active_valid_types().await.unwrap();
        assert_eq!(types, HashSet::from(["patrol".to_string()]));
    }
}
