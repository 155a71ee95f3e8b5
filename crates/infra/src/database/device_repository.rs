//! NFC card master data backed by the `nfc_cards` table.

use std::sync::Arc;

use async_trait::async_trait;
use patrolarc_core::DeviceDirectory;
use patrolarc_domain::{DeviceRef, PatrolArcError, Result as DomainResult};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::manager::{map_sql_error, DbManager};
use crate::errors::InfraError;

/// SQLite-backed card → device directory.
pub struct SqliteDeviceDirectory {
    db: Arc<DbManager>,
}

impl SqliteDeviceDirectory {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Register or re-point a card.
    pub async fn upsert_card(&self, device: &DeviceRef) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let device = device.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO nfc_cards (card_id, device_id, device_name, area) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(card_id) DO UPDATE SET \
                     device_id = excluded.device_id, \
                     device_name = excluded.device_name, \
                     area = excluded.area",
                params![device.card_id, device.device_id, device.device_name, device.area],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl DeviceDirectory for SqliteDeviceDirectory {
    async fn resolve(&self, card_id: &str) -> DomainResult<Option<DeviceRef>> {
        let db = Arc::clone(&self.db);
        let card_id = card_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<DeviceRef>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT card_id, device_id, device_name, area FROM nfc_cards WHERE card_id = ?1",
                params![card_id],
                map_card_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_card_row(row: &Row<'_>) -> rusqlite::Result<DeviceRef> {
    Ok(DeviceRef {
        card_id: row.get(0)?,
        device_id: row.get(1)?,
        device_name: row.get(2)?,
        area: row.get(3)?,
    })
}

fn map_join_error(err: task::JoinError) -> PatrolArcError {
    InfraError::from(err).into()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup() -> (SqliteDeviceDirectory, TempDir) {
        let dir = TempDir::new().expect("temp dir created");
        let db = DbManager::new(dir.path().join("cards.db"), 2, std::time::Duration::from_secs(1))
            .expect("manager created");
        db.run_migrations().expect("migrations run");
        (SqliteDeviceDirectory::new(Arc::new(db)), dir)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resolves_registered_cards_only() {
        let (directory, _dir) = setup();
        let press = DeviceRef::new("CARD-1", "DEV-PRESS", "Press 1", "Line A");
        directory.upsert_card(&press).await.unwrap();

        assert_eq!(directory.resolve("CARD-1").await.unwrap(), Some(press));
        assert_eq!(directory.resolve("CARD-404").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upsert_repoints_card() {
        let (directory, _dir) = setup();
        directory.upsert_card(&DeviceRef::new("CARD-1", "DEV-A", "A", "Line A")).await.unwrap();
        directory.upsert_card(&DeviceRef::new("CARD-1", "DEV-B", "B", "Line B")).await.unwrap();

        let resolved = directory.resolve("CARD-1").await.unwrap().unwrap();
        assert_eq!(resolved.device_id, "DEV-B");
        assert_eq!(resolved.area, "Line B");
    }
}
