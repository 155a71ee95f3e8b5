//! SQLite-backed implementation of the `VisitStore` port.
//!
//! The one-open-visit-per-worker rule is enforced by the partial unique index
//! `idx_inspection_visits_one_open`; closing is a single conditional UPDATE
//! whose affected-row count is returned to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use patrolarc_core::VisitStore;
use patrolarc_domain::constants::CANCEL_INSPECT_TYPE;
use patrolarc_domain::{NewVisit, PatrolArcError, Result as DomainResult, Visit, VisitClosure};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use super::manager::{map_sql_error, DbManager};
use crate::errors::{is_unique_violation, InfraError};

const VISIT_COLUMNS: &str = "record_id, worker_id, worker_name, device_id, area, inspect_type, \
     work_order, arrive_at, submit_data_at, source, ok_count, ng_count";

/// SQLite-backed visit repository.
pub struct SqliteVisitRepository {
    db: Arc<DbManager>,
}

impl SqliteVisitRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Fetch a single visit by record id.
    pub async fn get(&self, record_id: &str) -> DomainResult<Option<Visit>> {
        let db = Arc::clone(&self.db);
        let record_id = record_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<Visit>> {
            let conn = db.get_connection()?;
            let sql = format!("SELECT {VISIT_COLUMNS} FROM inspection_visits WHERE record_id = ?1");
            conn.query_row(&sql, params![record_id], map_visit_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl VisitStore for SqliteVisitRepository {
    async fn create(&self, visit: NewVisit) -> DomainResult<Visit> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Visit> {
            let conn = db.get_connection()?;
            let stored = Visit::from_new(Uuid::now_v7().to_string(), visit);
            insert_visit(&conn, &stored).map_err(|err| {
                if is_unique_violation(&err) {
                    PatrolArcError::VisitAlreadyOpen(stored.worker_id.clone())
                } else {
                    map_sql_error(err)
                }
            })?;
            Ok(stored)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_open_by_worker(&self, worker_id: &str) -> DomainResult<Option<Visit>> {
        let db = Arc::clone(&self.db);
        let worker_id = worker_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<Visit>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {VISIT_COLUMNS} FROM inspection_visits \
                 WHERE worker_id = ?1 AND submit_data_at IS NULL \
                 ORDER BY arrive_at DESC, record_id DESC LIMIT 1"
            );
            conn.query_row(&sql, params![worker_id], map_visit_row)
                .optional()
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn close_if_open_and_owned(
        &self,
        record_id: &str,
        worker_id: &str,
        closure: VisitClosure,
    ) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let record_id = record_id.to_owned();
        let worker_id = worker_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let conn = db.get_connection()?;
            let affected = close_visit(&conn, &record_id, &worker_id, &closure).map_err(map_sql_error)?;
            debug!(%record_id, %worker_id, affected, "conditional close");
            Ok(affected)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn query_by_window(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DomainResult<Vec<Visit>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Visit>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {VISIT_COLUMNS} FROM inspection_visits \
                 WHERE arrive_at >= ?1 AND arrive_at < ?2 \
                 ORDER BY worker_id, arrive_at, record_id"
            );
            let (start_ts, end_ts) = (to_ts(start), to_ts(end));
            let params: [&dyn ToSql; 2] = [&start_ts, &end_ts];
            query_visits(&conn, &sql, &params).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn query_by_worker(
        &self,
        worker_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DomainResult<Vec<Visit>> {
        let db = Arc::clone(&self.db);
        let worker_id = worker_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<Vec<Visit>> {
            let conn = db.get_connection()?;
            let sql = format!(
                "SELECT {VISIT_COLUMNS} FROM inspection_visits \
                 WHERE worker_id = ?1 AND arrive_at >= ?2 AND arrive_at < ?3 \
                 ORDER BY arrive_at, record_id"
            );
            let (start_ts, end_ts) = (to_ts(start), to_ts(end));
            let params: [&dyn ToSql; 3] = [&worker_id, &start_ts, &end_ts];
            query_visits(&conn, &sql, &params).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn insert_visit(conn: &Connection, visit: &Visit) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO inspection_visits ({VISIT_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            visit.record_id,
            visit.worker_id,
            visit.worker_name,
            visit.device_id,
            visit.area,
            visit.inspect_type,
            visit.work_order,
            to_ts(visit.arrive_at),
            visit.submit_data_at.map(to_ts),
            visit.source,
            visit.ok_count,
            visit.ng_count,
        ],
    )
}

fn close_visit(
    conn: &Connection,
    record_id: &str,
    worker_id: &str,
    closure: &VisitClosure,
) -> rusqlite::Result<usize> {
    match closure {
        VisitClosure::Cancel { at } => conn.execute(
            "UPDATE inspection_visits \
             SET inspect_type = ?1, submit_data_at = ?2 \
             WHERE record_id = ?3 AND worker_id = ?4 AND submit_data_at IS NULL",
            params![CANCEL_INSPECT_TYPE, to_ts(*at), record_id, worker_id],
        ),
        VisitClosure::Submit { at, ok_count, ng_count, work_order } => conn.execute(
            "UPDATE inspection_visits \
             SET submit_data_at = ?1, ok_count = ?2, ng_count = ?3, \
                 work_order = COALESCE(?4, work_order) \
             WHERE record_id = ?5 AND worker_id = ?6 AND submit_data_at IS NULL",
            params![to_ts(*at), ok_count, ng_count, work_order, record_id, worker_id],
        ),
    }
}

fn query_visits(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<Vec<Visit>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_visit_row)?;
    rows.collect()
}

fn map_visit_row(row: &Row<'_>) -> rusqlite::Result<Visit> {
    Ok(Visit {
        record_id: row.get(0)?,
        worker_id: row.get(1)?,
        worker_name: row.get(2)?,
        device_id: row.get(3)?,
        area: row.get(4)?,
        inspect_type: row.get(5)?,
        work_order: row.get(6)?,
        arrive_at: from_ts(row.get(7)?, 7)?,
        submit_data_at: row.get::<_, Option<i64>>(8)?.map(|ts| from_ts(ts, 8)).transpose()?,
        source: row.get(9)?,
        ok_count: row.get(10)?,
        ng_count: row.get(11)?,
    })
}

/// Local wall-clock time as stored seconds.
pub(crate) fn to_ts(at: NaiveDateTime) -> i64 {
    at.and_utc().timestamp()
}

fn from_ts(ts: i64, column_index: usize) -> rusqlite::Result<NaiveDateTime> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.naive_utc()).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column_index,
            rusqlite::types::Type::Integer,
            format!("timestamp {ts} out of range").into(),
        )
    })
}

fn map_join_error(err: task::JoinError) -> PatrolArcError {
    InfraError::from(err).into()
}
