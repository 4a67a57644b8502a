use crate::errors::IngestError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

#[derive(Debug)]
pub struct IngestRun {
    pub id: i64,
    pub pipeline: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub pages_fetched: Option<i64>,
    pub records_upserted: Option<i64>,
    pub failures: Option<i64>,
    pub records_swept: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Counters written when a run closes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunTotals {
    pub pages: usize,
    pub upserted: usize,
    pub failures: usize,
    pub swept: usize,
}

pub fn start_run(conn: &Connection, pipeline: &str, now: DateTime<Utc>) -> Result<i64, IngestError> {
    conn.execute(
        "INSERT INTO ingest_runs (pipeline, started_at, success) VALUES (?, ?, 0)",
        params![pipeline, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn end_run(
    conn: &Connection,
    run_id: i64,
    now: DateTime<Utc>,
    totals: RunTotals,
    success: bool,
    error: Option<String>,
) -> Result<(), IngestError> {
    conn.execute(
        "UPDATE ingest_runs SET finished_at = ?, pages_fetched = ?, records_upserted = ?, failures = ?, records_swept = ?, success = ?, error_message = ? WHERE id = ?",
        params![
            now,
            totals.pages,
            totals.upserted,
            totals.failures,
            totals.swept,
            success,
            error,
            run_id
        ],
    )?;
    Ok(())
}

pub fn get_recent_runs(conn: &Connection, limit: usize) -> Result<Vec<IngestRun>, IngestError> {
    let mut stmt = conn.prepare(
        "SELECT id, pipeline, started_at, finished_at, pages_fetched, records_upserted, failures, records_swept, success, error_message
         FROM ingest_runs ORDER BY started_at DESC, id DESC LIMIT ?",
    )?;

    let rows = stmt.query_map(params![limit], |row| {
        Ok(IngestRun {
            id: row.get(0)?,
            pipeline: row.get(1)?,
            started_at: row.get(2)?,
            finished_at: row.get(3)?,
            pages_fetched: row.get(4)?,
            records_upserted: row.get(5)?,
            failures: row.get(6)?,
            records_swept: row.get(7)?,
            success: row.get(8)?,
            error_message: row.get(9)?,
        })
    })?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r?);
    }
    Ok(runs)
}
