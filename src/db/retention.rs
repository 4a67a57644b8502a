use crate::db::connection::Database;
use crate::db::documents::JOB_LISTINGS;
use crate::errors::IngestError;
use chrono::{DateTime, Duration, Utc};
use rusqlite::params;
use tracing::info;

pub const DEFAULT_LISTING_RETENTION_DAYS: i64 = 14;

/// Age-based purge for one collection. The only destructive path.
///
/// Age is measured from the last time the store wrote the document, so a
/// record refreshed in the current cycle is never removed by it.
pub struct RetentionSweeper {
    collection: &'static str,
    horizon: Duration,
}

impl RetentionSweeper {
    pub fn new(collection: &'static str, horizon: Duration) -> Self {
        Self {
            collection,
            horizon,
        }
    }

    pub fn listings(retention_days: i64) -> Self {
        Self::new(JOB_LISTINGS, Duration::days(retention_days))
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.horizon
    }

    /// Delete every document last written strictly before `now - horizon`.
    pub fn sweep(&self, db: &Database, now: DateTime<Utc>) -> Result<usize, IngestError> {
        let cutoff = self.cutoff(now);

        let deleted = db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND updated_at < ?2",
                params![self.collection, cutoff.timestamp()],
            )
            .map_err(|e| IngestError::Write(format!("{}: sweep failed: {e}", self.collection)))
        })?;

        info!(
            collection = self.collection,
            cutoff = %cutoff.to_rfc3339(),
            deleted,
            "retention sweep finished"
        );
        Ok(deleted)
    }
}
