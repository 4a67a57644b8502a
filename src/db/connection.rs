use crate::errors::IngestError;
use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;
use tracing::info;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// The single long-lived connection for the process. Opened once at
/// startup, closed by [`Database::close`].
pub struct Database {
    conn: RefCell<Connection>,
    label: String,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| IngestError::Db(format!("Open DB failed: {e}")))?;
        Ok(Self {
            conn: RefCell::new(conn),
            label: path.display().to_string(),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, IngestError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| IngestError::Db(format!("Open DB failed: {e}")))?;
        Ok(Self {
            conn: RefCell::new(conn),
            label: ":memory:".to_string(),
        })
    }

    /// Provides a mutable connection to the closure. Calls must not nest.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, IngestError>
    where
        F: FnOnce(&mut Connection) -> Result<T, IngestError>,
    {
        let mut conn = self
            .conn
            .try_borrow_mut()
            .map_err(|_| IngestError::Db("connection already in use".into()))?;
        f(&mut conn)
    }

    /// Apply the embedded schema. Safe to run on every start.
    pub fn init_schema(&self) -> Result<(), IngestError> {
        self.with_conn(|conn| {
            conn.execute_batch(SCHEMA_SQL)
                .map_err(|e| IngestError::Db(format!("Failed to apply schema: {e}")))
        })?;

        info!(database = %self.label, "database initialized");
        Ok(())
    }

    pub fn close(self) -> Result<(), IngestError> {
        let label = self.label;
        self.conn
            .into_inner()
            .close()
            .map_err(|(_, e)| IngestError::Db(format!("Close DB failed: {e}")))?;
        info!(database = %label, "database closed");
        Ok(())
    }
}
