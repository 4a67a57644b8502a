use crate::config::AppConfig;
use crate::db::Database;
use crate::errors::IngestError;
use crate::fetchers::{HttpTransport, Transport};
use tracing::info;

/// Explicit handles for one process: configuration, the HTTP transport and
/// the database connection. Built once at startup, torn down by
/// [`IngestContext::shutdown`].
pub struct IngestContext<T: Transport = HttpTransport> {
    pub config: AppConfig,
    transport: T,
    db: Database,
}

impl IngestContext<HttpTransport> {
    /// Production wiring: real HTTP client with the configured timeout and
    /// the on-disk database.
    pub fn open(config: AppConfig) -> Result<Self, IngestError> {
        let transport = HttpTransport::new(config.http_timeout)?;
        let db = Database::open(&config.database_path)?;
        Self::with_parts(config, transport, db)
    }
}

impl<T: Transport> IngestContext<T> {
    pub fn with_parts(config: AppConfig, transport: T, db: Database) -> Result<Self, IngestError> {
        db.init_schema()?;
        info!(database = %config.database_path, "ingestion context ready");
        Ok(Self {
            config,
            transport,
            db,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn shutdown(self) -> Result<(), IngestError> {
        self.db.close()?;
        info!("ingestion context shut down");
        Ok(())
    }
}
