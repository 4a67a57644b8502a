// errors.rs
use thiserror::Error;

use crate::fetchers::FetchError;

/// Errors raised by the ingestion pipelines, either from an upstream API
/// (token exchange, page fetches) or from the document store.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("auth error: {0}")]
    Auth(String),

    #[error("page {page} fetch failed: {source}")]
    PageFetch {
        page: u32,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("write error: {0}")]
    Write(String),

    #[error("database error: {0}")]
    Db(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl IngestError {
    /// Fatal errors stop the enclosing cycle path; everything else only
    /// abandons the current unit of work.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IngestError::Auth(_) | IngestError::Db(_) | IngestError::Config(_)
        )
    }
}

impl From<rusqlite::Error> for IngestError {
    fn from(e: rusqlite::Error) -> Self {
        IngestError::Db(e.to_string())
    }
}

/// Tagged result used at component boundaries.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    NotFound,
    Transient(IngestError),
    Fatal(IngestError),
}

impl<T> Outcome<T> {
    /// Classify a call that always yields a value on success.
    pub fn from_result(result: Result<T, IngestError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(e) => Outcome::from_error(e),
        }
    }

    fn from_error(e: IngestError) -> Self {
        if e.is_fatal() {
            Outcome::Fatal(e)
        } else {
            Outcome::Transient(e)
        }
    }
}

impl<T> From<Result<Option<T>, IngestError>> for Outcome<T> {
    fn from(result: Result<Option<T>, IngestError>) -> Self {
        match result {
            Ok(Some(value)) => Outcome::Success(value),
            Ok(None) => Outcome::NotFound,
            Err(e) => Outcome::from_error(e),
        }
    }
}
