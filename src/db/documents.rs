use crate::db::connection::Database;
use crate::errors::IngestError;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde_json::Value;

pub const JOB_LISTINGS: &str = "job_listings";
pub const AIR_QUALITY: &str = "air_quality";
pub const STATION_FEEDS: &str = "station_feeds";

/// Where to find a record's natural key and creation time inside its
/// payload. A missing or unparseable time falls back to the write time.
#[derive(Debug, Clone, Copy)]
pub struct KeyRule {
    pub key_path: &'static [&'static str],
    pub created_at_path: Option<&'static [&'static str]>,
}

pub const LISTING_KEYS: KeyRule = KeyRule {
    key_path: &["id"],
    created_at_path: Some(&["dateCreation"]),
};

pub const MEASUREMENT_KEYS: KeyRule = KeyRule {
    key_path: &["city"],
    created_at_path: Some(&["observed_at"]),
};

pub const STATION_KEYS: KeyRule = KeyRule {
    key_path: &["place"],
    created_at_path: Some(&["time", "iso"]),
};

fn lookup<'v>(value: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(value, |v, key| v.get(*key))
}

impl KeyRule {
    pub fn key_of(&self, record: &Value) -> Option<String> {
        match lookup(record, self.key_path)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn created_at_of(&self, record: &Value) -> Option<DateTime<Utc>> {
        match lookup(record, self.created_at_path?)? {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub key: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub first_seen_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Replace-if-exists-else-insert into one collection.
pub struct UpsertSink {
    collection: &'static str,
    rule: KeyRule,
}

impl UpsertSink {
    pub fn new(collection: &'static str, rule: KeyRule) -> Self {
        Self { collection, rule }
    }

    pub fn listings() -> Self {
        Self::new(JOB_LISTINGS, LISTING_KEYS)
    }

    pub fn air_quality() -> Self {
        Self::new(AIR_QUALITY, MEASUREMENT_KEYS)
    }

    pub fn station_feeds() -> Self {
        Self::new(STATION_FEEDS, STATION_KEYS)
    }

    pub fn upsert(
        &self,
        db: &Database,
        record: &Value,
        now: DateTime<Utc>,
    ) -> Result<UpsertOutcome, IngestError> {
        let key = self.rule.key_of(record).ok_or_else(|| {
            IngestError::Write(format!(
                "{}: record has no {}",
                self.collection,
                self.rule.key_path.join(".")
            ))
        })?;
        let created_at = self.rule.created_at_of(record).unwrap_or(now);
        let payload =
            serde_json::to_string(record).map_err(|e| IngestError::Write(e.to_string()))?;
        let write_err = |e: rusqlite::Error| IngestError::Write(format!("{}/{key}: {e}", self.collection));

        db.with_conn(|conn| {
            let tx = conn.transaction().map_err(write_err)?;

            let existed = tx
                .query_row(
                    "SELECT 1 FROM documents WHERE collection = ?1 AND doc_key = ?2",
                    params![self.collection, key],
                    |_| Ok(()),
                )
                .optional()
                .map_err(write_err)?
                .is_some();

            tx.execute(
                r#"
                INSERT INTO documents (collection, doc_key, payload, created_at, first_seen_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                ON CONFLICT(collection, doc_key) DO UPDATE SET
                    payload = excluded.payload,
                    created_at = excluded.created_at,
                    updated_at = excluded.updated_at
                "#,
                params![
                    self.collection,
                    key,
                    payload,
                    created_at.timestamp(),
                    now.timestamp()
                ],
            )
            .map_err(write_err)?;

            tx.commit().map_err(write_err)?;

            Ok(if existed {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Inserted
            })
        })
    }
}

#[cfg(test)]
fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
pub fn get_document(
    db: &Database,
    collection: &str,
    key: &str,
) -> Result<Option<StoredDocument>, IngestError> {
    let row = db.with_conn(|conn| {
        conn.query_row(
            "SELECT doc_key, payload, created_at, first_seen_at, updated_at
             FROM documents WHERE collection = ?1 AND doc_key = ?2",
            params![collection, key],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )
        .optional()
        .map_err(IngestError::from)
    })?;

    row.map(|(key, payload, created_at, first_seen_at, updated_at)| {
        let payload = serde_json::from_str(&payload)
            .map_err(|e| IngestError::Db(format!("corrupt payload for {key}: {e}")))?;
        Ok(StoredDocument {
            key,
            payload,
            created_at: from_unix(created_at),
            first_seen_at: from_unix(first_seen_at),
            updated_at: from_unix(updated_at),
        })
    })
    .transpose()
}

#[cfg(test)]
pub fn count_documents(db: &Database, collection: &str) -> Result<usize, IngestError> {
    db.with_conn(|conn| {
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    })
}
