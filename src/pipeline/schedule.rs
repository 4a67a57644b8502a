//! Cron-driven repetition of ingestion cycles.
//!
//! Blocking loop: compute the next fire time, sleep until it, run the
//! cycle, repeat. Cycles never overlap.

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::errors::IngestError;

/// 11:00 and 18:00 every day.
pub const DEFAULT_CRON: &str = "0 11,18 * * *";

/// Parse a cron expression, auto-prepending "0 " for 5-field expressions.
///
/// The `cron` crate requires 6 fields (sec min hr dom mon dow).
pub fn parse_cron(expr: &str) -> Result<Schedule, IngestError> {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    let parsed = if parts.len() == 5 {
        Schedule::from_str(&format!("0 {}", expr))
    } else {
        Schedule::from_str(expr)
    };
    parsed.map_err(|e| IngestError::Config(format!("invalid cron expression {expr:?}: {e}")))
}

/// Next fire time strictly after `now` and how long to wait for it.
pub fn next_fire(schedule: &Schedule, now: DateTime<Utc>) -> Option<(DateTime<Utc>, Duration)> {
    let next = schedule.after(&now).next()?;
    let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
    Some((next, wait))
}

/// Run `cycle` at every fire time of `schedule`. Returns only when the
/// schedule has no further fire times.
pub fn run_scheduled<F>(schedule: &Schedule, mut cycle: F)
where
    F: FnMut(DateTime<Utc>),
{
    while let Some((next, wait)) = next_fire(schedule, Utc::now()) {
        info!(next = %next.to_rfc3339(), wait_secs = wait.as_secs(), "waiting for next cycle");
        std::thread::sleep(wait);
        cycle(Utc::now());
    }
    info!("schedule exhausted");
}
