use crate::db::UpsertSink;
use crate::errors::{IngestError, Outcome};
use crate::fetchers::{StationFeedFetcher, Transport};
use crate::pipeline::context::IngestContext;
use crate::pipeline::report::CycleReport;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Station feed per place name, upserted by place.
pub fn run_station_cycle<T: Transport>(
    ctx: &IngestContext<T>,
    places: &[String],
    now: DateTime<Utc>,
) -> CycleReport {
    let mut report = CycleReport::default();

    let Some(api_key) = ctx.config.waqi_api_key.as_deref() else {
        error!("WAQI_API_KEY not configured, skipping station cycle");
        report.auth_failed = true;
        return report;
    };

    let fetcher = StationFeedFetcher::new(ctx.transport(), &ctx.config.endpoints.station_feed, api_key);
    let sink = UpsertSink::station_feeds();

    for place in places {
        let reading = match Outcome::from(fetcher.fetch(place)) {
            Outcome::Success(reading) => reading,
            Outcome::NotFound => {
                report.not_found += 1;
                continue;
            }
            Outcome::Transient(e) | Outcome::Fatal(e) => {
                warn!(place = %place, error = %e, "station feed fetch failed");
                report.failures += 1;
                continue;
            }
        };

        let saved = serde_json::to_value(&reading)
            .map_err(|e| IngestError::Write(e.to_string()))
            .and_then(|record| sink.upsert(ctx.db(), &record, now));

        match saved {
            Ok(_) => {
                info!(place = %place, "station feed stored");
                report.upserted += 1;
            }
            Err(e) => {
                warn!(place = %place, error = %e, "station feed not stored");
                report.failures += 1;
            }
        }
    }

    info!(%report, "station cycle finished");
    report
}
