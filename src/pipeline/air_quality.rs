use crate::db::UpsertSink;
use crate::errors::{IngestError, Outcome};
use crate::fetchers::{AirQualityFetcher, Transport};
use crate::geos::GeoResolver;
use crate::pipeline::context::IngestContext;
use crate::pipeline::report::CycleReport;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Place name → coordinates → current observation → upsert by city.
pub fn run_air_quality_cycle<T: Transport>(
    ctx: &IngestContext<T>,
    cities: &[String],
    now: DateTime<Utc>,
) -> CycleReport {
    let mut report = CycleReport::default();

    let Some(api_key) = ctx.config.openweather_api_key.as_deref() else {
        error!("OPENWEATHER_API_KEY not configured, skipping air-quality cycle");
        report.auth_failed = true;
        return report;
    };

    let endpoints = &ctx.config.endpoints;
    let resolver = GeoResolver::new(ctx.transport(), &endpoints.geocoding, api_key);
    let fetcher = AirQualityFetcher::new(ctx.transport(), &endpoints.air_pollution, api_key);
    let sink = UpsertSink::air_quality();

    for city in cities {
        ingest_city(ctx, &resolver, &fetcher, &sink, city, now, &mut report);
    }

    info!(%report, "air-quality cycle finished");
    report
}

pub fn ingest_city<T: Transport>(
    ctx: &IngestContext<T>,
    resolver: &GeoResolver<'_>,
    fetcher: &AirQualityFetcher<'_>,
    sink: &UpsertSink,
    city: &str,
    now: DateTime<Utc>,
    report: &mut CycleReport,
) {
    let location = match Outcome::from(resolver.resolve(city)) {
        Outcome::Success(location) => location,
        Outcome::NotFound => {
            info!(city, "location not found, skipping");
            report.not_found += 1;
            return;
        }
        Outcome::Transient(e) | Outcome::Fatal(e) => {
            warn!(city, error = %e, "geocoding failed");
            report.failures += 1;
            return;
        }
    };

    let measurement = match Outcome::from(fetcher.fetch(&location)) {
        Outcome::Success(m) => m,
        Outcome::NotFound => {
            info!(city, "no air-quality observation, skipping");
            report.not_found += 1;
            return;
        }
        Outcome::Transient(e) | Outcome::Fatal(e) => {
            warn!(city, error = %e, "air-quality fetch failed");
            report.failures += 1;
            return;
        }
    };

    let saved = serde_json::to_value(&measurement)
        .map_err(|e| IngestError::Write(e.to_string()))
        .and_then(|record| sink.upsert(ctx.db(), &record, now));

    match saved {
        Ok(outcome) => {
            info!(city, aqi = measurement.aqi, ?outcome, "air-quality data saved");
            report.upserted += 1;
        }
        Err(e) => {
            warn!(city, error = %e, "air-quality data not saved");
            report.failures += 1;
        }
    }
}
