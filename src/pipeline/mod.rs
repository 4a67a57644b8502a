pub mod air_quality;
pub mod context;
pub mod listings;
pub mod report;
pub mod schedule;
pub mod stations;

pub use context::IngestContext;
pub use report::CycleReport;

use crate::db::runs::{end_run, start_run};
use crate::fetchers::Transport;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::fmt;
use tracing::{info_span, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pipeline {
    Listings,
    AirQuality,
    Stations,
    All,
}

impl Pipeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pipeline::Listings => "listings",
            Pipeline::AirQuality => "air-quality",
            Pipeline::Stations => "stations",
            Pipeline::All => "all",
        }
    }

    /// The concrete pipelines this selection expands to, in run order.
    pub fn expand(self) -> Vec<Pipeline> {
        match self {
            Pipeline::All => vec![Pipeline::Listings, Pipeline::AirQuality, Pipeline::Stations],
            single => vec![single],
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run the selected pipelines one after another, each wrapped in a
/// run-log row.
pub fn run_cycle<T: Transport>(
    ctx: &IngestContext<T>,
    selection: Pipeline,
    now: DateTime<Utc>,
) -> Vec<(Pipeline, CycleReport)> {
    selection
        .expand()
        .into_iter()
        .map(|pipeline| (pipeline, run_logged(ctx, pipeline, now)))
        .collect()
}

fn run_logged<T: Transport>(ctx: &IngestContext<T>, pipeline: Pipeline, now: DateTime<Utc>) -> CycleReport {
    let _span = info_span!("cycle", pipeline = pipeline.as_str()).entered();

    let run_id = match ctx.db().with_conn(|conn| start_run(conn, pipeline.as_str(), now)) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "could not record run start");
            None
        }
    };

    let config = &ctx.config;
    let report = match pipeline {
        Pipeline::Listings => listings::run_listing_cycle(ctx, &config.listing_queries(), now),
        Pipeline::AirQuality => air_quality::run_air_quality_cycle(ctx, &config.cities, now),
        Pipeline::Stations => stations::run_station_cycle(ctx, &config.cities, now),
        Pipeline::All => CycleReport::default(),
    };

    if let Some(run_id) = run_id {
        let error = report.auth_failed.then(|| "credentials missing or rejected".to_string());
        let closed = ctx.db().with_conn(|conn| {
            end_run(conn, run_id, Utc::now(), report.totals(), report.succeeded(), error)
        });
        if let Err(e) = closed {
            warn!(error = %e, "could not record run end");
        }
    }

    report
}
