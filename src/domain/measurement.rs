// src/domain/measurement.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Latest air-pollution observation for a city. Stored keyed by `city`,
/// so a newer observation replaces the previous one.
#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub city: String,
    pub aqi: i64,
    pub co: Option<f64>,
    pub no: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub nh3: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

/// Station feed snapshot for a queried place. The nested blocks are kept
/// as returned by the provider.
#[derive(Debug, Clone, Serialize)]
pub struct StationReading {
    pub place: String,
    pub idx: Option<i64>,
    pub aqi: Value,
    pub time: Value,
    pub city: Value,
    pub attributions: Value,
    pub iaqi: Value,
    pub forecast: Value,
}
