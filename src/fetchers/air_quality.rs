// air_quality.rs
use crate::domain::{Location, Measurement};
use crate::errors::IngestError;
use crate::fetchers::models::AirPollutionResponse;
use crate::fetchers::{ApiRequest, FetchError, Transport};
use chrono::DateTime;

/// Current air-pollution observation by coordinate.
pub struct AirQualityFetcher<'a> {
    transport: &'a dyn Transport,
    endpoint: &'a str,
    api_key: &'a str,
}

impl<'a> AirQualityFetcher<'a> {
    pub fn new(transport: &'a dyn Transport, endpoint: &'a str, api_key: &'a str) -> Self {
        Self {
            transport,
            endpoint,
            api_key,
        }
    }

    /// `Ok(None)` when the provider has no observation for the point.
    pub fn fetch(&self, location: &Location) -> Result<Option<Measurement>, IngestError> {
        let request = ApiRequest::get(self.endpoint)
            .query("lat", location.latitude.to_string())
            .query("lon", location.longitude.to_string())
            .query("appid", self.api_key);

        let response = self.transport.send(&request)?.require_success()?;
        let parsed: AirPollutionResponse = response.json()?;

        let Some(entry) = parsed.list.into_iter().next() else {
            return Ok(None);
        };

        let observed_at = DateTime::from_timestamp(entry.dt, 0).ok_or_else(|| {
            FetchError::UnexpectedShape(format!("observation time out of range: {}", entry.dt))
        })?;

        let c = entry.components;
        Ok(Some(Measurement {
            city: location.name.clone(),
            aqi: entry.main.aqi,
            co: c.co,
            no: c.no,
            no2: c.no2,
            o3: c.o3,
            so2: c.so2,
            pm2_5: c.pm2_5,
            pm10: c.pm10,
            nh3: c.nh3,
            observed_at,
        }))
    }
}
