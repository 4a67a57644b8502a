// station_feed.rs
use crate::domain::StationReading;
use crate::errors::IngestError;
use crate::fetchers::models::StationFeedResponse;
use crate::fetchers::{ApiRequest, FetchError, Transport};
use serde_json::Value;
use tracing::info;
use url::Url;

/// Station feed looked up by place name (`/feed/<place>/`).
pub struct StationFeedFetcher<'a> {
    transport: &'a dyn Transport,
    base_url: &'a str,
    api_key: &'a str,
}

impl<'a> StationFeedFetcher<'a> {
    pub fn new(transport: &'a dyn Transport, base_url: &'a str, api_key: &'a str) -> Self {
        Self {
            transport,
            base_url,
            api_key,
        }
    }

    pub fn feed_url(&self, place: &str) -> Result<String, IngestError> {
        let mut url = Url::parse(self.base_url)
            .map_err(|e| IngestError::Config(format!("station feed url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| IngestError::Config(format!("station feed url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["feed", place, ""]);
        Ok(url.to_string())
    }

    /// `Ok(None)` when the provider answers with a non-"ok" status.
    pub fn fetch(&self, place: &str) -> Result<Option<StationReading>, IngestError> {
        let request = ApiRequest::get(self.feed_url(place)?).query("token", self.api_key);

        let response = self.transport.send(&request)?.require_success()?;
        let parsed: StationFeedResponse = response.json()?;

        if parsed.status != "ok" {
            info!(place, status = %parsed.status, data = %parsed.data, "station feed unavailable");
            return Ok(None);
        }

        let Value::Object(mut data) = parsed.data else {
            return Err(FetchError::UnexpectedShape("feed data is not an object".into()).into());
        };
        let mut take = |key: &str| data.remove(key).unwrap_or(Value::Null);

        Ok(Some(StationReading {
            place: place.to_string(),
            idx: take("idx").as_i64(),
            aqi: take("aqi"),
            time: take("time"),
            city: take("city"),
            attributions: take("attributions"),
            iaqi: take("iaqi"),
            forecast: take("forecast"),
        }))
    }
}
