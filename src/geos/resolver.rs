use crate::domain::Location;
use crate::errors::IngestError;
use crate::fetchers::models::GeoCandidate;
use crate::fetchers::{ApiRequest, Transport};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;

/// Place name → coordinates, via a direct geocoding lookup. Answers
/// (including "not found") are remembered for the life of the resolver.
pub struct GeoResolver<'a> {
    transport: &'a dyn Transport,
    endpoint: &'a str,
    api_key: &'a str,
    cache: RefCell<HashMap<String, Option<Location>>>,
}

impl<'a> GeoResolver<'a> {
    pub fn new(transport: &'a dyn Transport, endpoint: &'a str, api_key: &'a str) -> Self {
        Self {
            transport,
            endpoint,
            api_key,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// `Ok(None)` when the provider knows no such place. The first
    /// candidate always wins.
    pub fn resolve(&self, place: &str) -> Result<Option<Location>, IngestError> {
        if let Some(hit) = self.cache.borrow().get(place) {
            debug!(place, "geocoding cache hit");
            return Ok(hit.clone());
        }

        let request = ApiRequest::get(self.endpoint)
            .query("q", place)
            .query("limit", "1")
            .query("appid", self.api_key);

        let response = self.transport.send(&request)?.require_success()?;
        let candidates: Vec<GeoCandidate> = response.json()?;

        let location = candidates.into_iter().next().map(|c| Location {
            name: place.to_string(),
            latitude: c.lat,
            longitude: c.lon,
        });

        self.cache
            .borrow_mut()
            .insert(place.to_string(), location.clone());
        Ok(location)
    }
}
