use crate::config::{AppConfig, Endpoints};
use crate::auth::Credential;
use crate::db::Database;
use crate::fetchers::{ApiRequest, ApiResponse, FetchError, Transport};
use crate::pipeline::IngestContext;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

pub const AUTH_URL: &str = "https://auth.test/access_token";
pub const SEARCH_URL: &str = "https://api.test/offres/search";
pub const GEO_URL: &str = "https://owm.test/geo/1.0/direct";
pub const AIR_URL: &str = "https://owm.test/data/2.5/air_pollution";
pub const WAQI_BASE: &str = "https://waqi.test";

/// In-memory transport: responses are queued per URL and every request is
/// recorded. An unscripted call fails like a dropped connection.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<HashMap<String, VecDeque<Result<ApiResponse, FetchError>>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(&self, url: &str, status: u16, body: Value) {
        self.respond_raw(url, status, &body.to_string());
    }

    pub fn respond_raw(&self, url: &str, status: u16, body: &str) {
        self.push(
            url,
            Ok(ApiResponse {
                status,
                body: body.to_string(),
            }),
        );
    }

    pub fn fail(&self, url: &str, message: &str) {
        self.push(url, Err(FetchError::Network(message.to_string())));
    }

    fn push(&self, url: &str, response: Result<ApiResponse, FetchError>) {
        self.responses
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn requests_to(&self, url: &str) -> Vec<ApiRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.url == url)
            .cloned()
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, FetchError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .get_mut(&request.url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(FetchError::Network(format!("no scripted response for {}", request.url))))
    }
}

/// Config pointing every endpoint at the scripted transport, with all
/// credentials present.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_path: ":memory:".to_string(),
        listing_credential: Some(Credential::new("client-a", "s3cret")),
        openweather_api_key: Some("owm-key".to_string()),
        waqi_api_key: Some("waqi-key".to_string()),
        listing_communes: vec!["75056".to_string()],
        cities: vec!["Paris".to_string()],
        endpoints: Endpoints {
            auth: AUTH_URL.to_string(),
            listing_search: SEARCH_URL.to_string(),
            geocoding: GEO_URL.to_string(),
            air_pollution: AIR_URL.to_string(),
            station_feed: WAQI_BASE.to_string(),
        },
        ..AppConfig::default()
    }
}

pub fn test_context(config: AppConfig) -> IngestContext<ScriptedTransport> {
    let db = Database::open_in_memory().unwrap_or_else(|e| panic!("open test db: {e}"));
    IngestContext::with_parts(config, ScriptedTransport::new(), db)
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"))
}

/// `count` listing payloads with ids `offer-<first>`, `offer-<first+1>`, …
pub fn offers(first: u32, count: u32) -> Vec<Value> {
    (first..first + count)
        .map(|i| {
            json!({
                "id": format!("offer-{i}"),
                "intitule": format!("Offre {i}"),
                "dateCreation": "2024-03-14T09:00:00.000Z",
                "lieuTravail": {"libelle": "75 - Paris", "commune": "75056"}
            })
        })
        .collect()
}

pub fn air_pollution_body(aqi: i64, dt: i64) -> Value {
    json!({
        "coord": {"lon": 2.32, "lat": 48.8589},
        "list": [{
            "main": {"aqi": aqi},
            "components": {
                "co": 230.31, "no": 0.1, "no2": 12.5, "o3": 61.2,
                "so2": 1.4, "pm2_5": 5.5, "pm10": 7.9, "nh3": 0.8
            },
            "dt": dt
        }]
    })
}

pub fn station_feed_body(idx: i64, aqi: i64, iso: &str) -> Value {
    json!({
        "status": "ok",
        "data": {
            "idx": idx,
            "aqi": aqi,
            "dominentpol": "pm25",
            "time": {"s": "2024-03-15 10:00:00", "tz": "+01:00", "v": 1_710_496_800, "iso": iso},
            "city": {"geo": [45.76, 4.83], "name": "Lyon Centre, France", "url": "https://aqicn.org/city/france/lyon/centre"},
            "attributions": [{"url": "http://www.atmo-auvergnerhonealpes.fr/", "name": "Atmo AURA"}],
            "iaqi": {"pm25": {"v": aqi}, "no2": {"v": 9.2}},
            "forecast": {"daily": {"pm25": [{"avg": 40, "day": "2024-03-15", "max": 55, "min": 20}]}}
        }
    })
}
