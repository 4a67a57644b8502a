// config.rs
use crate::auth::Credential;
use crate::db::retention::DEFAULT_LISTING_RETENTION_DAYS;
use crate::domain::cities::{default_cities, parse_list};
use crate::domain::ListingQuery;
use crate::errors::IngestError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_DATABASE_PATH: &str = "harvest.sqlite3";
pub const DEFAULT_COMMUNES: &str = "75056";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Upstream base URLs. Overridable so a staging or mock server can stand in.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub auth: String,
    pub listing_search: String,
    pub geocoding: String,
    pub air_pollution: String,
    pub station_feed: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: "https://entreprise.pole-emploi.fr/connexion/oauth2/access_token?realm=/partenaire"
                .to_string(),
            listing_search: "https://api.pole-emploi.io/partenaire/offresdemploi/v2/offres/search"
                .to_string(),
            geocoding: "http://api.openweathermap.org/geo/1.0/direct".to_string(),
            air_pollution: "http://api.openweathermap.org/data/2.5/air_pollution".to_string(),
            station_feed: "https://api.waqi.info".to_string(),
        }
    }
}

/// Everything read from the environment at startup. Credentials are
/// optional here; a pipeline without its credential fails on its own.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub listing_credential: Option<Credential>,
    pub openweather_api_key: Option<String>,
    pub waqi_api_key: Option<String>,
    pub listing_communes: Vec<String>,
    pub published_since_days: Option<u32>,
    pub retention_days: i64,
    pub cities: Vec<String>,
    pub http_timeout: Duration,
    pub endpoints: Endpoints,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            listing_credential: None,
            openweather_api_key: None,
            waqi_api_key: None,
            listing_communes: parse_list(DEFAULT_COMMUNES),
            published_since_days: None,
            retention_days: DEFAULT_LISTING_RETENTION_DAYS,
            cities: default_cities(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            endpoints: Endpoints::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, IngestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(get: F) -> Result<Self, IngestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = AppConfig::default();

        if let Some(path) = get("DATABASE_PATH") {
            cfg.database_path = path;
        }

        // CLE_SECRETE is the name older .env files use for the secret.
        let secret = get("CLIENT_SECRET").or_else(|| get("CLE_SECRETE"));
        cfg.listing_credential = match (get("CLIENT_ID"), secret) {
            (Some(id), Some(secret)) => Some(Credential::new(id, secret)),
            _ => None,
        };
        cfg.openweather_api_key = get("OPENWEATHER_API_KEY");
        cfg.waqi_api_key = get("WAQI_API_KEY");

        if let Some(raw) = get("LISTING_COMMUNES") {
            cfg.listing_communes = parse_list(&raw);
        }
        if let Some(raw) = get("HARVEST_CITIES") {
            cfg.cities = parse_list(&raw);
        }

        cfg.published_since_days = get("LISTING_PUBLISHED_SINCE_DAYS")
            .map(|v| parse_number("LISTING_PUBLISHED_SINCE_DAYS", &v))
            .transpose()?;

        if let Some(v) = get("LISTING_RETENTION_DAYS") {
            cfg.retention_days = parse_number("LISTING_RETENTION_DAYS", &v)?;
            if cfg.retention_days <= 0 {
                return Err(IngestError::Config(
                    "LISTING_RETENTION_DAYS must be positive".into(),
                ));
            }
        }

        if let Some(v) = get("HTTP_TIMEOUT_SECS") {
            cfg.http_timeout = Duration::from_secs(parse_number("HTTP_TIMEOUT_SECS", &v)?);
        }

        for (key, slot) in [
            ("AUTH_URL", &mut cfg.endpoints.auth),
            ("LISTING_SEARCH_URL", &mut cfg.endpoints.listing_search),
            ("GEOCODING_URL", &mut cfg.endpoints.geocoding),
            ("AIR_POLLUTION_URL", &mut cfg.endpoints.air_pollution),
            ("STATION_FEED_URL", &mut cfg.endpoints.station_feed),
        ] {
            if let Some(value) = get(key) {
                Url::parse(&value)
                    .map_err(|e| IngestError::Config(format!("{key}: invalid URL {value}: {e}")))?;
                *slot = value;
            }
        }

        Ok(cfg)
    }

    pub fn listing_queries(&self) -> Vec<ListingQuery> {
        self.listing_communes
            .iter()
            .map(|c| ListingQuery::new(c.as_str()).published_since(self.published_since_days))
            .collect()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, IngestError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| IngestError::Config(format!("{key}: {value}: {e}")))
}
