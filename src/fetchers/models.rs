use serde::Deserialize;
use serde_json::Value;

// Upstream response shapes. Only the fields we read are modelled; listing
// payloads and station feeds stay as raw `Value`s.

// token response
//  ├── access_token
//  ├── expires_in
//  └── token_type
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
}

// listing search page
//  └── resultats[]   (opaque offers, each with an `id`)
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub resultats: Vec<Value>,
}

// geocoding
//  [] ── name, lat, lon, country, state
#[derive(Debug, Deserialize)]
pub struct GeoCandidate {
    pub lat: f64,
    pub lon: f64,
}

// air pollution
//  └── list[]
//       ├── main.aqi
//       ├── components.{co,no,no2,o3,so2,pm2_5,pm10,nh3}
//       └── dt (unix seconds)
#[derive(Debug, Deserialize)]
pub struct AirPollutionResponse {
    #[serde(default)]
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionEntry {
    pub main: AirPollutionMain,
    pub components: Components,
    pub dt: i64,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionMain {
    pub aqi: i64,
}

#[derive(Debug, Deserialize)]
pub struct Components {
    pub co: Option<f64>,
    pub no: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub nh3: Option<f64>,
}

// station feed
//  ├── status ("ok" | "error")
//  └── data
//       ├── idx, aqi, dominentpol
//       ├── time.{s,tz,v,iso}
//       ├── city.{geo,name,url}
//       ├── attributions[]
//       ├── iaqi.{co,h,no2,o3,p,pm10,pm25,so2,t,w}.v
//       └── forecast.daily.{o3,pm10,pm25,uvi}[]
#[derive(Debug, Deserialize)]
pub struct StationFeedResponse {
    pub status: String,
    #[serde(default)]
    pub data: Value,
}
