pub mod air_quality;
mod fetch_error;
pub mod listings;
pub mod models;
pub mod station_feed;
mod transport;

pub use air_quality::AirQualityFetcher;
pub use fetch_error::FetchError;
pub use listings::ListingFetcher;
pub use station_feed::StationFeedFetcher;
pub use transport::{ApiRequest, HttpTransport, Transport};

#[cfg(test)]
pub use transport::{ApiResponse, Method};
