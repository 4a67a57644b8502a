pub mod cities;
pub mod listing;
pub mod location;
pub mod measurement;

pub use listing::ListingQuery;
pub use location::Location;
pub use measurement::{Measurement, StationReading};
