mod resolver;

pub use resolver::GeoResolver;
