pub mod connection;
pub mod documents;
pub mod retention;
pub mod runs;

pub use connection::Database;
pub use documents::UpsertSink;
pub use retention::RetentionSweeper;
