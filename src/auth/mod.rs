pub mod token;

pub use token::{AccessToken, Credential, TokenProvider};
