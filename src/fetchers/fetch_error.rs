use thiserror::Error;

/// Failures talking to an upstream API, before any pipeline semantics apply.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("unexpected data shape: {0}")]
    UnexpectedShape(String),
}

const BODY_SNIPPET_CHARS: usize = 200;

impl FetchError {
    pub fn unexpected_status(status: u16, body: &str) -> Self {
        let body = if body.chars().count() > BODY_SNIPPET_CHARS {
            let cut: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
            format!("{cut}…")
        } else {
            body.to_string()
        };
        FetchError::UnexpectedStatus { status, body }
    }
}
