// src/auth/token.rs
use crate::errors::IngestError;
use crate::fetchers::models::TokenResponse;
use crate::fetchers::{ApiRequest, Transport};
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use tracing::{info, warn};

/// Scope requested for the job-offer search API.
pub const LISTING_SCOPE: &str = "api_offresdemploiv2 o2dsoffre";

#[derive(Clone)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

impl Credential {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: LISTING_SCOPE.to_string(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Bearer token obtained for one ingestion cycle. Never persisted.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn secret(&self) -> &str {
        &self.value
    }

    #[cfg(test)]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Client-credentials exchange against the authorization endpoint.
pub struct TokenProvider<'a> {
    transport: &'a dyn Transport,
    endpoint: &'a str,
}

impl<'a> TokenProvider<'a> {
    pub fn new(transport: &'a dyn Transport, endpoint: &'a str) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// Single attempt. Any failure is reported as [`IngestError::Auth`].
    pub fn obtain(&self, credential: &Credential) -> Result<AccessToken, IngestError> {
        let request = ApiRequest::post_form(self.endpoint)
            .form("grant_type", "client_credentials")
            .form("client_id", credential.client_id.as_str())
            .form("client_secret", credential.client_secret.as_str())
            .form("scope", credential.scope.as_str());

        let response = self
            .transport
            .send(&request)
            .and_then(|resp| resp.require_success())
            .map_err(|e| {
                warn!(error = %e, "token exchange failed");
                IngestError::Auth(e.to_string())
            })?;

        let parsed: TokenResponse = response
            .json()
            .map_err(|e| IngestError::Auth(e.to_string()))?;

        let value = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| IngestError::Auth("response has no access_token".into()))?;

        // An out-of-range lifetime is treated as no known expiry.
        let expires_at = parsed.expires_in.and_then(|secs| {
            Duration::try_seconds(secs).and_then(|ttl| Utc::now().checked_add_signed(ttl))
        });

        info!(client_id = %credential.client_id, ?expires_at, "obtained access token");
        Ok(AccessToken::new(value, expires_at))
    }
}
