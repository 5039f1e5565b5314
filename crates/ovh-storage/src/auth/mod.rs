//! Identity service authentication.
//!
//! Authentication exchanges the configured credentials for a token and a
//! service catalog. The identity API version is picked from configuration
//! through [`IdentityVersion`]; each version knows its token path, request
//! body and where the token and catalog live in the response.

mod catalog;
mod identity_v2;
mod identity_v3;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub use self::catalog::{
    CatalogEndpoint, CatalogService, Endpoint, OBJECT_STORE, ServiceCatalog,
};
pub use self::identity_v3::SUBJECT_TOKEN_HEADER;
use crate::{Result, StorageConfig};

/// Keystone identity API version used to authenticate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IdentityVersion {
    /// Identity API v2.0: `passwordCredentials`, token in the body.
    V2,
    /// Identity API v3: `password` method, token in `X-Subject-Token`.
    #[default]
    V3,
}

impl IdentityVersion {
    /// Returns the token endpoint path, relative to the identity URL.
    pub fn token_path(self) -> &'static str {
        match self {
            Self::V2 => identity_v2::TOKEN_PATH,
            Self::V3 => identity_v3::TOKEN_PATH,
        }
    }

    /// Builds the JSON body of the token request.
    pub fn request_body(self, config: &StorageConfig) -> Result<serde_json::Value> {
        let body = match self {
            Self::V2 => serde_json::to_value(identity_v2::AuthRequest::new(config))?,
            Self::V3 => serde_json::to_value(identity_v3::AuthRequest::new(config))?,
        };
        Ok(body)
    }

    /// Extracts the token and service catalog from a successful response.
    pub(crate) fn parse_response(
        self,
        headers: &HeaderMap,
        body: serde_json::Value,
    ) -> Result<Identity> {
        match self {
            Self::V2 => identity_v2::parse_response(body),
            Self::V3 => identity_v3::parse_response(headers, body),
        }
    }
}

/// Result of a token request before endpoint selection.
#[derive(Debug)]
pub(crate) struct Identity {
    pub token: AuthToken,
    pub catalog: ServiceCatalog,
}

/// Opaque token issued by the identity service.
///
/// `Debug` and `Display` only show a short prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a masked version of the token for logging.
    pub fn masked(&self) -> String {
        match self.0.get(..6) {
            Some(prefix) if self.0.len() > 12 => format!("{prefix}***"),
            _ => "***".to_string(),
        }
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthToken").field(&self.masked()).finish()
    }
}

impl std::fmt::Display for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Token and object-store endpoint produced by one authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Token sent as `X-Auth-Token`.
    pub token: AuthToken,
    /// Object-store endpoint of the configured region.
    pub endpoint: Endpoint,
}

/// Authentication state owned by a client.
///
/// Token and endpoint only exist together, inside [`Session`].
#[derive(Debug, Clone, Default)]
pub(crate) enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

impl AuthState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Unauthenticated => None,
            Self::Authenticated(session) => Some(session),
        }
    }
}
