//! Storage client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::IdentityVersion;
use crate::{Error, Result};

/// Identity endpoint of OVH Public Cloud.
pub const DEFAULT_AUTH_URL: &str = "https://auth.cloud.ovh.net/v3";

/// Configuration for a [`StorageClient`].
///
/// The first five fields are the account and location data used in the
/// authentication request. They are used verbatim and never persisted.
///
/// [`StorageClient`]: crate::StorageClient
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Base URL of the identity service (e.g. `https://auth.cloud.ovh.net/v3`)
    #[cfg_attr(
        feature = "config",
        arg(long = "ovh-storage-auth-url", env = "OVH_STORAGE_AUTH_URL", default_value = DEFAULT_AUTH_URL)
    )]
    pub auth_url: String,

    /// Account user name
    #[cfg_attr(
        feature = "config",
        arg(long = "ovh-storage-username", env = "OVH_STORAGE_USERNAME")
    )]
    pub username: String,

    /// Account password
    #[cfg_attr(
        feature = "config",
        arg(long = "ovh-storage-password", env = "OVH_STORAGE_PASSWORD", hide_env_values = true)
    )]
    #[serde(skip_serializing, default)]
    pub password: String,

    /// Project (tenant) identifier
    #[cfg_attr(
        feature = "config",
        arg(long = "ovh-storage-tenant-id", env = "OVH_STORAGE_TENANTID")
    )]
    pub tenant_id: String,

    /// Region whose object-store endpoint is used (e.g. `GRA`)
    #[cfg_attr(
        feature = "config",
        arg(long = "ovh-storage-region", env = "OVH_STORAGE_REGION")
    )]
    pub region: String,

    /// Identity API version used to authenticate
    #[cfg_attr(
        feature = "config",
        arg(
            long = "ovh-storage-identity-version",
            env = "OVH_STORAGE_IDENTITY_VERSION",
            value_enum,
            default_value_t = IdentityVersion::V3
        )
    )]
    #[serde(default)]
    pub identity_version: IdentityVersion,

    /// User-Agent header sent with every request (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "ovh-storage-user-agent", env = "OVH_STORAGE_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Total request timeout in seconds (optional, unset means no timeout)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "ovh-storage-request-timeout",
            env = "OVH_STORAGE_REQUEST_TIMEOUT_SECS"
        )
    )]
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl StorageConfig {
    /// Creates a new configuration using identity API v3.
    pub fn new(
        auth_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        tenant_id: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            auth_url: auth_url.into(),
            username: username.into(),
            password: password.into(),
            tenant_id: tenant_id.into(),
            region: region.into(),
            identity_version: IdentityVersion::default(),
            user_agent: None,
            request_timeout_secs: None,
        }
    }

    /// Sets the identity API version.
    #[must_use]
    pub fn with_identity_version(mut self, identity_version: IdentityVersion) -> Self {
        self.identity_version = identity_version;
        self
    }

    /// Sets the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the total request timeout in seconds.
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Returns the user agent, using `ovh-storage/<version>` if not set.
    pub fn user_agent(&self) -> String {
        match self.user_agent.as_deref() {
            Some(user_agent) if !user_agent.is_empty() => user_agent.to_owned(),
            _ => format!("ovh-storage/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Returns the request timeout as a Duration, if set and non-zero.
    #[inline]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Returns the URL of the token endpoint for the configured identity version.
    pub fn token_url(&self) -> String {
        format!(
            "{}{}",
            self.auth_url.trim_end_matches('/'),
            self.identity_version.token_path()
        )
    }

    /// Validates the configuration.
    ///
    /// The client does not call this; it is there for callers that want to
    /// reject an incomplete configuration before the first request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required field is empty or the identity
    /// URL is not an `http(s)` URL.
    pub fn validate(&self) -> Result<()> {
        if self.auth_url.is_empty() {
            return Err(Error::Config("Auth URL cannot be empty".to_string()));
        }

        let auth_url = Url::parse(&self.auth_url)
            .map_err(|e| Error::Config(format!("Invalid auth URL '{}': {}", self.auth_url, e)))?;
        if !matches!(auth_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Invalid auth URL scheme '{}', expected 'http' or 'https'",
                auth_url.scheme()
            )));
        }

        if self.username.is_empty() {
            return Err(Error::Config("Username cannot be empty".to_string()));
        }

        if self.password.is_empty() {
            return Err(Error::Config("Password cannot be empty".to_string()));
        }

        if self.region.is_empty() {
            return Err(Error::Config("Region cannot be empty".to_string()));
        }

        Ok(())
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("tenant_id", &self.tenant_id)
            .field("region", &self.region)
            .field("identity_version", &self.identity_version)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish_non_exhaustive()
    }
}
