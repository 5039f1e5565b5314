//! Error types for ovh-storage operations.

use reqwest::StatusCode;

/// Result type alias for ovh-storage operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for object storage operations.
///
/// Every failure is returned to the caller of the operation that triggered
/// it. Nothing is retried at this layer.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request URL could not be built from the endpoint and path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header name or value could not be represented.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Network-level failure reported by the HTTP client.
    ///
    /// The underlying error is kept as-is.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The service answered with a status outside `200..=299`.
    #[error("{}", format_status(.status, .reason.as_deref()))]
    Status {
        /// HTTP status code of the response.
        status: StatusCode,
        /// Status text sent by the server, or the canonical one for the code.
        reason: Option<String>,
    },

    /// A successful response carrying an `error` envelope.
    #[error("{0}")]
    Service(String),

    /// The identity service response could not be used.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The service catalog has no entry of the requested type.
    #[error("No service of type {service_type} found in catalog")]
    ServiceNotFound {
        /// Catalog service type that was looked up.
        service_type: String,
    },

    /// No catalog endpoint matches the configured region.
    #[error(
        "No endpoint for region {region} found! Possible regions are: {}",
        .available.join(",")
    )]
    RegionNotFound {
        /// Region from the configuration.
        region: String,
        /// Every region present in the catalog entry, in catalog order.
        available: Vec<String>,
    },

    /// JSON (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_status(status: &StatusCode, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

impl Error {
    /// Creates a status error, preferring the server's status text over the
    /// canonical reason phrase.
    pub(crate) fn status_with_reason(status: StatusCode, reason: Option<String>) -> Self {
        let reason = reason
            .filter(|reason| !reason.is_empty())
            .or_else(|| status.canonical_reason().map(str::to_owned));
        Self::Status { status, reason }
    }

    /// Returns whether the error came from the HTTP transport.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns whether the service answered with a non-2xx status.
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Returns whether no catalog endpoint matched the configured region.
    pub fn is_region_not_found(&self) -> bool {
        matches!(self, Self::RegionNotFound { .. })
    }

    /// Returns the HTTP status code, if the error carries one.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}
