//! Request header construction.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::auth::AuthToken;
use crate::{Error, Result};

/// Header carrying the token on storage requests.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

pub(crate) const APPLICATION_JSON: &str = "application/json";
pub(crate) const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Headers every storage request must carry.
#[derive(Debug, Clone)]
pub(crate) struct MandatoryHeaders {
    headers: HeaderMap,
}

impl MandatoryHeaders {
    /// Starts from the auth token and the `Accept` value.
    pub fn new(token: &AuthToken, accept: &'static str) -> Result<Self> {
        let mut token = HeaderValue::from_str(token.as_str())
            .map_err(|e| Error::InvalidHeader(format!("{AUTH_TOKEN_HEADER}: {e}")))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(HeaderName::from_static(AUTH_TOKEN_HEADER), token);
        headers.insert(ACCEPT, HeaderValue::from_static(accept));

        Ok(Self { headers })
    }

    /// Adds a `content-type` header.
    #[must_use]
    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self
    }

    /// Builds a fresh header map from the caller's headers and these ones.
    ///
    /// A mandatory header replaces every caller value with the same name.
    pub fn merge(&self, extra: Option<&HeaderMap>) -> HeaderMap {
        let mut merged = extra.cloned().unwrap_or_default();
        for (name, value) in &self.headers {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }
}
