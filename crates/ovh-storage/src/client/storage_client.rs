//! Authenticated client for Swift object storage.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStream;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, HeaderMap, HeaderValue};
use reqwest::{Body, Client, Method, RequestBuilder};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};
use url::Url;

use super::headers::{APPLICATION_JSON, APPLICATION_OCTET_STREAM, MandatoryHeaders};
use super::request;
use super::storage_entry::StorageEntry;
use crate::auth::{AuthState, Session};
use crate::{Result, StorageConfig, TRACING_TARGET_AUTH, TRACING_TARGET_CLIENT};

/// Inner client that holds the HTTP client, configuration and auth state.
struct StorageClientInner {
    http: Client,
    config: StorageConfig,
    state: Mutex<AuthState>,
}

/// Client for an OpenStack Swift object store behind Keystone authentication.
///
/// The client authenticates lazily: the first data operation requests a
/// token and resolves the object-store endpoint of the configured region,
/// and every later call reuses them. Tokens are never refreshed; call
/// [`authenticate`] again to replace the session.
///
/// Clones share the same session.
///
/// # Examples
///
/// ```rust,no_run
/// use ovh_storage::{StorageClient, StorageConfig};
///
/// # async fn run() -> ovh_storage::Result<()> {
/// let config = StorageConfig::new(
///     "https://auth.cloud.ovh.net/v3",
///     "user",
///     "password",
///     "tenant-id",
///     "GRA",
/// );
/// let client = StorageClient::new(config)?;
///
/// client.create_container("backups").await?;
/// client.put_file("./dump.sql", "/backups/dump.sql", None).await?;
/// let entries = client.list_files("/backups").await?;
/// assert_eq!(entries.len(), 1);
/// # Ok(())
/// # }
/// ```
///
/// [`authenticate`]: StorageClient::authenticate
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    /// Creates a new client. No request is sent.
    ///
    /// The configuration is stored as given. Problems with it surface on the
    /// first authentication, so an unknown or empty region still reports the
    /// regions the catalog offers.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: StorageConfig) -> Result<Self> {
        debug!(
            target: TRACING_TARGET_CLIENT,
            auth_url = %config.auth_url,
            region = %config.region,
            identity_version = %config.identity_version,
            "Creating storage client"
        );

        let mut builder = Client::builder().user_agent(config.user_agent());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let inner = StorageClientInner {
            http,
            config,
            state: Mutex::new(AuthState::Unauthenticated),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.inner.config
    }

    /// Returns the current session, if the client has authenticated.
    pub async fn session(&self) -> Option<Session> {
        self.inner.state.lock().await.session().cloned()
    }

    /// Authenticates against the identity service and stores the session.
    ///
    /// This always sends a token request, replacing any existing session.
    /// On failure the previous state is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the response carries no usable
    /// token or catalog, or no object-store endpoint matches the region.
    pub async fn authenticate(&self) -> Result<Session> {
        let mut state = self.inner.state.lock().await;
        let session = self.request_session().await?;
        *state = AuthState::Authenticated(session.clone());
        Ok(session)
    }

    /// Returns the current session, authenticating first if there is none.
    ///
    /// The state lock is held while authenticating, so concurrent first
    /// calls share one token request.
    async fn ensure_session(&self) -> Result<Session> {
        let mut state = self.inner.state.lock().await;
        if let Some(session) = state.session() {
            return Ok(session.clone());
        }

        let session = self.request_session().await?;
        *state = AuthState::Authenticated(session.clone());
        Ok(session)
    }

    #[instrument(skip(self), target = TRACING_TARGET_AUTH, fields(region = %self.inner.config.region))]
    async fn request_session(&self) -> Result<Session> {
        let config = &self.inner.config;
        let version = config.identity_version;
        let url = Url::parse(&config.token_url())?;
        let body = version.request_body(config)?;

        debug!(
            target: TRACING_TARGET_AUTH,
            url = %url,
            identity_version = %version,
            "Requesting token"
        );

        let request = self
            .inner
            .http
            .post(url)
            .header(ACCEPT, APPLICATION_JSON)
            .json(&body);
        let response = request::send(request).await?;
        let headers = response.headers().clone();
        let body = request::json_body(response).await?;

        let identity = version.parse_response(&headers, body)?;
        let endpoint = identity
            .catalog
            .object_store()?
            .endpoint_for_region(&config.region)?;

        info!(
            target: TRACING_TARGET_AUTH,
            token = %identity.token,
            region = %endpoint.region,
            endpoint = %endpoint.url,
            "Authenticated"
        );

        Ok(Session {
            token: identity.token,
            endpoint,
        })
    }

    /// Builds a request against the session endpoint.
    fn request(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        headers: HeaderMap,
    ) -> Result<RequestBuilder> {
        let url = session.endpoint.join(path)?;

        debug!(
            target: TRACING_TARGET_CLIENT,
            method = %method,
            url = %url,
            "Sending storage request"
        );

        Ok(self.inner.http.request(method, url).headers(headers))
    }

    /// Lists a folder.
    ///
    /// An empty path lists the containers of the account, `/{container}`
    /// lists the objects of a container.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or the request fails.
    #[instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn list_files(&self, folder_path: &str) -> Result<Vec<StorageEntry>> {
        let session = self.ensure_session().await?;
        let headers = MandatoryHeaders::new(&session.token, APPLICATION_JSON)?.merge(None);

        let request = self.request(&session, Method::GET, folder_path, headers)?;
        let body = request::json_body(request::send(request).await?).await?;

        match body {
            Value::Null => Ok(Vec::new()),
            body => Ok(serde_json::from_value(body)?),
        }
    }

    /// Downloads an object and returns its exact content.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or the request fails.
    #[instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn get_file(&self, path: &str) -> Result<Bytes> {
        let session = self.ensure_session().await?;
        let headers = MandatoryHeaders::new(&session.token, APPLICATION_OCTET_STREAM)?.merge(None);

        let request = self.request(&session, Method::GET, path, headers)?;
        let content = request::send(request).await?.bytes().await?;

        debug!(
            target: TRACING_TARGET_CLIENT,
            size = content.len(),
            "Object downloaded"
        );

        Ok(content)
    }

    /// Uploads a local file to `path`.
    ///
    /// The file is streamed from disk; its size is sent as `Content-Length`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, or if authentication
    /// or the request fails.
    #[instrument(skip(self, local_path, headers), target = TRACING_TARGET_CLIENT, fields(local_path = %local_path.as_ref().display()))]
    pub async fn put_file(
        &self,
        local_path: impl AsRef<Path>,
        path: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<Value> {
        let file = tokio::fs::File::open(local_path.as_ref()).await?;
        let size = file.metadata().await?.len();

        let mut headers = headers.cloned().unwrap_or_default();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(size));

        self.put_stream(ReaderStream::new(file), path, Some(&headers))
            .await
    }

    /// Uploads a byte stream to `path`.
    ///
    /// The stream is sent as the request body as it is produced, without
    /// being collected first. Caller headers are sent along, except that
    /// `X-Auth-Token`, `Accept` and `content-type` are always set by the
    /// client.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or the request fails, including
    /// when the stream yields an error.
    #[instrument(skip(self, stream, headers), target = TRACING_TARGET_CLIENT)]
    pub async fn put_stream<S>(
        &self,
        stream: S,
        path: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<Value>
    where
        S: TryStream + Send + 'static,
        S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        Bytes: From<S::Ok>,
    {
        let session = self.ensure_session().await?;
        let headers = MandatoryHeaders::new(&session.token, APPLICATION_JSON)?
            .with_content_type(APPLICATION_OCTET_STREAM)
            .merge(headers);

        let request = self
            .request(&session, Method::PUT, path, headers)?
            .body(Body::wrap_stream(stream));
        request::json_body(request::send(request).await?).await
    }

    /// Deletes an object, or an empty container.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or the request fails.
    #[instrument(skip(self, headers), target = TRACING_TARGET_CLIENT)]
    pub async fn delete_file(&self, path: &str, headers: Option<&HeaderMap>) -> Result<Value> {
        let session = self.ensure_session().await?;
        let headers = MandatoryHeaders::new(&session.token, APPLICATION_JSON)?.merge(headers);

        let request = self.request(&session, Method::DELETE, path, headers)?;
        request::json_body(request::send(request).await?).await
    }

    /// Creates a container. Creating an existing container succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or the request fails.
    #[instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn create_container(&self, name: &str) -> Result<Value> {
        let session = self.ensure_session().await?;
        let headers = MandatoryHeaders::new(&session.token, APPLICATION_JSON)?.merge(None);

        let path = format!("/{name}");
        let request = self.request(&session, Method::PUT, &path, headers)?;
        request::json_body(request::send(request).await?).await
    }
}
