//! In-process Keystone and Swift server for client tests.
//!
//! Serves both identity API versions under `/v3` and `/v2.0`, and an
//! in-memory object store under `/swift/{region}`. Every region in the
//! catalog also gets an unreachable `internal` endpoint.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{IdentityVersion, StorageConfig};

pub(crate) const USERNAME: &str = "mock-user";
pub(crate) const PASSWORD: &str = "mock-password";
pub(crate) const TENANT_ID: &str = "mock-tenant";
pub(crate) const REGIONS: [&str; 3] = ["GRA", "SBG", "BHS"];

#[derive(Default)]
struct Store {
    containers: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    last_put_headers: Option<HeaderMap>,
    last_auth_body: Option<Value>,
    last_auth_headers: Option<HeaderMap>,
}

struct MockState {
    base_url: String,
    auth_calls: AtomicUsize,
    tokens: Mutex<Vec<String>>,
    store: Mutex<Store>,
}

type SharedState = Arc<MockState>;

/// Running mock server, stopped when the test runtime shuts down.
#[derive(Clone)]
pub(crate) struct MockServer {
    addr: SocketAddr,
    state: SharedState,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            base_url: format!("http://{addr}"),
            auth_calls: AtomicUsize::new(0),
            tokens: Mutex::new(Vec::new()),
            store: Mutex::new(Store::default()),
        });

        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Configuration accepted by the mock for the given version and region.
    pub fn config(&self, version: IdentityVersion, region: &str) -> StorageConfig {
        let auth_url = match version {
            IdentityVersion::V2 => format!("{}/v2.0", self.base_url()),
            IdentityVersion::V3 => format!("{}/v3", self.base_url()),
        };
        StorageConfig::new(auth_url, USERNAME, PASSWORD, TENANT_ID, region)
            .with_identity_version(version)
    }

    pub fn auth_calls(&self) -> usize {
        self.state.auth_calls.load(Ordering::SeqCst)
    }

    pub fn last_put_headers(&self) -> Option<HeaderMap> {
        self.state.store.lock().unwrap().last_put_headers.clone()
    }

    pub fn last_auth_body(&self) -> Option<Value> {
        self.state.store.lock().unwrap().last_auth_body.clone()
    }

    pub fn last_auth_headers(&self) -> Option<HeaderMap> {
        self.state.store.lock().unwrap().last_auth_headers.clone()
    }

    pub fn object(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        let store = self.state.store.lock().unwrap();
        store.containers.get(container)?.get(name).cloned()
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/v3/auth/tokens", post(auth_v3))
        .route("/v2.0/tokens", post(auth_v2))
        .route("/swift/{region}", get(list_containers))
        .route("/swift/{region}/broken", get(error_envelope))
        .route(
            "/swift/{region}/{container}",
            get(list_objects)
                .put(create_container)
                .delete(delete_container),
        )
        .route(
            "/swift/{region}/{container}/{*object}",
            get(get_object).put(put_object).delete(delete_object),
        )
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": {
                "message": "The request you have made requires authentication.",
                "code": 401,
                "title": "Unauthorized"
            }
        })),
    )
        .into_response()
}

fn issue_token(state: &MockState, headers: &HeaderMap, body: &Value) -> String {
    let n = state.auth_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let token = format!("mock-token-{n:04}-{}", "x".repeat(16));
    state.tokens.lock().unwrap().push(token.clone());

    let mut store = state.store.lock().unwrap();
    store.last_auth_body = Some(body.clone());
    store.last_auth_headers = Some(headers.clone());
    token
}

async fn auth_v3(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let identity = &body["auth"]["identity"];
    let user = &identity["password"]["user"];
    let valid = identity["methods"] == json!(["password"])
        && user["name"] == USERNAME
        && user["password"] == PASSWORD
        && user["domain"]["name"] == "Default"
        && identity["tenantId"] == TENANT_ID;
    if !valid {
        return unauthorized();
    }

    let token = issue_token(&state, &headers, &body);
    let endpoints: Vec<Value> = REGIONS
        .iter()
        .flat_map(|region| {
            [
                json!({
                    "region": region,
                    "region_id": region,
                    "interface": "internal",
                    "url": format!("http://10.255.255.1/swift/{region}"),
                }),
                json!({
                    "region": region,
                    "region_id": region,
                    "interface": "public",
                    "url": format!("{}/swift/{region}", state.base_url),
                }),
            ]
        })
        .collect();

    let mut response = (
        StatusCode::CREATED,
        Json(json!({
            "token": {
                "methods": ["password"],
                "expires_at": "2026-10-15T12:00:00.000000Z",
                "catalog": [
                    { "type": "identity", "name": "keystone", "endpoints": [] },
                    { "type": "object-store", "name": "swift", "endpoints": endpoints }
                ]
            }
        })),
    )
        .into_response();

    let token = HeaderValue::from_str(&token).unwrap();
    response.headers_mut().insert("x-subject-token", token);
    response
}

async fn auth_v2(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = &body["auth"];
    let valid = auth["passwordCredentials"]["username"] == USERNAME
        && auth["passwordCredentials"]["password"] == PASSWORD
        && auth["tenantId"] == TENANT_ID;
    if !valid {
        return unauthorized();
    }

    let token = issue_token(&state, &headers, &body);
    let endpoints: Vec<Value> = REGIONS
        .iter()
        .map(|region| {
            json!({
                "region": region,
                "publicURL": format!("{}/swift/{region}", state.base_url),
                "internalURL": format!("http://10.255.255.1/swift/{region}"),
            })
        })
        .collect();

    Json(json!({
        "access": {
            "token": { "id": token, "expires": "2026-10-15T12:00:00Z" },
            "serviceCatalog": [
                { "type": "object-store", "name": "swift", "endpoints": endpoints }
            ]
        }
    }))
    .into_response()
}

fn authorized(state: &MockState, headers: &HeaderMap, region: &str) -> bool {
    let Some(token) = headers.get("x-auth-token").and_then(|v| v.to_str().ok()) else {
        return false;
    };
    REGIONS.contains(&region) && state.tokens.lock().unwrap().iter().any(|t| t == token)
}

async fn list_containers(
    State(state): State<SharedState>,
    Path(region): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers, &region) {
        return unauthorized();
    }

    let store = state.store.lock().unwrap();
    let containers: Vec<Value> = store
        .containers
        .iter()
        .map(|(name, objects)| {
            json!({
                "name": name,
                "count": objects.len(),
                "bytes": objects.values().map(Vec::len).sum::<usize>(),
            })
        })
        .collect();
    Json(containers).into_response()
}

async fn error_envelope(Path(_region): Path<String>) -> Response {
    Json(json!({ "error": { "message": "Container is being replicated" } })).into_response()
}

async fn list_objects(
    State(state): State<SharedState>,
    Path((region, container)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers, &region) {
        return unauthorized();
    }

    let store = state.store.lock().unwrap();
    let Some(objects) = store.containers.get(&container) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if objects.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let objects: Vec<Value> = objects
        .iter()
        .map(|(name, data)| {
            json!({
                "name": name,
                "bytes": data.len(),
                "hash": "mock",
                "content_type": "application/octet-stream",
                "last_modified": "2026-10-14T09:12:44.118450",
            })
        })
        .collect();
    Json(objects).into_response()
}

async fn create_container(
    State(state): State<SharedState>,
    Path((region, container)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers, &region) {
        return unauthorized();
    }

    let mut store = state.store.lock().unwrap();
    if store.containers.contains_key(&container) {
        return (
            StatusCode::ACCEPTED,
            "<html><h1>Accepted</h1><p>The request is accepted for processing.</p></html>",
        )
            .into_response();
    }
    store.containers.insert(container, BTreeMap::new());
    StatusCode::CREATED.into_response()
}

async fn delete_container(
    State(state): State<SharedState>,
    Path((region, container)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers, &region) {
        return unauthorized();
    }

    let mut store = state.store.lock().unwrap();
    match store.containers.get(&container) {
        None => StatusCode::NOT_FOUND.into_response(),
        Some(objects) if !objects.is_empty() => StatusCode::CONFLICT.into_response(),
        Some(_) => {
            store.containers.remove(&container);
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

async fn get_object(
    State(state): State<SharedState>,
    Path((region, container, object)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers, &region) {
        return unauthorized();
    }

    let store = state.store.lock().unwrap();
    match store.containers.get(&container).and_then(|c| c.get(&object)) {
        Some(data) => data.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_object(
    State(state): State<SharedState>,
    Path((region, container, object)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !authorized(&state, &headers, &region) {
        return unauthorized();
    }

    let mut store = state.store.lock().unwrap();
    store.last_put_headers = Some(headers);
    let Some(objects) = store.containers.get_mut(&container) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    objects.insert(object, body.to_vec());
    StatusCode::CREATED.into_response()
}

async fn delete_object(
    State(state): State<SharedState>,
    Path((region, container, object)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers, &region) {
        return unauthorized();
    }

    let mut store = state.store.lock().unwrap();
    match store
        .containers
        .get_mut(&container)
        .and_then(|c| c.remove(&object))
    {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
