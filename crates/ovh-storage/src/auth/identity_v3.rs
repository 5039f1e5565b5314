//! Keystone identity API v3 (`POST /auth/tokens`).
//!
//! The token is returned in the `X-Subject-Token` response header and the
//! catalog under `token.catalog`.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use super::catalog::{CatalogEndpoint, CatalogService, ServiceCatalog};
use super::{AuthToken, Identity};
use crate::{Error, Result, StorageConfig};

/// Path of the token endpoint, relative to the identity URL.
pub const TOKEN_PATH: &str = "/auth/tokens";

/// Response header carrying the issued token.
pub const SUBJECT_TOKEN_HEADER: &str = "x-subject-token";

/// Domain the user belongs to.
const DEFAULT_DOMAIN: &str = "Default";

#[derive(Debug, Serialize)]
pub(crate) struct AuthRequest<'a> {
    auth: Auth<'a>,
}

#[derive(Debug, Serialize)]
struct Auth<'a> {
    identity: IdentityRequest<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRequest<'a> {
    methods: [&'static str; 1],
    password: PasswordMethod<'a>,
    tenant_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordMethod<'a> {
    user: User<'a>,
}

#[derive(Debug, Serialize)]
struct User<'a> {
    name: &'a str,
    domain: Domain,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct Domain {
    name: &'static str,
}

impl<'a> AuthRequest<'a> {
    pub(crate) fn new(config: &'a StorageConfig) -> Self {
        Self {
            auth: Auth {
                identity: IdentityRequest {
                    methods: ["password"],
                    password: PasswordMethod {
                        user: User {
                            name: &config.username,
                            domain: Domain {
                                name: DEFAULT_DOMAIN,
                            },
                            password: &config.password,
                        },
                    },
                    tenant_id: &config.tenant_id,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: TokenBody,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    #[serde(default)]
    catalog: Vec<Service>,
}

#[derive(Debug, Deserialize)]
struct Service {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    endpoints: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ServiceEndpoint {
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    interface: Option<String>,
}

impl ServiceEndpoint {
    /// Endpoints without a region or URL can never be selected and are dropped.
    fn into_catalog_endpoint(self) -> Option<CatalogEndpoint> {
        Some(CatalogEndpoint {
            region: self.region.filter(|region| !region.is_empty())?,
            url: self.url.filter(|url| !url.is_empty())?,
            interface: self.interface,
        })
    }
}

impl From<Service> for CatalogService {
    fn from(service: Service) -> Self {
        Self {
            service_type: service.service_type,
            name: service.name,
            endpoints: service
                .endpoints
                .into_iter()
                .flatten()
                .filter_map(|e| serde_json::from_value::<ServiceEndpoint>(e).ok())
                .filter_map(ServiceEndpoint::into_catalog_endpoint)
                .collect(),
        }
    }
}

/// Extracts the token and catalog from a v3 token response.
pub(crate) fn parse_response(headers: &HeaderMap, body: serde_json::Value) -> Result<Identity> {
    let token = headers
        .get(SUBJECT_TOKEN_HEADER)
        .ok_or_else(|| Error::Authentication("Missing X-Subject-Token header".to_string()))?
        .to_str()
        .map_err(|_| Error::Authentication("X-Subject-Token header is not valid text".to_string()))?;

    if token.is_empty() {
        return Err(Error::Authentication("Empty X-Subject-Token header".to_string()));
    }

    let response: TokenResponse = serde_json::from_value(body)?;
    let catalog = ServiceCatalog::new(
        response
            .token
            .catalog
            .into_iter()
            .map(CatalogService::from)
            .collect(),
    );

    Ok(Identity {
        token: AuthToken::new(token),
        catalog,
    })
}
