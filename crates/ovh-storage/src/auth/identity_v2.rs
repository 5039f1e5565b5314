//! Keystone identity API v2.0 (`POST /tokens`).
//!
//! The token and catalog are both returned in the body, under `access`.

use serde::{Deserialize, Serialize};

use super::catalog::{CatalogEndpoint, CatalogService, ServiceCatalog};
use super::{AuthToken, Identity};
use crate::{Error, Result, StorageConfig};

/// Path of the token endpoint, relative to the identity URL.
pub const TOKEN_PATH: &str = "/tokens";

#[derive(Debug, Serialize)]
pub(crate) struct AuthRequest<'a> {
    auth: Auth<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Auth<'a> {
    password_credentials: PasswordCredentials<'a>,
    tenant_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

impl<'a> AuthRequest<'a> {
    pub(crate) fn new(config: &'a StorageConfig) -> Self {
        Self {
            auth: Auth {
                password_credentials: PasswordCredentials {
                    username: &config.username,
                    password: &config.password,
                },
                tenant_id: &config.tenant_id,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccessResponse {
    access: Access,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Access {
    token: Token,
    #[serde(default)]
    service_catalog: Vec<Service>,
}

#[derive(Debug, Deserialize)]
struct Token {
    id: String,
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
    #[serde(default, rename = "publicURL")]
    public_url: Option<String>,
}

impl ServiceEndpoint {
    /// Endpoints without a region or public URL are dropped.
    fn into_catalog_endpoint(self) -> Option<CatalogEndpoint> {
        Some(CatalogEndpoint {
            region: self.region.filter(|region| !region.is_empty())?,
            url: self.public_url.filter(|url| !url.is_empty())?,
            interface: None,
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

/// Extracts the token and catalog from a v2.0 access response.
pub(crate) fn parse_response(body: serde_json::Value) -> Result<Identity> {
    let response: AccessResponse = serde_json::from_value(body)?;

    if response.access.token.id.is_empty() {
        return Err(Error::Authentication("Empty access token".to_string()));
    }

    let catalog = ServiceCatalog::new(
        response
            .access
            .service_catalog
            .into_iter()
            .map(CatalogService::from)
            .collect(),
    );

    Ok(Identity {
        token: AuthToken::new(response.access.token.id),
        catalog,
    })
}
