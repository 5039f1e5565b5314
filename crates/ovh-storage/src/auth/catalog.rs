//! Service catalog returned by the identity service.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Catalog service type of the object store.
pub const OBJECT_STORE: &str = "object-store";

/// Interface preferred when a region exposes several endpoints.
const PUBLIC_INTERFACE: &str = "public";

/// Service catalog, normalized across identity API versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    /// Services listed in the catalog, in response order.
    pub services: Vec<CatalogService>,
}

/// One service entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogService {
    /// Service type, e.g. `object-store` or `identity`.
    pub service_type: String,
    /// Service name, if the catalog provides one.
    pub name: Option<String>,
    /// Endpoints of this service.
    pub endpoints: Vec<CatalogEndpoint>,
}

/// One endpoint of a catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEndpoint {
    /// Region name, e.g. `GRA`.
    pub region: String,
    /// Base URL of the service in this region.
    pub url: String,
    /// Interface (`public`, `internal`, `admin`), when the catalog provides one.
    pub interface: Option<String>,
}

/// Resolved object-store endpoint for the configured region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Region the endpoint belongs to.
    pub region: String,
    /// Base URL all data operations are issued against.
    pub url: String,
    /// Interface of the endpoint, if known.
    pub interface: Option<String>,
}

impl ServiceCatalog {
    /// Creates a catalog from a list of services.
    pub fn new(services: Vec<CatalogService>) -> Self {
        Self { services }
    }

    /// Returns the first service of the given type.
    pub fn service(&self, service_type: &str) -> Option<&CatalogService> {
        self.services
            .iter()
            .find(|service| service.service_type == service_type)
    }

    /// Returns the object-store service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceNotFound`] if the catalog has no `object-store` entry.
    pub fn object_store(&self) -> Result<&CatalogService> {
        self.service(OBJECT_STORE)
            .ok_or_else(|| Error::ServiceNotFound {
                service_type: OBJECT_STORE.to_string(),
            })
    }
}

impl CatalogService {
    /// Returns every region listed by this service, in catalog order, without duplicates.
    pub fn regions(&self) -> Vec<String> {
        let mut regions: Vec<String> = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            if !regions.contains(&endpoint.region) {
                regions.push(endpoint.region.clone());
            }
        }
        regions
    }

    /// Selects the endpoint of the given region.
    ///
    /// When the region has several endpoints the `public` interface wins,
    /// otherwise the first one in catalog order is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegionNotFound`] listing every available region if
    /// no endpoint matches.
    pub fn endpoint_for_region(&self, region: &str) -> Result<Endpoint> {
        let mut matching = self.endpoints.iter().filter(|e| e.region == region);
        let first = matching.next().ok_or_else(|| Error::RegionNotFound {
            region: region.to_string(),
            available: self.regions(),
        })?;

        let selected = std::iter::once(first)
            .chain(matching)
            .find(|e| e.interface.as_deref() == Some(PUBLIC_INTERFACE))
            .unwrap_or(first);

        Ok(Endpoint::from(selected.clone()))
    }
}

impl From<CatalogEndpoint> for Endpoint {
    fn from(endpoint: CatalogEndpoint) -> Self {
        Self {
            region: endpoint.region,
            url: endpoint.url,
            interface: endpoint.interface,
        }
    }
}

impl Endpoint {
    /// Builds the URL of `path` under this endpoint.
    ///
    /// The path is appended verbatim after the base URL, so it should start
    /// with `/` (an empty path addresses the account itself).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the result is not a valid URL.
    pub fn join(&self, path: &str) -> Result<Url> {
        let base = self.url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }
}
