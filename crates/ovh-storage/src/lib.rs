#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for client construction and storage requests.
pub const TRACING_TARGET_CLIENT: &str = "ovh_storage::client";

/// Tracing target for identity service authentication.
pub const TRACING_TARGET_AUTH: &str = "ovh_storage::auth";

/// Tracing target for HTTP responses.
pub const TRACING_TARGET_REQUEST: &str = "ovh_storage::request";

pub mod auth;
mod client;
mod config;
mod error;

#[cfg(test)]
mod mock;

pub use crate::auth::{AuthToken, Endpoint, IdentityVersion, Session};
pub use crate::client::{AUTH_TOKEN_HEADER, StorageClient, StorageEntry};
pub use crate::config::{DEFAULT_AUTH_URL, StorageConfig};
pub use crate::error::{Error, Result};
