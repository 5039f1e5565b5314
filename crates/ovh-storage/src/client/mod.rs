//! Storage client module.
//!
//! This module provides the [`StorageClient`] and the request plumbing shared
//! by its operations: header construction and response handling.

mod headers;
mod request;
mod storage_client;
mod storage_entry;

pub use headers::AUTH_TOKEN_HEADER;
pub use storage_client::StorageClient;
pub use storage_entry::StorageEntry;
