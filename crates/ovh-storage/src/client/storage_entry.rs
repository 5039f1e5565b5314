//! Entries of a JSON listing.

use serde::{Deserialize, Serialize};

/// One element of a container or account listing.
///
/// Listing the account root yields containers (`name`, `count`, `bytes`),
/// listing a container yields objects (`name`, `hash`, `bytes`,
/// `content_type`, `last_modified`) and, with a delimiter, pseudo-directories
/// (`subdir`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    /// Container or object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Pseudo-directory prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<String>,
    /// Number of objects in a container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Size in bytes of the object or of the container contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    /// MD5 hash of the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// MIME type of the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Last modification time as reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl StorageEntry {
    /// Returns the name, or the prefix for a pseudo-directory.
    pub fn key(&self) -> Option<&str> {
        self.name.as_deref().or(self.subdir.as_deref())
    }

    /// Returns whether this entry describes a container.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.count.is_some()
    }

    /// Returns whether this entry is a pseudo-directory.
    #[must_use]
    pub fn is_subdir(&self) -> bool {
        self.subdir.is_some()
    }
}
