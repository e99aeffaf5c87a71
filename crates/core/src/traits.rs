//! ObjectStore trait definition
//!
//! This trait is the store capability every operation in this crate is
//! written against. The S3 adapter implements it on top of the AWS SDK and
//! [`crate::memory::MemoryStore`] implements it in memory for tests.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata for a stored object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,

    /// Size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Storage class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for an object of known size
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            size_human: Some(humansize::format_size(size.max(0) as u64, humansize::BINARY)),
            last_modified: None,
            etag: None,
            storage_class: None,
        }
    }
}

/// One entry of a bucket's version history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectVersion {
    /// Object key
    pub key: String,

    /// Version ID ("null" for objects written before versioning was enabled)
    pub version_id: String,

    /// Whether this is the current version of the key
    pub is_latest: bool,

    /// Whether this entry is a delete marker rather than object data
    pub is_delete_marker: bool,

    /// Size in bytes (None for delete markers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

impl ObjectVersion {
    /// Create a version entry holding object data
    pub fn data(key: impl Into<String>, version_id: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            version_id: version_id.into(),
            is_latest: false,
            is_delete_marker: false,
            size_bytes: Some(size),
            last_modified: None,
        }
    }

    /// Create a delete marker entry
    pub fn delete_marker(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: version_id.into(),
            is_latest: false,
            is_delete_marker: true,
            size_bytes: None,
            last_modified: None,
        }
    }
}

/// Trait for S3-compatible storage operations
///
/// Listing methods return every matching entry in the store's native order;
/// pagination is the implementation's concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all objects whose key starts with `prefix`
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// List all versions and delete markers whose key starts with `prefix`
    async fn list_object_versions(&self, bucket: &str, prefix: &str)
    -> Result<Vec<ObjectVersion>>;

    /// Check if a bucket exists
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Create a bucket
    async fn create_bucket(&self, bucket: &str) -> Result<()>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Upload an object
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo>;

    /// Delete up to 1000 objects in one request, returning the deleted keys
    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>>;

    /// Permanently delete one version or delete marker
    async fn delete_object_version(&self, bucket: &str, key: &str, version_id: &str)
    -> Result<()>;
}
