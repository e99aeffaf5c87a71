//! Bucket lifecycle: creation, version purge and teardown
//!
//! Tearing down a versioned bucket takes more than deleting its objects:
//! every old version and delete marker has to go before S3 accepts the
//! DeleteBucket call. [`purge_bucket`] runs the whole sequence.

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::Result;
use crate::object::delete_listed;
use crate::traits::{ObjectStore, ObjectVersion};

/// Maximum number of version deletions in flight at once
pub const DELETE_CONCURRENCY: usize = 8;

/// A version that could not be deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedVersion {
    pub key: String,
    pub version_id: String,
    pub error: String,
}

/// Outcome of deleting every version of a bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionPurge {
    /// Object versions removed
    pub versions_deleted: usize,
    /// Delete markers removed
    pub delete_markers_deleted: usize,
    /// Versions the store refused to delete
    pub failed: Vec<FailedVersion>,
}

impl VersionPurge {
    fn record(&mut self, version: &ObjectVersion, outcome: Result<()>) {
        match outcome {
            Ok(()) if version.is_delete_marker => self.delete_markers_deleted += 1,
            Ok(()) => self.versions_deleted += 1,
            Err(e) => self.failed.push(FailedVersion {
                key: version.key.clone(),
                version_id: version.version_id.clone(),
                error: e.to_string(),
            }),
        }
    }

    fn merge(&mut self, other: VersionPurge) {
        self.versions_deleted += other.versions_deleted;
        self.delete_markers_deleted += other.delete_markers_deleted;
        self.failed.extend(other.failed);
    }
}

/// Report for a full bucket teardown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub bucket: String,
    #[serde(flatten)]
    pub versions: VersionPurge,
    /// Current objects removed while emptying the bucket
    pub objects_deleted: usize,
}

/// Create a bucket
pub async fn create_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<()> {
    store.create_bucket(bucket).await?;
    tracing::info!("Bucket {bucket} created successfully");
    Ok(())
}

/// Delete every version and delete marker in a bucket
///
/// A version that fails to delete is logged and recorded in the result; the
/// purge carries on with the rest. Listing failures are returned.
pub async fn delete_all_versions(store: &dyn ObjectStore, bucket: &str) -> Result<VersionPurge> {
    tracing::info!("Deleting all versions and delete markers from {bucket}");
    let versions = store.list_object_versions(bucket, "").await?;

    let outcomes: Vec<(ObjectVersion, Result<()>)> = stream::iter(versions)
        .map(|version| async move {
            tracing::debug!(
                "Deleting version {} of object {} from bucket {bucket}",
                version.version_id,
                version.key
            );
            let outcome = store
                .delete_object_version(bucket, &version.key, &version.version_id)
                .await;
            (version, outcome)
        })
        .buffer_unordered(DELETE_CONCURRENCY)
        .collect()
        .await;

    let mut purge = VersionPurge::default();
    for (version, outcome) in outcomes {
        if let Err(e) = &outcome {
            tracing::warn!(
                "Error deleting version {} of object {}: {e}",
                version.version_id,
                version.key
            );
        }
        purge.record(&version, outcome);
    }

    Ok(purge)
}

/// Empty whatever is left in a bucket, then delete it
///
/// Failures while emptying are logged; the error of the final DeleteBucket
/// call is returned.
pub async fn delete_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<(usize, VersionPurge)> {
    tracing::info!("Ensuring bucket {bucket} is empty and deleting it");

    let objects_deleted = match delete_listed(store, bucket, "").await {
        Ok(deleted) => deleted.len(),
        Err(e) => {
            tracing::warn!("Error ensuring bucket {bucket} is empty: {e}");
            0
        }
    };

    let leftovers = match delete_all_versions(store, bucket).await {
        Ok(purge) => purge,
        Err(e) => {
            tracing::warn!("Error ensuring bucket {bucket} is empty: {e}");
            VersionPurge::default()
        }
    };

    if let Err(e) = store.delete_bucket(bucket).await {
        tracing::error!("Error deleting bucket {bucket}: {e}");
        return Err(e);
    }
    tracing::info!("Bucket {bucket} has been deleted");

    Ok((objects_deleted, leftovers))
}

/// Delete all versions, delete markers and objects of a bucket, then the bucket
pub async fn purge_bucket(store: &dyn ObjectStore, bucket: &str) -> Result<PurgeReport> {
    tracing::info!("Deleting all contents of bucket {bucket}");

    let mut versions = delete_all_versions(store, bucket).await?;
    let (objects_deleted, leftovers) = delete_bucket(store, bucket).await?;
    versions.merge(leftovers);

    tracing::info!("All contents of bucket {bucket} have been deleted");

    Ok(PurgeReport {
        bucket: bucket.to_string(),
        versions,
        objects_deleted,
    })
}
