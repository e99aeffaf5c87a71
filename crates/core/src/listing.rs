//! Suffix-filtered listing
//!
//! The glob-like listing used to pick files such as `data/*.7z` out of a
//! bucket: a prefix scopes the store query, a suffix filters the result.

use crate::error::Result;
use crate::traits::{ObjectInfo, ObjectStore};

/// List objects under `prefix` whose key ends with `suffix`
///
/// Every call issues a fresh query; the store's listing order (lexicographic
/// by key for S3) is preserved. Store errors are returned unchanged.
pub async fn list_with_suffix(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    suffix: &str,
) -> Result<Vec<ObjectInfo>> {
    let objects = store.list_objects(bucket, prefix).await?;
    let total = objects.len();

    let matched: Vec<ObjectInfo> = objects
        .into_iter()
        .filter(|object| object.key.ends_with(suffix))
        .collect();

    tracing::debug!(
        bucket,
        prefix,
        suffix,
        total,
        matched = matched.len(),
        "Listed objects by suffix"
    );

    Ok(matched)
}
