//! Object-level operations: upload and prefix deletion

use std::path::Path;

use crate::error::{Error, Result};
use crate::traits::{ObjectInfo, ObjectStore};

/// S3 accepts at most 1000 keys per DeleteObjects request
pub const MAX_DELETE_BATCH: usize = 1000;

/// Upload a local file
///
/// Without an explicit `object_name` the key is the file path as given, with
/// Windows separators turned into `/`.
pub async fn upload_file(
    store: &dyn ObjectStore,
    bucket: &str,
    path: &Path,
    object_name: Option<&str>,
    content_type: Option<String>,
) -> Result<ObjectInfo> {
    let key = match object_name {
        Some(name) => name.to_string(),
        None => path.to_string_lossy().replace('\\', "/"),
    };

    let data = tokio::fs::read(path).await?;

    match store.put_object(bucket, &key, data, content_type).await {
        Ok(info) => {
            tracing::info!("File {} uploaded to {bucket}/{key}", path.display());
            Ok(info)
        }
        Err(e) => {
            tracing::error!("Failed to upload {}: {e}", path.display());
            Err(e)
        }
    }
}

/// Delete every object under `prefix`
///
/// The prefix always gets a trailing `/`, so `logs` only matches the `logs/`
/// folder and never `logs-old/`. Returns the deleted keys.
pub async fn delete_prefix(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<String>> {
    let prefix = normalize_prefix(prefix)?;
    tracing::info!("Deleting all contents under prefix {prefix} in {bucket}");

    let result = delete_listed(store, bucket, &prefix).await;
    match &result {
        Ok(deleted) => tracing::info!(
            "Deleted {} object(s) under prefix {prefix} in {bucket}",
            deleted.len()
        ),
        Err(e) => tracing::error!("Failed to delete prefix contents: {e}"),
    }
    result
}

/// List `prefix` and delete what was found in batches
pub(crate) async fn delete_listed(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<String>> {
    let keys: Vec<String> = store
        .list_objects(bucket, prefix)
        .await?
        .into_iter()
        .map(|object| object.key)
        .collect();

    let mut deleted = Vec::with_capacity(keys.len());
    let mut failed = 0;
    for chunk in keys.chunks(MAX_DELETE_BATCH) {
        let removed = store.delete_objects(bucket, chunk.to_vec()).await?;
        tracing::debug!("Deleted {} of {} objects", removed.len(), chunk.len());
        failed += chunk.len().saturating_sub(removed.len());
        deleted.extend(removed);
    }

    if failed > 0 {
        return Err(Error::General(format!(
            "Failed to delete {failed} of {} keys under {prefix} in {bucket}",
            keys.len()
        )));
    }

    Ok(deleted)
}

/// Give a non-empty prefix the trailing `/` that scopes it to one folder
pub fn normalize_prefix(prefix: &str) -> Result<String> {
    if prefix.is_empty() || prefix == "/" {
        return Err(Error::InvalidPath(
            "Prefix cannot be empty; use purge to empty a whole bucket".into(),
        ));
    }

    if prefix.ends_with('/') {
        Ok(prefix.to_string())
    } else {
        Ok(format!("{prefix}/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::traits::MockObjectStore;
    use std::io::Write;
    use tempfile::NamedTempFile;

    async fn store_with(keys: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        store.create_bucket("b").await.unwrap();
        for key in keys {
            store
                .put_object("b", key, Vec::new(), None)
                .await
                .unwrap();
        }
        store
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("cps/happy_path").unwrap(), "cps/happy_path/");
        assert_eq!(normalize_prefix("cps/happy_path/").unwrap(), "cps/happy_path/");
        assert!(normalize_prefix("").is_err());
        assert!(normalize_prefix("/").is_err());
    }

    #[tokio::test]
    async fn test_delete_prefix_only_touches_folder() {
        let store = store_with(&["logs/a.txt", "logs/sub/b.txt", "logs-old/c.txt", "z.txt"]).await;

        let mut deleted = delete_prefix(&store, "b", "logs").await.unwrap();
        deleted.sort();

        assert_eq!(deleted, vec!["logs/a.txt", "logs/sub/b.txt"]);
        assert_eq!(store.keys("b").unwrap(), vec!["logs-old/c.txt", "z.txt"]);
    }

    #[tokio::test]
    async fn test_delete_prefix_nothing_to_delete() {
        let store = store_with(&["a.txt"]).await;
        let deleted = delete_prefix(&store, "b", "missing/").await.unwrap();
        assert!(deleted.is_empty());
    }

    #[tokio::test]
    async fn test_delete_prefix_batches_requests() {
        let keys: Vec<String> = (0..2500).map(|i| format!("bulk/{i:05}")).collect();
        let listed: Vec<ObjectInfo> = keys.iter().map(|k| ObjectInfo::new(k, 0)).collect();

        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .times(1)
            .returning(move |_, _| Ok(listed.clone()));
        store
            .expect_delete_objects()
            .times(3)
            .withf(|_, keys| keys.len() <= MAX_DELETE_BATCH)
            .returning(|_, keys| Ok(keys));

        let deleted = delete_prefix(&store, "b", "bulk/").await.unwrap();
        assert_eq!(deleted, keys);
    }

    #[tokio::test]
    async fn test_delete_prefix_propagates_errors() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .returning(|_, _| Err(Error::Auth("AccessDenied".into())));

        let err = delete_prefix(&store, "b", "data/").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn test_delete_prefix_fails_when_keys_survive() {
        let mut store = MockObjectStore::new();
        store
            .expect_list_objects()
            .returning(|_, _| Ok(vec![ObjectInfo::new("logs/a", 1), ObjectInfo::new("logs/b", 1)]));
        store
            .expect_delete_objects()
            .times(1)
            .returning(|_, keys| Ok(keys.into_iter().take(1).collect()));

        let err = delete_prefix(&store, "b", "logs/").await.unwrap_err();
        assert!(matches!(err, Error::General(_)));
        assert!(err.to_string().contains("1 of 2"), "{err}");
    }

    #[tokio::test]
    async fn test_upload_file_uses_path_as_default_key() {
        let store = store_with(&[]).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, b"a,b\n1,2\n").unwrap();

        let info = upload_file(&store, "b", &path, None, Some("text/csv".into()))
            .await
            .unwrap();

        let expected_key = path.to_string_lossy().replace('\\', "/");
        assert_eq!(info.key, expected_key);
        assert_eq!(info.size_bytes, Some(8));
        assert_eq!(
            store.content_type("b", &expected_key).unwrap().as_deref(),
            Some("text/csv")
        );
    }

    #[tokio::test]
    async fn test_upload_file_with_object_name() {
        let store = store_with(&[]).await;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"payload").unwrap();

        upload_file(&store, "b", file.path(), Some("incoming/payload.bin"), None)
            .await
            .unwrap();

        assert_eq!(store.keys("b").unwrap(), vec!["incoming/payload.bin"]);
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let store = store_with(&[]).await;
        let err = upload_file(&store, "b", Path::new("/no/such/file.bin"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
