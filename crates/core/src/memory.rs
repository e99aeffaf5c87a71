//! In-memory object store
//!
//! A [`ObjectStore`] backed by ordered maps. Keys are kept sorted so listings
//! come back in the same lexicographic order S3 uses. Versioning can be
//! switched on per bucket to exercise version and delete-marker handling.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use jiff::Timestamp;

use crate::error::{Error, Result};
use crate::traits::{ObjectInfo, ObjectStore, ObjectVersion};

/// Version ID S3 reports for objects in unversioned buckets
pub const NULL_VERSION: &str = "null";

#[derive(Debug, Clone, Default)]
struct StoredObject {
    data: Vec<u8>,
    content_type: Option<String>,
    version_id: String,
    last_modified: Option<Timestamp>,
}

#[derive(Debug, Default)]
struct MemoryBucket {
    versioned: bool,
    objects: BTreeMap<String, StoredObject>,
    /// Full history for versioned buckets, oldest first
    history: Vec<ObjectVersion>,
    /// Contents of every data version in `history`, by version id
    bodies: BTreeMap<String, StoredObject>,
}

impl MemoryBucket {
    fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.history.is_empty()
    }
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeMap<String, MemoryBucket>,
    next_version: u64,
}

impl State {
    fn bucket(&self, name: &str) -> Result<&MemoryBucket> {
        self.buckets
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Bucket not found: {name}")))
    }

    fn bucket_mut(&mut self, name: &str) -> Result<&mut MemoryBucket> {
        self.buckets
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(format!("Bucket not found: {name}")))
    }

    fn new_version_id(&mut self) -> String {
        self.next_version += 1;
        format!("v{:06}", self.next_version)
    }
}

/// Object store that keeps everything in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn on versioning for an existing bucket
    pub fn enable_versioning(&self, bucket: &str) -> Result<()> {
        self.lock()?.bucket_mut(bucket)?.versioned = true;
        Ok(())
    }

    /// Keys of the current (non-deleted) objects in a bucket
    pub fn keys(&self, bucket: &str) -> Result<Vec<String>> {
        Ok(self.lock()?.bucket(bucket)?.objects.keys().cloned().collect())
    }

    /// Content type recorded for an object
    pub fn content_type(&self, bucket: &str, key: &str) -> Result<Option<String>> {
        let state = self.lock()?;
        let object = state
            .bucket(bucket)?
            .objects
            .get(key)
            .ok_or_else(|| Error::NotFound(format!("{bucket}/{key}")))?;
        Ok(object.content_type.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::General("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let state = self.lock()?;
        let items = state
            .bucket(bucket)?
            .objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| {
                let mut info = ObjectInfo::new(key, object.data.len() as i64);
                info.last_modified = object.last_modified;
                info
            })
            .collect();
        Ok(items)
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectVersion>> {
        let state = self.lock()?;
        let bucket = state.bucket(bucket)?;

        if !bucket.versioned {
            let versions = bucket
                .objects
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, object)| {
                    let mut version =
                        ObjectVersion::data(key, NULL_VERSION, object.data.len() as i64);
                    version.is_latest = true;
                    version
                })
                .collect();
            return Ok(versions);
        }

        let mut versions: Vec<ObjectVersion> = bucket
            .history
            .iter()
            .filter(|v| v.key.starts_with(prefix))
            .cloned()
            .collect();
        // S3 orders by key, newest version first
        versions.reverse();
        versions.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(versions)
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.lock()?.buckets.contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.lock()?;
        if state.buckets.contains_key(bucket) {
            return Err(Error::Conflict(format!(
                "BucketAlreadyOwnedByYou: {bucket}"
            )));
        }
        state
            .buckets
            .insert(bucket.to_string(), MemoryBucket::default());
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.lock()?;
        if !state.bucket(bucket)?.is_empty() {
            return Err(Error::Conflict(format!("BucketNotEmpty: {bucket}")));
        }
        state.buckets.remove(bucket);
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let mut state = self.lock()?;
        let versioned = state.bucket(bucket)?.versioned;
        let version_id = if versioned {
            state.new_version_id()
        } else {
            NULL_VERSION.to_string()
        };
        let now = Timestamp::now();
        let size = data.len() as i64;

        let target = state.bucket_mut(bucket)?;
        if versioned {
            for entry in target.history.iter_mut().filter(|v| v.key == key) {
                entry.is_latest = false;
            }
            let mut version = ObjectVersion::data(key, &version_id, size);
            version.is_latest = true;
            version.last_modified = Some(now);
            target.history.push(version);
        }
        let object = StoredObject {
            data,
            content_type,
            version_id,
            last_modified: Some(now),
        };
        if versioned {
            target.bodies.insert(object.version_id.clone(), object.clone());
        }
        target.objects.insert(key.to_string(), object);

        let mut info = ObjectInfo::new(key, size);
        info.last_modified = Some(now);
        Ok(info)
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        let mut state = self.lock()?;
        let versioned = state.bucket(bucket)?.versioned;
        let mut deleted = Vec::with_capacity(keys.len());

        for key in keys {
            let marker_id = if versioned {
                Some(state.new_version_id())
            } else {
                None
            };
            let target = state.bucket_mut(bucket)?;
            target.objects.remove(&key);
            if let Some(marker_id) = marker_id {
                for entry in target.history.iter_mut().filter(|v| v.key == key) {
                    entry.is_latest = false;
                }
                let mut marker = ObjectVersion::delete_marker(&key, marker_id);
                marker.is_latest = true;
                target.history.push(marker);
            }
            deleted.push(key);
        }

        Ok(deleted)
    }

    async fn delete_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> Result<()> {
        let mut state = self.lock()?;
        let target = state.bucket_mut(bucket)?;

        if !target.versioned {
            let is_current = target
                .objects
                .get(key)
                .is_some_and(|object| object.version_id == version_id);
            if is_current {
                target.objects.remove(key);
            }
            return Ok(());
        }

        target
            .history
            .retain(|v| !(v.key == key && v.version_id == version_id));
        target.bodies.remove(version_id);

        // The newest surviving entry becomes current again
        let newest = target.history.iter_mut().rev().find(|v| v.key == key);
        let restored = match newest {
            Some(entry) => {
                entry.is_latest = true;
                if entry.is_delete_marker {
                    None
                } else {
                    target.bodies.get(&entry.version_id).cloned()
                }
            }
            None => None,
        };
        match restored {
            Some(object) => {
                target.objects.insert(key.to_string(), object);
            }
            None => {
                target.objects.remove(key);
            }
        }

        Ok(())
    }
}
