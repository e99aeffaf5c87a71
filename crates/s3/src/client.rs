//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from bk-core.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier,
};

use bk_core::{Error, ObjectInfo, ObjectStore, ObjectVersion, Result, StoreConfig};

/// Region that rejects an explicit LocationConstraint
const DEFAULT_REGION: &str = "us-east-1";

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    region: Option<String>,
}

impl S3Client {
    /// Create a new S3 client from store settings
    ///
    /// Credentials come from the AWS default provider chain.
    pub async fn new(store: &StoreConfig) -> Result<Self> {
        store.validate()?;

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &store.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some(endpoint) = &store.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        if let Some(profile) = &store.profile {
            loader = loader.profile_name(profile);
        }

        let config = loader.load().await;
        let region = config.region().map(|r| r.to_string());

        // Custom endpoints are usually S3-compatible services that expect path-style
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(store.force_path_style || store.endpoint.is_some())
            .build();

        tracing::debug!(
            endpoint = store.endpoint.as_deref(),
            region = region.as_deref(),
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            region,
        })
    }

    fn location_constraint(&self) -> Option<CreateBucketConfiguration> {
        let region = self.region.as_deref()?;
        if region == DEFAULT_REGION {
            return None;
        }
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        )
    }
}

/// Map an SDK error onto the bk-core error kinds
///
/// `DisplayErrorContext` keeps the service error code (NoSuchBucket,
/// AccessDenied, ...) in the message, which is what the match looks at.
fn map_sdk_error<E>(err: E, resource: &str) -> Error
where
    E: std::error::Error,
{
    let message = DisplayErrorContext(err).to_string();
    if message.contains("NoSuchBucket")
        || message.contains("NoSuchKey")
        || message.contains("NotFound")
    {
        Error::NotFound(format!("{resource}: {message}"))
    } else if message.contains("AccessDenied")
        || message.contains("InvalidAccessKeyId")
        || message.contains("SignatureDoesNotMatch")
    {
        Error::Auth(message)
    } else if message.contains("BucketNotEmpty")
        || message.contains("BucketAlreadyExists")
        || message.contains("BucketAlreadyOwnedByYou")
    {
        Error::Conflict(message)
    } else if message.contains("dispatch failure")
        || message.contains("timed out")
        || message.contains("timeout")
        || message.contains("ServiceUnavailable")
        || message.contains("SlowDown")
    {
        Error::Network(message)
    } else {
        Error::General(message)
    }
}

fn timestamp(value: Option<&aws_sdk_s3::primitives::DateTime>) -> Option<jiff::Timestamp> {
    value.and_then(|t| jiff::Timestamp::new(t.secs(), t.subsec_nanos() as i32).ok())
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut items = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let response = self
                .inner
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| map_sdk_error(e, bucket))?;

            for object in response.contents() {
                let key = object.key().unwrap_or_default();
                let mut info = ObjectInfo::new(key, object.size().unwrap_or(0));
                info.last_modified = timestamp(object.last_modified());

                if let Some(etag) = object.e_tag() {
                    info.etag = Some(etag.trim_matches('"').to_string());
                }

                if let Some(sc) = object.storage_class() {
                    info.storage_class = Some(sc.as_str().to_string());
                }

                items.push(info);
            }

            tracing::debug!(bucket, prefix, page_items = response.contents().len(), "Listed page");

            if response.is_truncated().unwrap_or(false) {
                continuation_token = response.next_continuation_token().map(|s| s.to_string());
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        Ok(items)
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectVersion>> {
        let mut entries = Vec::new();
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let response = self
                .inner
                .list_object_versions()
                .bucket(bucket)
                .prefix(prefix)
                .set_key_marker(key_marker.take())
                .set_version_id_marker(version_id_marker.take())
                .send()
                .await
                .map_err(|e| map_sdk_error(e, bucket))?;

            for v in response.versions() {
                let (Some(key), Some(version_id)) = (v.key(), v.version_id()) else {
                    continue;
                };
                let mut version = ObjectVersion::data(key, version_id, v.size().unwrap_or(0));
                version.is_latest = v.is_latest().unwrap_or(false);
                version.last_modified = timestamp(v.last_modified());
                entries.push(version);
            }

            for dm in response.delete_markers() {
                let (Some(key), Some(version_id)) = (dm.key(), dm.version_id()) else {
                    continue;
                };
                let mut marker = ObjectVersion::delete_marker(key, version_id);
                marker.is_latest = dm.is_latest().unwrap_or(false);
                marker.last_modified = timestamp(dm.last_modified());
                entries.push(marker);
            }

            if !response.is_truncated().unwrap_or(false) {
                break;
            }
            key_marker = response.next_key_marker().map(|s| s.to_string());
            version_id_marker = response.next_version_id_marker().map(|s| s.to_string());
            if key_marker.is_none() {
                break;
            }
        }

        Ok(entries)
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.inner.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => match map_sdk_error(e, bucket) {
                Error::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(self.location_constraint())
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket))?;

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket))?;

        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let size = data.len() as i64;

        let response = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .set_content_type(content_type)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("{bucket}/{key}")))?;

        let mut info = ObjectInfo::new(key, size);
        if let Some(etag) = response.e_tag() {
            info.etag = Some(etag.trim_matches('"').to_string());
        }
        info.last_modified = Some(jiff::Timestamp::now());

        Ok(info)
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let objects = keys
            .iter()
            .map(|k| {
                ObjectIdentifier::builder()
                    .key(k)
                    .build()
                    .map_err(|e| Error::General(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(false)
            .build()
            .map_err(|e| Error::General(e.to_string()))?;

        let response = self
            .inner
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket))?;

        let deleted: Vec<String> = response
            .deleted()
            .iter()
            .filter_map(|d| d.key().map(|k| k.to_string()))
            .collect();

        if !response.errors().is_empty() {
            let error_keys: Vec<&str> = response.errors().iter().filter_map(|e| e.key()).collect();
            tracing::warn!("Failed to delete some objects: {:?}", error_keys);
        }

        Ok(deleted)
    }

    async fn delete_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .version_id(version_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("{bucket}/{key}@{version_id}")))?;

        Ok(())
    }
}
