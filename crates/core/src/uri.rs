//! S3 URI parsing
//!
//! An S3 URI has the form `s3://bucket[/key]`. Parsing is purely syntactic:
//! the key is kept byte-for-byte, percent sequences and spaces included.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::path::s3_join;

/// Literal scheme prefix every S3 URI starts with
pub const S3_SCHEME: &str = "s3://";

/// A bucket and key pair addressed by an `s3://` URI
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct S3Uri {
    /// Bucket name
    pub bucket: String,
    /// Object key or prefix (empty for the bucket root)
    pub key: String,
}

impl S3Uri {
    /// Create a new S3Uri from its parts
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether the key addresses a prefix rather than a single object
    pub fn is_prefix(&self) -> bool {
        self.key.is_empty() || self.key.ends_with('/')
    }

    /// Append a path segment to the key, staying in the same bucket
    pub fn join(&self, part: &str) -> Self {
        Self {
            bucket: self.bucket.clone(),
            key: s3_join([Some(self.key.as_str()), Some(part)]),
        }
    }
}

impl fmt::Display for S3Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{S3_SCHEME}{}/{}", self.bucket, self.key)
    }
}

impl FromStr for S3Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_s3_uri(s)
    }
}

/// Parse an `s3://bucket/key` string into an [`S3Uri`]
///
/// The bucket is everything up to the first `/` after the scheme; the key is
/// everything after that slash, unmodified. Without a slash the key is empty.
pub fn parse_s3_uri(uri: &str) -> Result<S3Uri> {
    let rest = uri
        .strip_prefix(S3_SCHEME)
        .ok_or_else(|| Error::InvalidScheme(uri.to_string()))?;

    let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));

    if bucket.is_empty() {
        return Err(Error::InvalidPath(format!(
            "Bucket name is missing in '{uri}'. Use format: s3://bucket[/key]"
        )));
    }

    Ok(S3Uri::new(bucket, key))
}

/// Resolve a bucket argument given either as a bare name or as an S3 URI
///
/// For URIs the scheme is stripped and the first path segment is used.
pub fn bucket_from_arg(arg: &str) -> Result<String> {
    let bucket = match arg.strip_prefix(S3_SCHEME) {
        Some(rest) => rest.split('/').next().unwrap_or_default(),
        None => arg,
    };

    if bucket.is_empty() {
        return Err(Error::InvalidPath("Bucket name cannot be empty".into()));
    }

    Ok(bucket.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_uri() {
        let uri = parse_s3_uri("s3://my-bucket/file.csv").unwrap();
        assert_eq!(uri, S3Uri::new("my-bucket", "file.csv"));
    }

    #[test]
    fn test_parse_nested_key() {
        let uri = parse_s3_uri("s3://bucket-name/folder/subfolder/file.txt").unwrap();
        assert_eq!(uri.bucket, "bucket-name");
        assert_eq!(uri.key, "folder/subfolder/file.txt");
    }

    #[test]
    fn test_parse_bucket_root_with_slash() {
        let uri = parse_s3_uri("s3://bucket-name/").unwrap();
        assert_eq!(uri, S3Uri::new("bucket-name", ""));
    }

    #[test]
    fn test_parse_bucket_without_slash() {
        let uri = parse_s3_uri("s3://bucket-name").unwrap();
        assert_eq!(uri, S3Uri::new("bucket-name", ""));
    }

    #[test]
    fn test_parse_keeps_trailing_slash() {
        let uri = parse_s3_uri("s3://bucket-name/nested/folder/").unwrap();
        assert_eq!(uri, S3Uri::new("bucket-name", "nested/folder/"));
        assert!(uri.is_prefix());
    }

    #[test]
    fn test_parse_does_not_decode() {
        let uri = parse_s3_uri("s3://bucket-name/with spaces and %20encoded").unwrap();
        assert_eq!(uri.key, "with spaces and %20encoded");
    }

    #[test]
    fn test_parse_keeps_interior_slashes() {
        let uri = parse_s3_uri("s3://bucket//double").unwrap();
        assert_eq!(uri.bucket, "bucket");
        assert_eq!(uri.key, "/double");
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        for input in [
            "http://my-bucket/path/to/file.csv",
            "gs://my-bucket/file.csv",
            "/local/path/to/file.csv",
            "bucket-name/key",
            "ftp://bucket/file.csv",
            "file://bucket-name/file.csv",
            "S3://bucket/key",
            "",
        ] {
            let err = parse_s3_uri(input).unwrap_err();
            assert!(matches!(err, Error::InvalidScheme(_)), "{input}");
            assert!(err.to_string().contains("Expected S3 URI"));
        }
    }

    #[test]
    fn test_parse_rejects_empty_bucket() {
        assert!(matches!(
            parse_s3_uri("s3://").unwrap_err(),
            Error::InvalidPath(_)
        ));
        assert!(matches!(
            parse_s3_uri("s3:///key").unwrap_err(),
            Error::InvalidPath(_)
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for input in [
            "s3://my-bucket/file.csv",
            "s3://bucket-name/",
            "s3://bucket-name/nested/folder/",
            "s3://bucket-name/with spaces and %20encoded",
        ] {
            let uri: S3Uri = input.parse().unwrap();
            assert_eq!(uri.to_string(), input);
        }
    }

    #[test]
    fn test_join() {
        let base = S3Uri::new("bucket", "data/");
        assert_eq!(base.join("file1.7z"), S3Uri::new("bucket", "data/file1.7z"));

        let root = S3Uri::new("bucket", "");
        assert_eq!(root.join("/file.csv"), S3Uri::new("bucket", "file.csv"));
    }

    #[test]
    fn test_is_prefix() {
        assert!(S3Uri::new("bucket", "").is_prefix());
        assert!(S3Uri::new("bucket", "dir/").is_prefix());
        assert!(!S3Uri::new("bucket", "dir/file").is_prefix());
    }

    #[test]
    fn test_bucket_from_arg() {
        assert_eq!(bucket_from_arg("archive").unwrap(), "archive");
        assert_eq!(bucket_from_arg("s3://archive").unwrap(), "archive");
        assert_eq!(bucket_from_arg("s3://archive/a/b.txt").unwrap(), "archive");
        assert!(bucket_from_arg("").is_err());
        assert!(bucket_from_arg("s3://").is_err());
    }
}
