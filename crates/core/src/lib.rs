//! bk-core: Core library for the bk S3 utilities
//!
//! This crate provides:
//! - S3 URI parsing and key joining
//! - Suffix-filtered listing under a prefix
//! - Prefix deletion, uploads and bucket teardown
//! - The ObjectStore trait those operations run against
//! - Configuration management
//!
//! Nothing here depends on a specific S3 SDK; the `bk-s3` crate provides
//! the AWS implementation and [`memory::MemoryStore`] an in-memory one.

pub mod bucket;
pub mod config;
pub mod error;
pub mod listing;
pub mod memory;
pub mod object;
pub mod path;
pub mod traits;
pub mod uri;

pub use bucket::{PurgeReport, VersionPurge, create_bucket, delete_all_versions, purge_bucket};
pub use config::{Config, ConfigManager, StoreConfig};
pub use error::{Error, Result};
pub use listing::list_with_suffix;
pub use memory::MemoryStore;
pub use object::{delete_prefix, normalize_prefix, upload_file};
pub use path::s3_join;
pub use traits::{ObjectInfo, ObjectStore, ObjectVersion};
pub use uri::{S3Uri, bucket_from_arg, parse_s3_uri};
