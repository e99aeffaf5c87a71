//! Integration tests for the bk CLI against a real S3-compatible server
//!
//! Run with:
//! ```bash
//! docker run -d --name minio -p 9000:9000 \
//!     -e MINIO_ROOT_USER=accesskey -e MINIO_ROOT_PASSWORD=secretkey \
//!     minio/minio server /data
//!
//! TEST_S3_ENDPOINT=http://localhost:9000 \
//! TEST_S3_ACCESS_KEY=accesskey TEST_S3_SECRET_KEY=secretkey \
//!     cargo test --features integration
//! ```
//!
//! Without the TEST_S3_* variables every test skips.

#![cfg(feature = "integration")]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

struct TestEnv {
    config_dir: TempDir,
    endpoint: String,
    access_key: String,
    secret_key: String,
}

impl TestEnv {
    fn from_env() -> Option<Self> {
        Some(Self {
            config_dir: tempfile::tempdir().ok()?,
            endpoint: std::env::var("TEST_S3_ENDPOINT").ok()?,
            access_key: std::env::var("TEST_S3_ACCESS_KEY").ok()?,
            secret_key: std::env::var("TEST_S3_SECRET_KEY").ok()?,
        })
    }

    /// Run bk with credentials and endpoint pointing at the test server
    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_bk"))
            .args(args)
            .env("BK_CONFIG_DIR", self.config_dir.path())
            .env("BK_ENDPOINT", &self.endpoint)
            .env("BK_REGION", "us-east-1")
            .env("AWS_ACCESS_KEY_ID", &self.access_key)
            .env("AWS_SECRET_ACCESS_KEY", &self.secret_key)
            .env_remove("BK_PROFILE")
            .env_remove("AWS_PROFILE")
            .output()
            .expect("Failed to execute bk")
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let mut full = args.to_vec();
        full.push("--json");
        let output = self.run(&full);
        assert!(
            output.status.success(),
            "bk {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("Invalid JSON output")
    }

    /// Create a fresh bucket that is purged when the guard drops
    fn bucket(&self, name: &str) -> BucketGuard<'_> {
        let bucket = format!("bk-{name}-{}", unique_suffix());
        let output = self.run(&["mb", &bucket]);
        assert!(
            output.status.success(),
            "Failed to create bucket: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        BucketGuard { env: self, name: bucket }
    }

    fn write_file(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self.config_dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }
}

struct BucketGuard<'a> {
    env: &'a TestEnv,
    name: String,
}

impl BucketGuard<'_> {
    fn uri(&self, key: &str) -> String {
        format!("s3://{}/{key}", self.name)
    }

    fn put(&self, file: &Path, key: &str) {
        let output = self.env.run(&["put", &file.to_string_lossy(), &self.uri(key)]);
        assert!(
            output.status.success(),
            "Failed to upload {key}: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn keys(&self, prefix: &str, suffix: &str) -> Vec<String> {
        let json = self.env.run_json(&["ls", &self.uri(prefix), "--suffix", suffix]);
        json["items"]
            .as_array()
            .expect("items array")
            .iter()
            .map(|item| item["key"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl Drop for BucketGuard<'_> {
    fn drop(&mut self) {
        let _ = self.env.run(&["purge", &self.name]);
    }
}

fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:x}", duration.as_nanos() % 0xFFFF_FFFF)
}

macro_rules! test_env {
    () => {
        match TestEnv::from_env() {
            Some(env) => env,
            None => {
                eprintln!("Skipping: S3 test config not available");
                return;
            }
        }
    };
}

#[test]
fn test_ls_filters_by_suffix() {
    let env = test_env!();
    let bucket = env.bucket("ls");
    let file = env.write_file("payload.bin", "payload");

    for key in ["data/a.7z", "data/b.7z", "data/c.txt", "other/d.7z"] {
        bucket.put(&file, key);
    }

    assert_eq!(bucket.keys("data/", ".7z"), vec!["data/a.7z", "data/b.7z"]);
    assert_eq!(bucket.keys("data/", ""), vec!["data/a.7z", "data/b.7z", "data/c.txt"]);
    assert!(bucket.keys("missing/", "").is_empty());
}

#[test]
fn test_put_into_folder_uses_file_name() {
    let env = test_env!();
    let bucket = env.bucket("put");
    let file = env.write_file("report.json", "{}");

    let json = env.run_json(&["put", &file.to_string_lossy(), &bucket.uri("reports/")]);
    assert_eq!(json["target"], bucket.uri("reports/report.json"));
    assert_eq!(json["content_type"], "application/json");
    assert_eq!(bucket.keys("reports/", ""), vec!["reports/report.json"]);
}

#[test]
fn test_rm_removes_only_the_folder() {
    let env = test_env!();
    let bucket = env.bucket("rm");
    let file = env.write_file("payload.bin", "payload");

    for key in ["logs/a", "logs/b", "logs-old/c"] {
        bucket.put(&file, key);
    }

    let dry_run = env.run_json(&["rm", &bucket.uri("logs"), "--dry-run"]);
    assert_eq!(dry_run["total"], 2);
    assert_eq!(bucket.keys("", "").len(), 3);

    let json = env.run_json(&["rm", &bucket.uri("logs")]);
    assert_eq!(json["total"], 2);
    assert_eq!(bucket.keys("", ""), vec!["logs-old/c"]);
}

#[test]
fn test_mb_existing_bucket() {
    let env = test_env!();
    let bucket = env.bucket("mb");

    let output = env.run(&["mb", &bucket.name]);
    assert_eq!(output.status.code(), Some(6));

    let output = env.run(&["mb", "-p", &bucket.name]);
    assert!(output.status.success());
}

#[test]
fn test_purge_removes_bucket() {
    let env = test_env!();
    let bucket = env.bucket("purge");
    let file = env.write_file("payload.bin", "payload");
    bucket.put(&file, "a.txt");
    bucket.put(&file, "nested/b.txt");

    let json = env.run_json(&["purge", &bucket.uri("")]);
    assert_eq!(json["bucket"], bucket.name.as_str());

    let output = env.run(&["ls", &bucket.uri("")]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_ls_missing_bucket() {
    let env = test_env!();
    let output = env.run(&["ls", &format!("s3://bk-missing-{}/", unique_suffix())]);
    assert_eq!(output.status.code(), Some(5));
}
