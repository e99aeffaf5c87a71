//! rm command - Remove every object under a prefix
//!
//! The prefix is treated as a folder: `s3://bucket/logs` removes `logs/...`
//! but leaves `logs-old/...` alone.

use bk_core::{StoreConfig, delete_prefix, list_with_suffix, normalize_prefix, parse_s3_uri};
use clap::Args;
use serde::Serialize;

use super::connect;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove objects under a prefix
#[derive(Args, Debug)]
pub struct RmArgs {
    /// S3 URI of the prefix to remove (s3://bucket/prefix)
    pub uri: String,

    /// Only show what would be deleted (dry run)
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    bucket: String,
    prefix: String,
    deleted: Vec<String>,
    total: usize,
}

impl RmOutput {
    fn new(dry_run: bool, bucket: String, prefix: String, keys: Vec<String>) -> Self {
        Self {
            status: if dry_run { "dry-run" } else { "success" },
            bucket,
            prefix,
            total: keys.len(),
            deleted: keys,
        }
    }
}

/// Execute the rm command
pub async fn execute(args: RmArgs, store: &StoreConfig, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let uri = match parse_s3_uri(&args.uri) {
        Ok(uri) => uri,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let folder = match normalize_prefix(&uri.key) {
        Ok(folder) => folder,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let client = match connect(store, &formatter).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    let result = if args.dry_run {
        list_with_suffix(&client, &uri.bucket, &folder, "")
            .await
            .map(|items| items.into_iter().map(|item| item.key).collect::<Vec<_>>())
    } else {
        delete_prefix(&client, &uri.bucket, &folder).await
    };

    let keys: Vec<String> = match result {
        Ok(keys) => keys,
        Err(e) => {
            formatter.error(&format!("Failed to remove {uri}: {e}"));
            return ExitCode::from(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&RmOutput::new(args.dry_run, uri.bucket, folder, keys));
    } else if args.dry_run {
        for key in &keys {
            formatter.println(&format!("Would remove: s3://{}/{key}", uri.bucket));
        }
    } else if keys.is_empty() {
        formatter.warning(&format!("No objects found under s3://{}/{folder}", uri.bucket));
    } else {
        formatter.success(&format!(
            "Removed {} object(s) under s3://{}/{folder}",
            keys.len(),
            uri.bucket
        ));
    }

    ExitCode::Success
}
