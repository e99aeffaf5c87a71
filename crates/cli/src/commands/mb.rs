//! mb command - Make bucket
//!
//! Creates a bucket in the configured region.

use bk_core::{ObjectStore as _, StoreConfig, bucket_from_arg, create_bucket};
use clap::Args;
use serde::Serialize;

use super::connect;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Create a bucket
#[derive(Args, Debug)]
pub struct MbArgs {
    /// Bucket name or S3 URI (s3://bucket)
    pub bucket: String,

    /// Ignore error if bucket already exists
    #[arg(short = 'p', long)]
    pub ignore_existing: bool,
}

#[derive(Debug, Serialize)]
struct MbOutput {
    status: &'static str,
    bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Execute the mb command
pub async fn execute(args: MbArgs, store: &StoreConfig, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let bucket = match bucket_from_arg(&args.bucket) {
        Ok(bucket) => bucket,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let client = match connect(store, &formatter).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    if args.ignore_existing {
        match client.bucket_exists(&bucket).await {
            Ok(true) => {
                report(&formatter, bucket, Some("Bucket already exists"));
                return ExitCode::Success;
            }
            Ok(false) => {}
            Err(e) => {
                formatter.error(&format!("Failed to check bucket existence: {e}"));
                return ExitCode::from(&e);
            }
        }
    }

    match create_bucket(&client, &bucket).await {
        Ok(()) => {
            report(&formatter, bucket, None);
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to create bucket '{bucket}': {e}"));
            ExitCode::from(&e)
        }
    }
}

fn report(formatter: &Formatter, bucket: String, message: Option<&str>) {
    if formatter.is_json() {
        formatter.json(&MbOutput {
            status: "success",
            bucket,
            message: message.map(str::to_string),
        });
    } else {
        formatter.success(&human_message(&bucket, message.is_some()));
    }
}

fn human_message(bucket: &str, existed: bool) -> String {
    if existed {
        format!("Bucket '{bucket}' already exists.")
    } else {
        format!("Bucket '{bucket}' created successfully.")
    }
}
