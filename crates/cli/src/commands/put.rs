//! put command - Upload a local file
//!
//! A destination ending in `/` (or a bare bucket) is a folder: the file name
//! is appended to it. Anything else is used as the exact key.

use std::path::{Path, PathBuf};

use bk_core::{S3Uri, StoreConfig, parse_s3_uri, upload_file};
use clap::Args;
use serde::Serialize;

use super::connect;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Upload a file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub file: PathBuf,

    /// Destination S3 URI (s3://bucket/key or s3://bucket/prefix/)
    pub uri: String,

    /// Content type (guessed from the file extension by default)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

/// Execute the put command
pub async fn execute(args: PutArgs, store: &StoreConfig, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let uri = match parse_s3_uri(&args.uri) {
        Ok(uri) => uri,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    if !args.file.is_file() {
        formatter.error(&format!("Local file not found: {}", args.file.display()));
        return ExitCode::NotFound;
    }

    let target = match resolve_target(&uri, &args.file) {
        Some(target) => target,
        None => {
            formatter.error(&format!("Cannot derive a key from '{}'", args.file.display()));
            return ExitCode::UsageError;
        }
    };
    let content_type = args.content_type.or_else(|| guess_content_type(&args.file));

    let client = match connect(store, &formatter).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    let info = match upload_file(
        &client,
        &target.bucket,
        &args.file,
        Some(&target.key),
        content_type.clone(),
    )
    .await
    {
        Ok(info) => info,
        Err(e) => {
            formatter.error(&format!("Failed to upload {}: {e}", args.file.display()));
            return ExitCode::from(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&PutOutput {
            status: "success",
            source: args.file.display().to_string(),
            target: target.to_string(),
            size_bytes: info.size_bytes,
            content_type,
        });
    } else {
        formatter.success(&format!(
            "{} -> {target} ({})",
            args.file.display(),
            info.size_human.unwrap_or_default()
        ));
    }

    ExitCode::Success
}

/// Final object location for `file` uploaded to `uri`
fn resolve_target(uri: &S3Uri, file: &Path) -> Option<S3Uri> {
    if !uri.is_prefix() {
        return Some(uri.clone());
    }
    let name = file.file_name()?.to_str()?;
    Some(uri.join(name))
}

fn guess_content_type(file: &Path) -> Option<String> {
    mime_guess::from_path(file).first().map(|mime| mime.to_string())
}
