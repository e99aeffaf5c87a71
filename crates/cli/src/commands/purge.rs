//! purge command - Tear down a bucket
//!
//! Deletes every object version and delete marker, then whatever current
//! objects remain, then the bucket itself.

use bk_core::{PurgeReport, StoreConfig, bucket_from_arg, purge_bucket};
use clap::Args;

use super::connect;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, Spinner};

/// Delete a bucket and everything in it
#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Bucket name or S3 URI (s3://bucket)
    pub bucket: String,
}

/// Execute the purge command
pub async fn execute(args: PurgeArgs, store: &StoreConfig, output_config: OutputConfig) -> ExitCode {
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

    let spinner = Spinner::new(formatter.config(), &format!("Purging bucket '{bucket}'..."));
    let result = purge_bucket(&client, &bucket).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            print_report(&formatter, &report);
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Failed to purge bucket '{bucket}': {e}"));
            ExitCode::from(&e)
        }
    }
}

fn print_report(formatter: &Formatter, report: &PurgeReport) {
    if formatter.is_json() {
        formatter.json(report);
        return;
    }

    for failed in &report.versions.failed {
        formatter.warning(&format!(
            "Could not delete {} (version {}): {}",
            failed.key, failed.version_id, failed.error
        ));
    }
    formatter.success(&summary_line(report));
}

fn summary_line(report: &PurgeReport) -> String {
    format!(
        "Bucket '{}' deleted: {} version(s), {} delete marker(s), {} object(s) removed",
        report.bucket,
        report.versions.versions_deleted,
        report.versions.delete_markers_deleted,
        report.objects_deleted
    )
}
