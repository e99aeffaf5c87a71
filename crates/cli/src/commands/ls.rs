//! ls command - List objects under a prefix
//!
//! `bk ls s3://bucket/data/ --suffix .7z` lists every key under `data/`
//! ending in `.7z`, the way a shell glob `data/*.7z` would.

use bk_core::{ObjectInfo, StoreConfig, list_with_suffix, parse_s3_uri};
use clap::Args;
use comfy_table::{Cell, CellAlignment, Table, presets};
use serde::Serialize;

use super::connect;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// S3 URI of the prefix to list (s3://bucket[/prefix])
    pub uri: String,

    /// Only show keys ending with this suffix
    #[arg(short, long, default_value = "")]
    pub suffix: String,

    /// Show totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    bucket: String,
    prefix: String,
    suffix: String,
    items: Vec<ObjectInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

impl Summary {
    fn of(items: &[ObjectInfo]) -> Self {
        let total_size_bytes: i64 = items.iter().filter_map(|i| i.size_bytes).sum();
        Self {
            total_objects: items.len(),
            total_size_bytes,
            total_size_human: humansize::format_size(total_size_bytes.max(0) as u64, humansize::BINARY),
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, store: &StoreConfig, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let uri = match parse_s3_uri(&args.uri) {
        Ok(uri) => uri,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    let client = match connect(store, &formatter).await {
        Ok(client) => client,
        Err(code) => return code,
    };

    let items = match list_with_suffix(&client, &uri.bucket, &uri.key, &args.suffix).await {
        Ok(items) => items,
        Err(e) => {
            formatter.error(&format!("Failed to list {uri}: {e}"));
            return ExitCode::from(&e);
        }
    };

    let summary = args.summarize.then(|| Summary::of(&items));

    if formatter.is_json() {
        formatter.json(&LsOutput {
            bucket: uri.bucket,
            prefix: uri.key,
            suffix: args.suffix,
            items,
            summary,
        });
        return ExitCode::Success;
    }

    if !items.is_empty() {
        formatter.println(&render_table(&items).to_string());
    }
    if let Some(summary) = summary {
        formatter.println(&format!(
            "Total: {} objects, {}",
            summary.total_objects, summary.total_size_human
        ));
    }

    ExitCode::Success
}

fn render_table(items: &[ObjectInfo]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(vec!["Last modified", "Size", "Key"]);

    for item in items {
        let date = item
            .last_modified
            .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        let size = item.size_human.clone().unwrap_or_else(|| "0 B".to_string());
        table.add_row(vec![
            Cell::new(date),
            Cell::new(size).set_alignment(CellAlignment::Right),
            Cell::new(&item.key),
        ]);
    }

    table
}
