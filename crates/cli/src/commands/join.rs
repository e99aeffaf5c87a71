//! join command - Join key segments
//!
//! `bk join data/ /2024 file.7z` prints `data/2024/file.7z`. Handy in shell
//! scripts that build keys from variables which may or may not carry slashes.

use bk_core::s3_join;
use clap::Args;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Join key segments
#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Segments to join; empty segments are skipped
    #[arg(required = true, allow_hyphen_values = true)]
    pub parts: Vec<String>,
}

#[derive(Debug, Serialize)]
struct JoinOutput {
    key: String,
}

/// Execute the join command
pub fn execute(args: JoinArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let key = s3_join(args.parts.iter().map(|part| Some(part.as_str())));

    if formatter.is_json() {
        formatter.json(&JoinOutput { key });
    } else {
        formatter.println(&key);
    }

    ExitCode::Success
}
