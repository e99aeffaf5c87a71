//! CLI command definitions and execution
//!
//! Each subcommand lives in its own module with an `Args` struct and an
//! `execute` function returning an [`ExitCode`].

use bk_core::{ConfigManager, StoreConfig};
use bk_s3::S3Client;
use clap::{Args, Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod completions;
mod join;
mod ls;
mod mb;
mod purge;
mod put;
mod rm;

/// bk - S3 bucket utilities
///
/// List, upload, delete and tear down objects in S3-compatible storage
/// addressed with s3://bucket/key URIs.
#[derive(Parser, Debug)]
#[command(name = "bk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection overrides applied on top of the config file
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Custom S3 endpoint URL
    #[arg(long, global = true, env = "BK_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Region (also used as LocationConstraint when creating buckets)
    #[arg(long, global = true, env = "BK_REGION")]
    pub region: Option<String>,

    /// Named AWS profile
    #[arg(long, global = true, env = "BK_PROFILE")]
    pub profile: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, global = true, default_value = "false")]
    pub path_style: bool,
}

impl StoreArgs {
    fn as_store_config(&self) -> StoreConfig {
        StoreConfig {
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            profile: self.profile.clone(),
            force_path_style: self.path_style,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List objects under a prefix, optionally filtered by suffix
    Ls(ls::LsArgs),

    /// Upload a local file
    Put(put::PutArgs),

    /// Remove every object under a prefix
    Rm(rm::RmArgs),

    /// Create a bucket
    Mb(mb::MbArgs),

    /// Delete all versions, delete markers and objects of a bucket, then the bucket
    Purge(purge::PurgeArgs),

    /// Join key segments into a single S3 key
    Join(join::JoinArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let mut output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
        force_color: false,
    };

    // Commands that never touch the store run without a config file
    let store = match &cli.command {
        Commands::Join(_) | Commands::Completions(_) => StoreConfig::default(),
        _ => match load_settings(&cli.store, &mut output_config) {
            Ok(store) => store,
            Err(code) => return code,
        },
    };

    match cli.command {
        Commands::Ls(args) => ls::execute(args, &store, output_config).await,
        Commands::Put(args) => put::execute(args, &store, output_config).await,
        Commands::Rm(args) => rm::execute(args, &store, output_config).await,
        Commands::Mb(args) => mb::execute(args, &store, output_config).await,
        Commands::Purge(args) => purge::execute(args, &store, output_config).await,
        Commands::Join(args) => join::execute(args, output_config),
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Load the config file, seed output defaults and merge store overrides
fn load_settings(
    overrides: &StoreArgs,
    output_config: &mut OutputConfig,
) -> Result<StoreConfig, ExitCode> {
    let config = ConfigManager::new()
        .and_then(|manager| manager.load())
        .map_err(|e| {
            Formatter::new(output_config.clone())
                .error(&format!("Failed to load configuration: {e}"));
            ExitCode::UsageError
        })?;

    output_config.apply_defaults(&config.defaults);
    Ok(config.store.merged(&overrides.as_store_config()))
}

/// Build an S3 client, reporting failures through the formatter
async fn connect(store: &StoreConfig, formatter: &Formatter) -> Result<S3Client, ExitCode> {
    S3Client::new(store).await.map_err(|e| {
        formatter.error(&format!("Failed to create S3 client: {e}"));
        ExitCode::from(&e)
    })
}
