//! stash operator CLI entry point.
//!
//! Inspects and prunes a result cache directory. Logging goes to stderr so
//! that the JSON printed on stdout stays machine-readable.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use stash_core::{CacheConfig, DirStore};
use tracing_subscriber::EnvFilter;

use crate::commands::{FingerprintParams, PurgeParams, ShowParams};
use crate::error::CliError;

mod commands;
mod error;

#[derive(Parser)]
#[command(name = "stash", version)]
#[command(about = "Inspect and prune the result cache used for expensive API calls")]
struct Cli {
    /// Cache root directory. Overrides STASH_CACHE_DIR and the config file.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Namespace subdirectory to operate on. Overrides STASH_NAMESPACE.
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the content fingerprint a file is cached under
    Key {
        /// File to hash
        file: PathBuf,
    },
    /// List stored entries
    List,
    /// Print one stored entry
    Show {
        /// Hex digest, name:<id> or batch:<id>
        key: String,
    },
    /// Delete one entry so the next run recomputes it
    Remove {
        /// Hex digest, name:<id> or batch:<id>
        key: String,
    },
    /// Delete every entry in the namespace
    Clear,
    /// Entry count, total size and namespaces
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config = resolve_config(cli.cache_dir, cli.namespace)?;
    let store = open_store(&config)?;
    tracing::debug!(dir = %store.dir().display(), "Using cache directory");

    match cli.command {
        Command::Key { file } => to_json(&commands::fingerprint_impl(FingerprintParams { file }).await?),
        Command::List => to_json(&commands::list_impl(&store).await?),
        Command::Show { key } => to_json(&commands::show_impl(&store, ShowParams { key }).await?),
        Command::Remove { key } => {
            to_json(&commands::purge_impl(&store, PurgeParams { key: Some(key), all: false }).await?)
        }
        Command::Clear => to_json(&commands::purge_impl(&store, PurgeParams { key: None, all: true }).await?),
        Command::Stats => to_json(&commands::stats_impl(&store).await?),
    }
}

/// Loaded configuration with the command-line flags applied, validated once.
fn resolve_config(cache_dir: Option<PathBuf>, namespace: Option<String>) -> Result<CacheConfig, CliError> {
    let mut config = CacheConfig::extract(&CacheConfig::figment())?;
    if let Some(dir) = cache_dir {
        config.cache_dir = dir;
    }
    if namespace.is_some() {
        config.namespace = namespace;
    }
    config.validate()?;
    Ok(config)
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

fn open_store(config: &CacheConfig) -> Result<DirStore, CliError> {
    let root = DirStore::new(&config.cache_dir);
    match &config.namespace {
        Some(namespace) => Ok(root.child(namespace)?),
        None => Ok(root),
    }
}

fn to_json<T: Serialize>(output: &T) -> Result<String> {
    serde_json::to_string_pretty(output).context("serializing command output")
}
