//! CLI command definitions and dispatch.

pub mod cp;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod rm;
pub mod search;
pub mod stat;
pub mod transfer;

use std::collections::HashMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use drivepath_cache::PathCache;
use drivepath_core::config::DriveConfig;
use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;
use drivepath_core::types::RemoteResource;
use drivepath_remote::{GoogleDriveClient, RetryingDrive};
use drivepath_service::{CallContext, DriveService};

use crate::output::OutputFormat;

/// drivepath: path-oriented access to Google Drive
#[derive(Debug, Parser)]
#[command(name = "drivepath", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (extension optional)
    #[arg(short, long, default_value = "config/drivepath")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List a folder
    Ls(ls::LsArgs),
    /// Show one resource
    Stat(stat::StatArgs),
    /// Create a folder
    Mkdir(mkdir::MkdirArgs),
    /// Delete a resource
    Rm(rm::RmArgs),
    /// Rename a resource
    Mv(mv::MvArgs),
    /// Copy a file into a folder
    Cp(cp::CpArgs),
    /// Download a file
    Get(transfer::GetArgs),
    /// Upload a file
    Put(transfer::PutArgs),
    /// Export a native document
    Export(transfer::ExportArgs),
    /// Search with a query
    Search(search::SearchArgs),
}

impl Cli {
    /// Execute the command, then persist the path cache.
    pub async fn execute(&self, config: DriveConfig) -> AppResult<()> {
        let session = Session::connect(&config).await?;
        let format = self.format;

        let result = match &self.command {
            Commands::Ls(args) => ls::execute(args, &session, format).await,
            Commands::Stat(args) => stat::execute(args, &session, format).await,
            Commands::Mkdir(args) => mkdir::execute(args, &session).await,
            Commands::Rm(args) => rm::execute(args, &session).await,
            Commands::Mv(args) => mv::execute(args, &session).await,
            Commands::Cp(args) => cp::execute(args, &session).await,
            Commands::Get(args) => transfer::get(args, &session).await,
            Commands::Put(args) => transfer::put(args, &session).await,
            Commands::Export(args) => transfer::export(args, &session).await,
            Commands::Search(args) => search::execute(args, &session, format).await,
        };

        let stored = session.service.shutdown().await;
        result.and(stored)
    }
}

/// A connected service plus the context every call runs under.
pub struct Session {
    pub service: DriveService,
    pub ctx: CallContext,
}

impl Session {
    /// Wire configuration into a retrying client, the path cache and the service.
    ///
    /// Ctrl-C cancels the context, which stops any call in flight.
    async fn connect(config: &DriveConfig) -> AppResult<Self> {
        let client = GoogleDriveClient::from_config(&config.remote)?;
        let remote = Arc::new(RetryingDrive::new(client, config.retry.clone()));
        let cache = Arc::new(PathCache::from_config(&config.cache).await);
        let service = DriveService::new(remote, cache, config.export.clone());

        let ctx = CallContext::new();
        let token = ctx.token().clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupted, cancelling");
                token.cancel();
            }
        });

        Ok(Self { service, ctx })
    }
}

/// One resource as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct ResourceRow {
    /// Resource id
    id: String,
    /// Name
    name: String,
    /// MIME type
    mime_type: String,
    /// Size in bytes
    size: String,
    /// Created at
    created: String,
}

impl From<&RemoteResource> for ResourceRow {
    fn from(r: &RemoteResource) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            mime_type: r.mime_type.clone(),
            size: r.size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            created: r
                .created_time
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Parse repeated `key=value` arguments.
pub fn parse_properties(pairs: &[String]) -> AppResult<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| {
                    AppError::validation(format!("Expected key=value, got '{pair}'"))
                })
        })
        .collect()
}
