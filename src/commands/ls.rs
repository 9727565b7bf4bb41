//! `ls`: list a folder.

use clap::Args;
use futures::StreamExt;

use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;
use drivepath_core::types::ResourceKind;
use drivepath_query::Query;

use super::{ResourceRow, Session};
use crate::output::{self, OutputFormat};

/// Arguments for `ls`
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Folder path; the root when omitted
    pub path: Option<String>,
    /// Descend into subfolders
    #[arg(short, long)]
    pub deep: bool,
    /// Leave folders out of the listing
    #[arg(long)]
    pub files_only: bool,
}

pub async fn execute(args: &LsArgs, session: &Session, format: OutputFormat) -> AppResult<()> {
    let service = &session.service;
    let folder = match &args.path {
        None => service.root_folder(),
        Some(path) => service
            .find_folder(&session.ctx, path, None)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder '{path}' not found")))?,
    };

    let filter = args
        .files_only
        .then(|| Query::new().is_not_type(ResourceKind::Folder));
    let mut stream = service.inner_resources(&session.ctx, &folder, filter.as_ref(), args.deep);

    let mut rows = Vec::new();
    while let Some(item) = stream.next().await {
        rows.push(ResourceRow::from(&item?));
    }
    output::print_list(&rows, format);
    Ok(())
}
