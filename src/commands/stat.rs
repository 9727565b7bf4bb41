//! `stat`: show one resource.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use drivepath_core::result::AppResult;

use super::Session;
use crate::output::{self, OutputFormat};

/// Arguments for `stat`
#[derive(Debug, Args)]
pub struct StatArgs {
    /// Resource path
    pub path: String,
}

#[derive(Debug, Serialize, Tabled)]
struct StatRow {
    id: String,
    path: String,
    mime_type: String,
    size: String,
    trashed: bool,
    owners: String,
    properties: String,
}

pub async fn execute(args: &StatArgs, session: &Session, format: OutputFormat) -> AppResult<()> {
    let mut handle = session
        .service
        .open_required(&session.ctx, &args.path)
        .await?;
    let path = handle.full_name(&session.ctx).await?;
    let r = handle.resource();

    let mut properties: Vec<String> = r.properties.iter().map(|(k, v)| format!("{k}={v}")).collect();
    properties.sort();

    let row = StatRow {
        id: r.id.clone(),
        path,
        mime_type: r.mime_type.clone(),
        size: r.size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
        trashed: r.is_trashed,
        owners: r.owners.join(", "),
        properties: properties.join(", "),
    };
    output::print_item(&row, format);
    Ok(())
}
