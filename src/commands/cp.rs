//! `cp`: copy a file into a folder.

use clap::Args;

use drivepath_core::result::AppResult;
use drivepath_service::CopyDestination;

use super::Session;
use crate::output;

/// Arguments for `cp`
#[derive(Debug, Args)]
pub struct CpArgs {
    /// File path
    pub path: String,
    /// Destination folder path
    pub destination: String,
}

pub async fn execute(args: &CpArgs, session: &Session) -> AppResult<()> {
    let source = session
        .service
        .open_required(&session.ctx, &args.path)
        .await?;
    let copy = source
        .copy_to(&session.ctx, CopyDestination::Path(&args.destination))
        .await?;
    output::print_success(&format!(
        "Copied '{}' into '{}' (id: {})",
        args.path,
        args.destination,
        copy.id()
    ));
    Ok(())
}
