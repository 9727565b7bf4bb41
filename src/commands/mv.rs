//! `mv`: rename a resource in place.

use clap::Args;

use drivepath_core::result::AppResult;

use super::Session;
use crate::output;

/// Arguments for `mv`
#[derive(Debug, Args)]
pub struct MvArgs {
    /// Resource path
    pub path: String,
    /// New name (not a path)
    pub new_name: String,
}

pub async fn execute(args: &MvArgs, session: &Session) -> AppResult<()> {
    let mut handle = session
        .service
        .open_required(&session.ctx, &args.path)
        .await?;
    handle.rename(&session.ctx, &args.new_name).await?;
    output::print_success(&format!("Renamed '{}' to '{}'", args.path, handle.name()));
    Ok(())
}
