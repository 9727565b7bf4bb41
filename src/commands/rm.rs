//! `rm`: delete a resource.

use clap::Args;

use drivepath_core::result::AppResult;

use super::Session;
use crate::output;

/// Arguments for `rm`
#[derive(Debug, Args)]
pub struct RmArgs {
    /// Resource path
    pub path: String,
}

pub async fn execute(args: &RmArgs, session: &Session) -> AppResult<()> {
    let deleted = session
        .service
        .delete_path(&session.ctx, &args.path, None)
        .await?;
    output::print_success(&format!("Deleted '{}' (id: {})", args.path, deleted.id));
    Ok(())
}
