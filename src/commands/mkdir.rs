//! `mkdir`: create a folder.

use clap::Args;

use drivepath_core::result::AppResult;

use super::Session;
use crate::output;

/// Arguments for `mkdir`
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Folder path
    pub path: String,
    /// Succeed if the folder already exists
    #[arg(short, long)]
    pub parents: bool,
}

pub async fn execute(args: &MkdirArgs, session: &Session) -> AppResult<()> {
    let folder = if args.parents {
        session.service.ensure_folder(&session.ctx, &args.path).await?
    } else {
        session.service.create_folder(&session.ctx, &args.path).await?
    };
    output::print_success(&format!("Folder '{}' ready (id: {})", args.path, folder.id));
    Ok(())
}
