//! `get`, `put` and `export`: move bytes between local files and the drive.

use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;
use tracing::debug;

use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;
use drivepath_core::types::{RemoteResource, ResourceKind, TransferCallbacks};

use super::{Session, parse_properties};
use crate::output;

/// Arguments for `get`
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Remote file path
    pub path: String,
    /// Local destination
    pub local: PathBuf,
}

/// Arguments for `put`
#[derive(Debug, Args)]
pub struct PutArgs {
    /// Local file
    pub local: PathBuf,
    /// Remote destination path; missing folders are created
    pub remote: String,
    /// Content type; guessed from the extension when omitted
    #[arg(long)]
    pub content_type: Option<String>,
    /// Property to attach, as key=value (repeatable)
    #[arg(short, long = "property")]
    pub properties: Vec<String>,
}

/// Arguments for `export`
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Remote document path
    pub path: String,
    /// Local destination
    pub local: PathBuf,
    /// Target format as a file extension (e.g. pdf, docx); the document's
    /// default when omitted
    #[arg(short, long)]
    pub kind: Option<String>,
}

fn progress(label: &str) -> TransferCallbacks {
    let label = label.to_string();
    TransferCallbacks::none().on_progress(move |done, total| {
        debug!(path = %label, done, total = ?total, "Transfer progress");
    })
}

async fn require_file(session: &Session, path: &str) -> AppResult<RemoteResource> {
    session
        .service
        .find_file(&session.ctx, path, None)
        .await?
        .ok_or_else(|| AppError::not_found(format!("File '{path}' not found")))
}

pub async fn get(args: &GetArgs, session: &Session) -> AppResult<()> {
    let file = require_file(session, &args.path).await?;
    let mut out = tokio::fs::File::create(&args.local).await?;
    let written = session
        .service
        .download_to(&session.ctx, &file, &mut out, &progress(&args.path))
        .await?;
    output::print_success(&format!(
        "Downloaded '{}' to {} ({written} bytes)",
        args.path,
        args.local.display()
    ));
    Ok(())
}

pub async fn put(args: &PutArgs, session: &Session) -> AppResult<()> {
    let properties = parse_properties(&args.properties)?;
    let content = Bytes::from(tokio::fs::read(&args.local).await?);
    let size = content.len();
    let created = session
        .service
        .create_file(
            &session.ctx,
            &args.remote,
            content,
            args.content_type.as_deref(),
            properties,
            &progress(&args.remote),
        )
        .await?;
    output::print_success(&format!(
        "Uploaded {} to '{}' ({size} bytes, id: {})",
        args.local.display(),
        args.remote,
        created.id
    ));
    Ok(())
}

pub async fn export(args: &ExportArgs, session: &Session) -> AppResult<()> {
    let target = match &args.kind {
        None => None,
        Some(ext) => match ResourceKind::from_extension(ext) {
            ResourceKind::Unknown => {
                return Err(AppError::validation(format!("Unknown export format '{ext}'")));
            }
            kind => Some(kind),
        },
    };

    let document = require_file(session, &args.path).await?;
    let mut out = tokio::fs::File::create(&args.local).await?;
    let written = session
        .service
        .export_to(&session.ctx, &document, target, &mut out, &progress(&args.path))
        .await?;
    output::print_success(&format!(
        "Exported '{}' to {} ({written} bytes)",
        args.path,
        args.local.display()
    ));
    Ok(())
}
