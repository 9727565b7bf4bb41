//! `search`: list every resource matching a query.

use clap::Args;

use drivepath_core::result::AppResult;
use drivepath_query::Query;

use super::{ResourceRow, Session, parse_properties};
use crate::output::{self, OutputFormat};

/// Arguments for `search`; all given conditions must hold
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Name contains this text
    #[arg(long)]
    pub name_contains: Option<String>,
    /// MIME type contains this text
    #[arg(long)]
    pub type_contains: Option<String>,
    /// Owned by this email address
    #[arg(long)]
    pub owner: Option<String>,
    /// Has this property, as key=value (repeatable)
    #[arg(short, long = "property")]
    pub properties: Vec<String>,
    /// Search the trash instead of live resources
    #[arg(long)]
    pub trashed: bool,
}

fn build_query(args: &SearchArgs) -> AppResult<Query> {
    let mut query = Query::new().include_trashed(args.trashed);
    if let Some(text) = &args.name_contains {
        query = query.and().name_contains(text);
    }
    if let Some(text) = &args.type_contains {
        query = query.and().type_contains(text);
    }
    if let Some(owner) = &args.owner {
        query = query.and().is_owner(owner);
    }
    let mut properties: Vec<_> = parse_properties(&args.properties)?.into_iter().collect();
    properties.sort();
    for (key, value) in properties {
        query = query.and().has_property_value(&key, &value);
    }
    Ok(query)
}

pub async fn execute(args: &SearchArgs, session: &Session, format: OutputFormat) -> AppResult<()> {
    let query = build_query(args)?;
    let found = session
        .service
        .query_resources(&session.ctx, &query)
        .await?;
    let rows: Vec<ResourceRow> = found.iter().map(ResourceRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}
