use catalog_core::{CatalogProfile, Filters, Record};
use catalog_logging::catalog_debug;

use crate::gateway::RemoteGateway;
use crate::query::{fetch_records, search};
use crate::GatewayError;

/// Every record of the context whose search column contains `text`.
pub async fn run_search(
    gateway: &dyn RemoteGateway,
    profile: &CatalogProfile,
    filters: &Filters,
    text: &str,
) -> Result<Vec<Record>, GatewayError> {
    let query = search(profile, filters, text);
    let batch = fetch_records(gateway, profile, &query).await?;
    catalog_debug!(
        "Search '{}' on {}: {} matches",
        text,
        profile.table,
        batch.records.len()
    );
    Ok(batch.records)
}
