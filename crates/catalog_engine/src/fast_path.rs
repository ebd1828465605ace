use catalog_core::{CatalogProfile, Filters};
use catalog_logging::catalog_debug;
use futures_util::future::try_join;

use crate::gateway::RemoteGateway;
use crate::query::{fetch_records, premium_tier, regular_tier, RecordBatch};
use crate::{FirstPage, GatewayError};

/// Fetches the premium tier and the first regular page concurrently.
pub async fn load_first_page(
    gateway: &dyn RemoteGateway,
    profile: &CatalogProfile,
    filters: &Filters,
) -> Result<FirstPage, GatewayError> {
    let regular_query = regular_tier(profile, filters, 0, profile.page_size);
    let regular = fetch_records(gateway, profile, &regular_query);

    let page = if profile.has_priority_tier {
        let premium_query = premium_tier(profile, filters);
        let premium = fetch_records(gateway, profile, &premium_query);
        let (premium, regular) = try_join(premium, regular).await?;
        FirstPage {
            premium: premium.records,
            regular_received: regular.received,
            regular: regular.records,
        }
    } else {
        let regular = regular.await?;
        FirstPage {
            premium: Vec::new(),
            regular_received: regular.received,
            regular: regular.records,
        }
    };

    catalog_debug!(
        "Fast path for {}: {} premium, {} regular",
        profile.table,
        page.premium.len(),
        page.regular.len()
    );
    Ok(page)
}

/// One bounded regular page for load-more.
pub async fn load_page(
    gateway: &dyn RemoteGateway,
    profile: &CatalogProfile,
    filters: &Filters,
    offset: usize,
    limit: usize,
) -> Result<RecordBatch, GatewayError> {
    let query = regular_tier(profile, filters, offset, limit);
    fetch_records(gateway, profile, &query).await
}
