use catalog_core::{CatalogProfile, ContextId, Filters};
use catalog_logging::{catalog_debug, catalog_info};
use tokio_util::sync::CancellationToken;

use crate::gateway::RemoteGateway;
use crate::query::{fetch_records, regular_tier};
use crate::sink::EventSink;
use crate::EngineEvent;

/// Where a background scan starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub context: ContextId,
    pub filters: Filters,
    pub from_offset: usize,
}

/// Walks the regular tier in `scan_chunk_size` chunks, emitting every chunk as it lands.
///
/// Stops after a short chunk or once the remote total is reached (`ScanFinished`),
/// on the first failure (`ScanFailed`), or silently when `cancel` fires.
pub async fn run_scan(
    gateway: &dyn RemoteGateway,
    profile: &CatalogProfile,
    request: ScanRequest,
    sink: &dyn EventSink,
    cancel: &CancellationToken,
) {
    let ScanRequest {
        context,
        filters,
        from_offset,
    } = request;
    let chunk = profile.scan_chunk_size.max(1);
    let mut offset = from_offset;
    catalog_info!(
        "Background scan of {} (context {}) from offset {}",
        profile.table,
        context,
        offset
    );

    loop {
        let query = regular_tier(profile, &filters, offset, chunk).with_count();
        let fetched = cancel
            .run_until_cancelled(fetch_records(gateway, profile, &query))
            .await;
        let batch = match fetched {
            None => {
                catalog_debug!("Scan for context {} cancelled at offset {}", context, offset);
                return;
            }
            Some(Err(error)) => {
                sink.emit(EngineEvent::ScanFailed { context, error });
                return;
            }
            Some(Ok(batch)) => batch,
        };

        offset += batch.received;
        let exhausted = batch.received < chunk
            || batch.total.is_some_and(|total| offset as u64 >= total);
        sink.emit(EngineEvent::ScanChunk {
            context,
            records: batch.records,
            requested: chunk,
            received: batch.received,
        });
        if exhausted {
            sink.emit(EngineEvent::ScanFinished { context });
            return;
        }
    }
}
