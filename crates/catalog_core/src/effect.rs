use std::time::Duration;

use crate::{CacheEntry, ContextId, Filters, RecordId, Revision};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Premium tier (uncapped) and first regular page, fetched concurrently.
    FetchFirstPage { context: ContextId, filters: Filters },
    /// Walk the remaining rows in large chunks starting at `from_offset`.
    StartScan {
        context: ContextId,
        filters: Filters,
        from_offset: usize,
    },
    /// One bounded regular page appended on load-more.
    FetchPage {
        context: ContextId,
        filters: Filters,
        offset: usize,
        limit: usize,
    },
    /// Full search across the candidate set.
    RunSearch {
        context: ContextId,
        filters: Filters,
        query: String,
    },
    /// Start (or restart) the search debounce timer.
    ArmDebounce { revision: Revision, delay: Duration },
    /// Abort whatever is still in flight for a superseded context.
    CancelContext { context: ContextId },
    SaveSnapshot(CacheEntry),
    SaveScrollOffset { list_key: String, offset: u32 },
    ClearSnapshot { list_key: String },
    /// Scroll the container to a restored offset once it is laid out.
    RestoreScroll { offset: u32 },
    /// Fire-and-forget view counter bump.
    IncrementViews { id: RecordId },
}
