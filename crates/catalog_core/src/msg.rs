use crate::{CacheEntry, ContextId, FilterPatch, Record, RecordId, Revision, ScrollMetrics};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The list was mounted; `restored` is the session cache entry for its key, if any.
    Mounted { restored: Option<CacheEntry> },
    /// User changed category/company/saved-only filters.
    FiltersChanged(FilterPatch),
    /// Raw keystroke-level search text (not yet debounced).
    SearchInputChanged(String),
    /// A debounce timer armed for `revision` ran out.
    DebounceElapsed { revision: Revision },
    /// Fast path result: both tiers fetched concurrently. `regular_received`
    /// counts raw rows, including any the transform rejected.
    FirstPageLoaded {
        context: ContextId,
        premium: Vec<Record>,
        regular: Vec<Record>,
        regular_received: usize,
    },
    FirstPageFailed { context: ContextId, error: String },
    /// One background scan chunk: `received` raw rows out of `requested`.
    ScanChunkLoaded {
        context: ContextId,
        records: Vec<Record>,
        requested: usize,
        received: usize,
    },
    /// The background scan walked past the last remote row.
    ScanFinished { context: ContextId },
    ScanFailed { context: ContextId, error: String },
    /// Explicit load-more page.
    PageLoaded {
        context: ContextId,
        records: Vec<Record>,
        requested: usize,
        received: usize,
    },
    PageFailed { context: ContextId, error: String },
    /// Full, unpaginated search result.
    SearchLoaded {
        context: ContextId,
        records: Vec<Record>,
    },
    SearchFailed { context: ContextId, error: String },
    /// Scroll container moved.
    Scrolled(ScrollMetrics),
    /// "Load more" button, or a scroll hook already past the threshold.
    LoadMoreRequested,
    /// User opened a record (bumps the remote view counter).
    RecordOpened(RecordId),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
