use crate::cursor::{FetchCursor, TierCursors};
use crate::view_model::{CatalogViewModel, LoadingState};
use crate::window::{DisplayWindow, WindowAdvance};
use crate::{list_key, CacheEntry, CatalogProfile, Filters, Record, WorkingSet};

/// Generation of a list context; bumped on every filter or settled-search change.
pub type ContextId = u64;

/// Sequence number of raw search input, used to drop superseded debounce timers.
pub type Revision = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStatus {
    #[default]
    Idle,
    Running,
    Complete,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListMode {
    #[default]
    Paginated,
    Search {
        query: String,
    },
}

impl ListMode {
    pub fn query(&self) -> Option<&str> {
        match self {
            ListMode::Paginated => None,
            ListMode::Search { query } => Some(query),
        }
    }
}

/// A settled query whose result has not landed yet. The displayed context
/// stays live until the result is adopted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    /// Context reserved for the search; becomes current on success.
    pub context: ContextId,
    pub query: String,
}

/// Everything one list instance owns: working set, cursors, window, guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogState {
    profile: CatalogProfile,
    filters: Filters,
    context: ContextId,
    /// Highest context id handed out, including reserved ones.
    issued: ContextId,
    mode: ListMode,
    pending_search: Option<PendingSearch>,
    working: WorkingSet,
    cursors: TierCursors,
    window: DisplayWindow,
    scan: ScanStatus,
    mounted: bool,
    initial_loading: bool,
    loading_more: bool,
    searching: bool,
    search_text: String,
    search_revision: Revision,
    scroll_offset: u32,
    dirty: bool,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new(CatalogProfile::jobs())
    }
}

impl CatalogState {
    pub fn new(profile: CatalogProfile) -> Self {
        Self::with_filters(profile, Filters::default())
    }

    pub fn with_filters(profile: CatalogProfile, filters: Filters) -> Self {
        let window = DisplayWindow::new(profile.window_step);
        Self {
            profile,
            filters,
            context: 1,
            issued: 1,
            mode: ListMode::Paginated,
            pending_search: None,
            working: WorkingSet::new(),
            cursors: TierCursors::default(),
            window,
            scan: ScanStatus::Idle,
            mounted: false,
            initial_loading: false,
            loading_more: false,
            searching: false,
            search_text: String::new(),
            search_revision: 0,
            scroll_offset: 0,
            dirty: false,
        }
    }

    pub fn profile(&self) -> &CatalogProfile {
        &self.profile
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn mode(&self) -> &ListMode {
        &self.mode
    }

    pub fn pending_search(&self) -> Option<&PendingSearch> {
        self.pending_search.as_ref()
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working
    }

    pub fn cursors(&self) -> &TierCursors {
        &self.cursors
    }

    pub fn scan_status(&self) -> ScanStatus {
        self.scan
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn search_revision(&self) -> Revision {
        self.search_revision
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn list_key(&self) -> String {
        list_key(&self.profile, &self.filters, self.mode.query())
    }

    pub fn window_len(&self) -> usize {
        self.window.visible_len(self.working.len())
    }

    pub fn visible_records(&self) -> &[Record] {
        self.working.prefix(self.window_len())
    }

    pub fn has_more(&self) -> bool {
        match self.mode {
            ListMode::Paginated => self.cursors.has_more(),
            ListMode::Search { .. } => false,
        }
    }

    pub fn loading_state(&self) -> LoadingState {
        LoadingState {
            initial_loading: self.initial_loading,
            loading_more: self.loading_more,
            searching: self.searching,
        }
    }

    pub fn view(&self) -> CatalogViewModel {
        CatalogViewModel {
            list_key: self.list_key(),
            visible: self.visible_records().to_vec(),
            total_known: self.working.len(),
            premium_count: self.working.premium_count(),
            has_more: self.has_more(),
            scan: self.scan,
            loading: self.loading_state(),
            search_query: self.mode.query().map(str::to_string),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn snapshot(&self) -> CacheEntry {
        CacheEntry::new(self.list_key(), self.working.records().to_vec(), self.scroll_offset)
            .with_progress(
                self.cursors.regular.offset(),
                !self.has_more() && self.scan != ScanStatus::Failed,
            )
            .with_window(self.window_len())
    }

    pub(crate) fn is_stale(&self, context: ContextId) -> bool {
        context != self.context
    }

    pub(crate) fn mark_mounted(&mut self) -> bool {
        !std::mem::replace(&mut self.mounted, true)
    }

    /// Hands out a fresh context id without switching to it.
    pub(crate) fn reserve_context(&mut self) -> ContextId {
        self.issued += 1;
        self.issued
    }

    /// Starts a new context. Cursors, guards and the scan status are rebound;
    /// records and the window are dropped unless `keep_records` is set.
    pub(crate) fn begin_context(&mut self, filters: Filters, mode: ListMode, keep_records: bool) {
        let context = self.reserve_context();
        self.enter_context(context, filters, mode, keep_records);
    }

    /// Like [`CatalogState::begin_context`] with an id from [`CatalogState::reserve_context`].
    pub(crate) fn enter_context(
        &mut self,
        context: ContextId,
        filters: Filters,
        mode: ListMode,
        keep_records: bool,
    ) {
        self.context = context;
        self.filters = filters;
        self.mode = mode;
        self.cursors = TierCursors::default();
        self.scan = ScanStatus::Idle;
        self.initial_loading = false;
        self.loading_more = false;
        self.searching = false;
        if !keep_records {
            self.working = WorkingSet::new();
            self.window = DisplayWindow::new(self.profile.window_step);
            self.scroll_offset = 0;
        }
        self.dirty = true;
    }

    pub(crate) fn restore(&mut self, entry: CacheEntry) {
        self.working = WorkingSet::from_records(entry.records, self.profile.ordering);
        self.cursors.premium = FetchCursor::at(0, false);
        self.cursors.regular = FetchCursor::at(entry.regular_offset, !entry.scan_complete);
        self.scan = if entry.scan_complete {
            ScanStatus::Complete
        } else {
            ScanStatus::Idle
        };
        self.window.cover(entry.window_len);
        self.scroll_offset = entry.scroll_offset;
        self.initial_loading = false;
        self.dirty = true;
    }

    pub(crate) fn merge_records(&mut self, records: Vec<Record>) {
        self.working = self.working.merge(records, self.profile.ordering);
        self.dirty = true;
    }

    pub(crate) fn replace_records(&mut self, records: Vec<Record>) {
        self.working = WorkingSet::from_records(records, self.profile.ordering);
        self.dirty = true;
    }

    pub(crate) fn reorder_records(&mut self) {
        self.working = self.working.reordered(self.profile.ordering);
        self.dirty = true;
    }

    pub(crate) fn cursors_mut(&mut self) -> &mut TierCursors {
        &mut self.cursors
    }

    pub(crate) fn set_scan(&mut self, scan: ScanStatus) {
        self.scan = scan;
        self.dirty = true;
    }

    pub(crate) fn set_initial_loading(&mut self, loading: bool) {
        self.initial_loading = loading;
        self.dirty = true;
    }

    pub(crate) fn set_loading_more(&mut self, loading: bool) {
        self.loading_more = loading;
        self.dirty = true;
    }

    pub(crate) fn set_searching(&mut self, searching: bool) {
        self.searching = searching;
        self.dirty = true;
    }

    pub(crate) fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    pub(crate) fn set_pending_search(&mut self, pending: PendingSearch) {
        self.pending_search = Some(pending);
    }

    pub(crate) fn take_pending_search(&mut self) -> Option<PendingSearch> {
        self.pending_search.take()
    }

    pub(crate) fn set_search_text(&mut self, text: String) -> Revision {
        self.search_text = text;
        self.search_revision += 1;
        self.search_revision
    }

    pub(crate) fn show_all(&mut self) {
        self.window = DisplayWindow::unbounded(self.profile.window_step);
        self.dirty = true;
    }

    pub(crate) fn advance_window(&mut self) -> WindowAdvance {
        let advance = self.window.advance(self.working.len());
        if matches!(advance, WindowAdvance::Grew { .. }) {
            self.dirty = true;
        }
        advance
    }
}
