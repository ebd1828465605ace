use std::sync::Arc;
use std::time::{Duration, Instant};

use catalog_core::{
    update, CatalogProfile, CatalogState, CatalogViewModel, Effect, FilterPatch, Filters,
    LoadingState, Msg, Record, RecordId, ScrollMetrics,
};
use catalog_logging::{catalog_trace, catalog_warn};

use crate::engine::EngineHandle;
use crate::gateway::RemoteGateway;
use crate::session_cache::SessionCache;

const PUMP_SLICE: Duration = Duration::from_millis(20);

/// One list instance: owns the state, executes its effects, and feeds engine
/// results back in.
///
/// Nothing happens in the background on the caller's thread; call [`CatalogLoader::pump`]
/// regularly (every UI tick) to apply finished remote work.
pub struct CatalogLoader {
    state: CatalogState,
    engine: EngineHandle,
    cache: SessionCache,
    pending_scroll: Option<u32>,
}

impl CatalogLoader {
    pub fn new(profile: CatalogProfile, gateway: Arc<dyn RemoteGateway>, cache: SessionCache) -> Self {
        Self::with_filters(profile, Filters::default(), gateway, cache)
    }

    pub fn with_filters(
        profile: CatalogProfile,
        filters: Filters,
        gateway: Arc<dyn RemoteGateway>,
        cache: SessionCache,
    ) -> Self {
        let engine = EngineHandle::spawn(gateway, profile.clone());
        Self {
            state: CatalogState::with_filters(profile, filters),
            engine,
            cache,
            pending_scroll: None,
        }
    }

    /// Restores the session snapshot for the current key, or starts a cold load.
    pub fn mount(&mut self) {
        let restored = self.cache.restore(&self.state.list_key());
        self.dispatch(Msg::Mounted { restored });
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn view(&self) -> CatalogViewModel {
        self.state.view()
    }

    pub fn visible_records(&self) -> &[Record] {
        self.state.visible_records()
    }

    pub fn loading_state(&self) -> LoadingState {
        self.state.loading_state()
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Scroll offset to apply once the restored list is laid out; yielded once.
    pub fn take_scroll_restore(&mut self) -> Option<u32> {
        self.pending_scroll.take()
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        self.dispatch(Msg::Scrolled(metrics));
    }

    pub fn on_scroll_near_end(&mut self) {
        self.dispatch(Msg::LoadMoreRequested);
    }

    pub fn load_more(&mut self) {
        self.dispatch(Msg::LoadMoreRequested);
    }

    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.dispatch(Msg::SearchInputChanged(text.into()));
    }

    pub fn set_filters(&mut self, patch: FilterPatch) {
        self.dispatch(Msg::FiltersChanged(patch));
    }

    pub fn open_record(&mut self, id: RecordId) {
        self.dispatch(Msg::RecordOpened(id));
    }

    /// Applies every engine result received so far. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.engine.try_recv() {
            self.dispatch(event.into_msg());
            applied += 1;
        }
        applied
    }

    /// Pumps until `done` holds for the state or `timeout` passes.
    pub fn pump_until(&mut self, done: impl Fn(&CatalogState) -> bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if done(&self.state) {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(event) = self.engine.recv_timeout(remaining.min(PUMP_SLICE)) {
                self.dispatch(event.into_msg());
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        catalog_trace!("dispatch {:?}", MsgName(&msg));
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchFirstPage { context, filters } => {
                self.engine.fetch_first_page(context, filters);
            }
            Effect::StartScan {
                context,
                filters,
                from_offset,
            } => self.engine.start_scan(context, filters, from_offset),
            Effect::FetchPage {
                context,
                filters,
                offset,
                limit,
            } => self.engine.fetch_page(context, filters, offset, limit),
            Effect::RunSearch {
                context,
                filters,
                query,
            } => self.engine.run_search(context, filters, query),
            Effect::ArmDebounce { revision, delay } => self.engine.arm_debounce(revision, delay),
            Effect::CancelContext { context } => self.engine.cancel_context(context),
            Effect::SaveSnapshot(entry) => {
                if let Err(err) = self.cache.save(&entry) {
                    catalog_warn!("Session cache save for {} failed: {}", entry.list_key, err);
                }
            }
            Effect::SaveScrollOffset { list_key, offset } => {
                if let Err(err) = self.cache.save_scroll(&list_key, offset) {
                    catalog_warn!("Session cache scroll save for {} failed: {}", list_key, err);
                }
            }
            Effect::ClearSnapshot { list_key } => {
                if let Err(err) = self.cache.clear(&list_key) {
                    catalog_warn!("Session cache clear for {} failed: {}", list_key, err);
                }
            }
            Effect::RestoreScroll { offset } => self.pending_scroll = Some(offset),
            Effect::IncrementViews { id } => self.engine.increment_views(id),
        }
    }
}

/// Message variant name without its (possibly large) payload.
struct MsgName<'a>(&'a Msg);

impl std::fmt::Debug for MsgName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            Msg::Mounted { .. } => "Mounted",
            Msg::FiltersChanged(_) => "FiltersChanged",
            Msg::SearchInputChanged(_) => "SearchInputChanged",
            Msg::DebounceElapsed { .. } => "DebounceElapsed",
            Msg::FirstPageLoaded { .. } => "FirstPageLoaded",
            Msg::FirstPageFailed { .. } => "FirstPageFailed",
            Msg::ScanChunkLoaded { .. } => "ScanChunkLoaded",
            Msg::ScanFinished { .. } => "ScanFinished",
            Msg::ScanFailed { .. } => "ScanFailed",
            Msg::PageLoaded { .. } => "PageLoaded",
            Msg::PageFailed { .. } => "PageFailed",
            Msg::SearchLoaded { .. } => "SearchLoaded",
            Msg::SearchFailed { .. } => "SearchFailed",
            Msg::Scrolled(_) => "Scrolled",
            Msg::LoadMoreRequested => "LoadMoreRequested",
            Msg::RecordOpened(_) => "RecordOpened",
            Msg::Tick => "Tick",
            Msg::NoOp => "NoOp",
        };
        f.write_str(name)
    }
}
