use catalog_logging::{catalog_debug, catalog_info, catalog_warn};

use crate::cursor::FetchCursor;
use crate::window::WindowAdvance;
use crate::{
    CacheEntry, CatalogState, ContextId, Effect, Filters, ListMode, Msg, PendingSearch, Record,
    ScanStatus,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: CatalogState, msg: Msg) -> (CatalogState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mounted { restored } => on_mounted(&mut state, restored),
        Msg::FiltersChanged(patch) => {
            let next = patch.apply(state.filters());
            if &next == state.filters() {
                return (state, Vec::new());
            }
            // New filters void the displayed context, so a pending query switches right away.
            let (pending, mut effects) = drop_pending_search(&mut state);
            let query = state.mode().query().map(str::to_string).or(pending);
            match query {
                Some(query) => effects.extend(start_search(&mut state, next, query)),
                None => {
                    effects.extend(switch_context(&mut state, next, ListMode::Paginated, false));
                    effects.extend(start_paginated(&mut state));
                }
            }
            effects
        }
        Msg::SearchInputChanged(text) => {
            let revision = state.set_search_text(text);
            vec![Effect::ArmDebounce {
                revision,
                delay: state.profile().debounce,
            }]
        }
        Msg::DebounceElapsed { revision } => {
            if revision != state.search_revision() {
                catalog_debug!("Dropping superseded debounce revision {}", revision);
                return (state, Vec::new());
            }
            settle_search(&mut state)
        }
        Msg::FirstPageLoaded {
            context,
            premium,
            regular,
            regular_received,
        } => {
            if is_stale(&state, context, "first page") {
                return (state, Vec::new());
            }
            on_first_page(&mut state, premium, regular, regular_received)
        }
        Msg::FirstPageFailed { context, error } => {
            if is_stale(&state, context, "first page failure") {
                return (state, Vec::new());
            }
            catalog_warn!("First page for {} failed: {}", state.list_key(), error);
            state.cursors_mut().exhaust();
            state.set_scan(ScanStatus::Failed);
            state.set_initial_loading(false);
            Vec::new()
        }
        Msg::ScanChunkLoaded {
            context,
            records,
            requested,
            received,
        } => {
            if is_stale(&state, context, "scan chunk") || state.scan_status() != ScanStatus::Running
            {
                return (state, Vec::new());
            }
            state.merge_records(records);
            state.cursors_mut().regular.advance(requested, received);
            catalog_debug!(
                "Scan chunk merged for {}: {} rows, {} known",
                state.list_key(),
                received,
                state.working_set().len()
            );
            vec![Effect::SaveSnapshot(state.snapshot())]
        }
        Msg::ScanFinished { context } => {
            if is_stale(&state, context, "scan completion")
                || state.scan_status() != ScanStatus::Running
            {
                return (state, Vec::new());
            }
            state.set_scan(ScanStatus::Complete);
            state.cursors_mut().exhaust();
            state.reorder_records();
            catalog_info!(
                "Background scan for {} complete: {} records",
                state.list_key(),
                state.working_set().len()
            );
            vec![Effect::SaveSnapshot(state.snapshot())]
        }
        Msg::ScanFailed { context, error } => {
            if is_stale(&state, context, "scan failure") || state.scan_status() != ScanStatus::Running
            {
                return (state, Vec::new());
            }
            catalog_warn!(
                "Background scan for {} stopped at offset {}: {}",
                state.list_key(),
                state.cursors().regular.offset(),
                error
            );
            state.set_scan(ScanStatus::Failed);
            Vec::new()
        }
        Msg::PageLoaded {
            context,
            records,
            requested,
            received,
        } => {
            if is_stale(&state, context, "page") {
                return (state, Vec::new());
            }
            state.set_loading_more(false);
            state.merge_records(records);
            state.cursors_mut().regular.advance(requested, received);
            state.advance_window();
            vec![Effect::SaveSnapshot(state.snapshot())]
        }
        Msg::PageFailed { context, error } => {
            if is_stale(&state, context, "page failure") {
                return (state, Vec::new());
            }
            catalog_warn!("Load-more page for {} failed: {}", state.list_key(), error);
            state.set_loading_more(false);
            Vec::new()
        }
        Msg::SearchLoaded { context, records } => {
            let mut effects = Vec::new();
            if let Some(pending) = take_pending_if(&mut state, context) {
                effects = adopt_search(&mut state, pending);
            } else if is_stale(&state, context, "search result") || state.mode().query().is_none() {
                return (state, Vec::new());
            }
            state.replace_records(records);
            state.cursors_mut().exhaust();
            state.set_scan(ScanStatus::Complete);
            state.set_searching(false);
            state.show_all();
            catalog_info!(
                "Search {} matched {} records",
                state.list_key(),
                state.working_set().len()
            );
            effects.push(Effect::SaveSnapshot(state.snapshot()));
            effects
        }
        Msg::SearchFailed { context, error } => {
            if let Some(pending) = take_pending_if(&mut state, context) {
                // The displayed context was never left; only the reserved one is retired.
                catalog_warn!("Search '{}' on {} failed: {}", pending.query, state.list_key(), error);
                state.set_searching(false);
                return (state, vec![Effect::CancelContext { context }]);
            }
            if is_stale(&state, context, "search failure") {
                return (state, Vec::new());
            }
            catalog_warn!("Search {} failed: {}", state.list_key(), error);
            state.set_searching(false);
            Vec::new()
        }
        Msg::Scrolled(metrics) => {
            state.set_scroll_offset(metrics.scroll_top);
            let mut effects = vec![Effect::SaveScrollOffset {
                list_key: state.list_key(),
                offset: metrics.scroll_top,
            }];
            if metrics.is_near_end(state.profile().scroll_threshold) {
                effects.extend(advance_window(&mut state));
            }
            effects
        }
        Msg::LoadMoreRequested => advance_window(&mut state),
        Msg::RecordOpened(id) => vec![Effect::IncrementViews { id }],
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn is_stale(state: &CatalogState, context: ContextId, what: &str) -> bool {
    let stale = state.is_stale(context);
    if stale {
        catalog_debug!(
            "Discarding {} for superseded context {} (active {})",
            what,
            context,
            state.context()
        );
    }
    stale
}

fn on_mounted(state: &mut CatalogState, restored: Option<CacheEntry>) -> Vec<Effect> {
    if !state.mark_mounted() {
        return Vec::new();
    }

    let key = state.list_key();
    match restored {
        Some(entry) if entry.is_current() && entry.list_key == key => {
            let offset = entry.scroll_offset;
            let resume = !entry.scan_complete;
            catalog_info!(
                "Restored {} records for {} from session cache",
                entry.records.len(),
                key
            );
            state.restore(entry);
            let mut effects = vec![Effect::RestoreScroll { offset }];
            if resume {
                effects.extend(start_scan(state));
            }
            effects
        }
        Some(entry) => {
            catalog_debug!(
                "Ignoring session cache entry {} (version {}) for {}",
                entry.list_key,
                entry.version,
                key
            );
            start_paginated(state)
        }
        None => start_paginated(state),
    }
}

/// Rebinds the state to a new context and retires the old one.
fn switch_context(
    state: &mut CatalogState,
    filters: Filters,
    mode: ListMode,
    keep_records: bool,
) -> Vec<Effect> {
    let old_context = state.context();
    let old_key = state.list_key();
    state.begin_context(filters, mode, keep_records);
    vec![
        Effect::CancelContext {
            context: old_context,
        },
        Effect::ClearSnapshot { list_key: old_key },
    ]
}

fn start_paginated(state: &mut CatalogState) -> Vec<Effect> {
    if state.filters().matches_nothing() {
        state.cursors_mut().exhaust();
        state.set_scan(ScanStatus::Complete);
        state.set_initial_loading(false);
        return vec![Effect::SaveSnapshot(state.snapshot())];
    }
    state.set_initial_loading(true);
    vec![Effect::FetchFirstPage {
        context: state.context(),
        filters: state.filters().clone(),
    }]
}

fn on_first_page(
    state: &mut CatalogState,
    premium: Vec<Record>,
    regular: Vec<Record>,
    regular_received: usize,
) -> Vec<Effect> {
    let page_size = state.profile().page_size;
    let premium_len = premium.len();
    let regular_len = regular.len();

    state.merge_records(premium.into_iter().chain(regular).collect());
    {
        let cursors = state.cursors_mut();
        cursors.premium = FetchCursor::at(premium_len, false);
        cursors.regular.advance(page_size, regular_received);
    }
    state.set_initial_loading(false);
    catalog_info!(
        "First page for {}: {} premium + {} regular",
        state.list_key(),
        premium_len,
        regular_len
    );

    let mut effects = vec![Effect::SaveSnapshot(state.snapshot())];
    if state.cursors().regular.has_more() {
        effects.extend(start_scan(state));
    } else {
        state.set_scan(ScanStatus::Complete);
    }
    effects
}

/// Starts the background scan at most once per context.
fn start_scan(state: &mut CatalogState) -> Vec<Effect> {
    if state.scan_status() != ScanStatus::Idle {
        return Vec::new();
    }
    state.set_scan(ScanStatus::Running);
    vec![Effect::StartScan {
        context: state.context(),
        filters: state.filters().clone(),
        from_offset: state.cursors().regular.offset(),
    }]
}

fn settle_search(state: &mut CatalogState) -> Vec<Effect> {
    let query = state.search_text().trim().to_string();
    if state
        .pending_search()
        .is_some_and(|pending| pending.query == query)
    {
        return Vec::new();
    }

    let (_, mut effects) = drop_pending_search(state);
    let active = state.mode().query().unwrap_or_default().to_string();
    if query == active {
        return effects;
    }

    if query.is_empty() {
        let filters = state.filters().clone();
        effects.extend(switch_context(state, filters, ListMode::Paginated, false));
        effects.extend(start_paginated(state));
    } else {
        effects.push(request_search(state, query));
    }
    effects
}

/// Issues a search under a reserved context. The displayed list keeps loading
/// and scrolling until [`adopt_search`] runs on success.
fn request_search(state: &mut CatalogState, query: String) -> Effect {
    let context = state.reserve_context();
    state.set_pending_search(PendingSearch {
        context,
        query: query.clone(),
    });
    state.set_searching(true);
    Effect::RunSearch {
        context,
        filters: state.filters().clone(),
        query,
    }
}

/// Makes a pending search's context current and retires the displayed one.
fn adopt_search(state: &mut CatalogState, pending: PendingSearch) -> Vec<Effect> {
    let old_context = state.context();
    let old_key = state.list_key();
    let filters = state.filters().clone();
    state.enter_context(
        pending.context,
        filters,
        ListMode::Search {
            query: pending.query,
        },
        true,
    );
    vec![
        Effect::CancelContext {
            context: old_context,
        },
        Effect::ClearSnapshot { list_key: old_key },
    ]
}

fn take_pending_if(state: &mut CatalogState, context: ContextId) -> Option<PendingSearch> {
    if state
        .pending_search()
        .is_some_and(|pending| pending.context == context)
    {
        state.take_pending_search()
    } else {
        None
    }
}

/// Abandons an in-flight search, returning its query.
fn drop_pending_search(state: &mut CatalogState) -> (Option<String>, Vec<Effect>) {
    match state.take_pending_search() {
        Some(pending) => {
            state.set_searching(false);
            (
                Some(pending.query),
                vec![Effect::CancelContext {
                    context: pending.context,
                }],
            )
        }
        None => (None, Vec::new()),
    }
}

/// Switches to a search context immediately, keeping the records on screen
/// until the result replaces them.
fn start_search(state: &mut CatalogState, filters: Filters, query: String) -> Vec<Effect> {
    let mut effects = switch_context(
        state,
        filters,
        ListMode::Search {
            query: query.clone(),
        },
        true,
    );
    state.set_searching(true);
    effects.push(Effect::RunSearch {
        context: state.context(),
        filters: state.filters().clone(),
        query,
    });
    effects
}

fn advance_window(state: &mut CatalogState) -> Vec<Effect> {
    let loading = state.loading_state();
    if state.mode().query().is_some() || loading.initial_loading {
        return Vec::new();
    }

    match state.advance_window() {
        WindowAdvance::Grew { .. } => vec![Effect::SaveSnapshot(state.snapshot())],
        WindowAdvance::CaughtUp => {
            let cursor = state.cursors().regular;
            if loading.loading_more
                || state.scan_status() == ScanStatus::Running
                || !cursor.has_more()
            {
                return Vec::new();
            }
            state.set_loading_more(true);
            vec![Effect::FetchPage {
                context: state.context(),
                filters: state.filters().clone(),
                offset: cursor.offset(),
                limit: state.profile().page_size,
            }]
        }
    }
}
