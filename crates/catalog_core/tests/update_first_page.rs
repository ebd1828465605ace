use std::sync::Once;

use catalog_core::{
    update, CatalogProfile, CatalogState, Effect, FilterPatch, Msg, Record, RecordKind,
    ScanStatus, Tag, Tier,
};
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(catalog_logging::initialize_for_tests);
}

fn jobs(prefix: &str, count: usize, premium: bool) -> Vec<Record> {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let at = base - Duration::minutes(i as i64);
            let builder = Record::builder(
                format!("{prefix}-{i}").as_str(),
                RecordKind::Job,
                format!("{prefix} {i}"),
                at,
            );
            if premium {
                builder.tag(Tag::Premium).build()
            } else {
                builder.build()
            }
        })
        .collect()
}

fn mount_cold(profile: CatalogProfile) -> (CatalogState, Vec<Effect>) {
    update(CatalogState::new(profile), Msg::Mounted { restored: None })
}

#[test]
fn cold_mount_requests_first_page() {
    init_logging();
    let (state, effects) = mount_cold(CatalogProfile::jobs());

    assert!(state.loading_state().initial_loading);
    assert_eq!(
        effects,
        vec![Effect::FetchFirstPage {
            context: state.context(),
            filters: state.filters().clone(),
        }]
    );
}

#[test]
fn first_page_merges_both_tiers_premium_first() {
    init_logging();
    let (state, _) = mount_cold(CatalogProfile::jobs());
    let context = state.context();

    let (mut state, effects) = update(
        state,
        Msg::FirstPageLoaded {
            context,
            premium: jobs("p", 6, true),
            regular: jobs("r", 25, false),
            regular_received: 25,
        },
    );

    let set = state.working_set();
    assert_eq!(set.len(), 31);
    assert_eq!(set.premium_count(), 6);
    assert!(set.records()[..6].iter().all(|r| r.tier() == Tier::Premium));
    assert!(state.has_more());
    assert!(!state.loading_state().initial_loading);
    assert_eq!(state.scan_status(), ScanStatus::Running);
    assert!(state.consume_dirty());

    assert!(matches!(effects[0], Effect::SaveSnapshot(ref entry) if entry.records.len() == 31));
    assert_eq!(
        effects[1],
        Effect::StartScan {
            context,
            filters: state.filters().clone(),
            from_offset: 25,
        }
    );
}

#[test]
fn short_first_page_completes_without_a_scan() {
    init_logging();
    let (state, _) = mount_cold(CatalogProfile::jobs());
    let context = state.context();

    let (state, effects) = update(
        state,
        Msg::FirstPageLoaded {
            context,
            premium: Vec::new(),
            regular: jobs("r", 9, false),
            regular_received: 9,
        },
    );

    assert!(!state.has_more());
    assert_eq!(state.scan_status(), ScanStatus::Complete);
    assert!(effects
        .iter()
        .all(|effect| !matches!(effect, Effect::StartScan { .. })));
}

#[test]
fn rejected_rows_still_count_toward_a_full_first_page() {
    init_logging();
    let (state, _) = mount_cold(CatalogProfile::jobs());
    let context = state.context();

    let (state, effects) = update(
        state,
        Msg::FirstPageLoaded {
            context,
            premium: Vec::new(),
            regular: jobs("r", 24, false),
            regular_received: 25,
        },
    );

    assert_eq!(state.working_set().len(), 24);
    assert!(state.has_more());
    assert_eq!(state.scan_status(), ScanStatus::Running);
    assert!(effects.contains(&Effect::StartScan {
        context,
        filters: state.filters().clone(),
        from_offset: 25,
    }));
}

#[test]
fn first_page_failure_leaves_an_empty_list_and_clears_loading() {
    init_logging();
    let (state, _) = mount_cold(CatalogProfile::jobs());
    let context = state.context();

    let (state, effects) = update(
        state,
        Msg::FirstPageFailed {
            context,
            error: "network error".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert!(state.working_set().is_empty());
    assert!(!state.loading_state().initial_loading);
    assert!(!state.has_more());
}

#[test]
fn results_for_a_superseded_context_are_discarded() {
    init_logging();
    let (state, _) = mount_cold(CatalogProfile::jobs());
    let old_context = state.context();

    let (state, effects) = update(
        state,
        Msg::FiltersChanged(FilterPatch::category(Some("it".to_string()))),
    );
    assert_eq!(effects[0], Effect::CancelContext { context: old_context });
    assert_eq!(
        effects[1],
        Effect::ClearSnapshot {
            list_key: "jobs".to_string()
        }
    );
    assert!(matches!(effects[2], Effect::FetchFirstPage { .. }));

    let (state, effects) = update(
        state,
        Msg::FirstPageLoaded {
            context: old_context,
            premium: Vec::new(),
            regular: jobs("late", 25, false),
            regular_received: 25,
        },
    );
    assert!(effects.is_empty());
    assert!(state.working_set().is_empty());
    assert!(state.loading_state().initial_loading);
    assert_eq!(state.list_key(), "jobs:category=it");
}

#[test]
fn unchanged_filters_are_a_noop() {
    init_logging();
    let (state, _) = mount_cold(CatalogProfile::jobs());
    let before = state.clone();

    let (next, effects) = update(state, Msg::FiltersChanged(FilterPatch::company(None)));

    assert_eq!(next, before);
    assert!(effects.is_empty());
}

#[test]
fn empty_saved_list_short_circuits_without_fetching() {
    init_logging();
    let (state, _) = mount_cold(CatalogProfile::jobs());

    let (state, effects) = update(
        state,
        Msg::FiltersChanged(FilterPatch::saved_only(Some(Vec::new()))),
    );

    assert!(effects
        .iter()
        .all(|effect| !matches!(effect, Effect::FetchFirstPage { .. })));
    assert!(matches!(effects.last(), Some(Effect::SaveSnapshot(_))));
    assert!(state.working_set().is_empty());
    assert!(!state.has_more());
    assert!(!state.loading_state().initial_loading);
}

#[test]
fn update_is_noop_for_tick() {
    let state = CatalogState::new(CatalogProfile::companies());
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
