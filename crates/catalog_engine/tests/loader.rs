mod support;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use catalog_core::{
    CatalogProfile, FilterPatch, ListMode, RecordId, ScanStatus, ScrollMetrics, Tier,
};
use catalog_engine::{CatalogLoader, Filter, MemorySessionStore, SessionCache};
use pretty_assertions::assert_eq;

use support::{
    company_rows, company_rows_with_inactive, init_logging, job_rows, job_rows_missing_title,
    FakeGateway,
};

const WAIT: Duration = Duration::from_secs(5);

fn scan_complete(loader: &mut CatalogLoader) -> bool {
    loader.pump_until(|state| state.scan_status() == ScanStatus::Complete, WAIT)
}

#[test]
fn cold_mount_shows_the_fast_path_then_completes_the_scan() {
    init_logging();
    let gateway = Arc::new(FakeGateway::new().with_table("jobs", job_rows(6, 60)));
    let mut loader = CatalogLoader::new(
        CatalogProfile::jobs(),
        gateway.clone(),
        SessionCache::in_memory(),
    );

    loader.mount();
    assert!(loader.loading_state().initial_loading);

    assert!(scan_complete(&mut loader));
    let set = loader.state().working_set();
    assert_eq!(set.len(), 66);
    assert_eq!(set.premium_count(), 6);
    assert!(set.records()[..6].iter().all(|r| r.tier() == Tier::Premium));
    assert_eq!(loader.visible_records().len(), 25);
    assert!(!loader.has_more());
    assert!(!loader.loading_state().initial_loading);
    assert!(loader.consume_dirty());

    // Premium tier, first regular page, one scan chunk.
    assert_eq!(gateway.calls().len(), 3);
}

#[test]
fn rejected_rows_do_not_end_pagination_early() {
    init_logging();
    let gateway = Arc::new(
        FakeGateway::new().with_table("jobs", job_rows_missing_title(0, 200, &[3])),
    );
    let mut loader = CatalogLoader::new(
        CatalogProfile::jobs(),
        gateway.clone(),
        SessionCache::in_memory(),
    );

    loader.mount();
    assert!(scan_complete(&mut loader));

    let set = loader.state().working_set();
    assert_eq!(set.len(), 199);
    assert!(set.iter().all(|record| record.id().as_str() != "job-3"));
    // Premium tier, first regular page, one scan chunk from offset 25.
    let calls = gateway.calls();
    assert_eq!(calls.len(), 3);
    let scan_offset = calls
        .iter()
        .filter_map(|query| query.range)
        .map(|range| range.offset)
        .max();
    assert_eq!(scan_offset, Some(25));
}

#[test]
fn inactive_companies_are_never_listed() {
    init_logging();
    let gateway = Arc::new(
        FakeGateway::new().with_table("companies", company_rows_with_inactive(40, &[5, 35])),
    );
    let mut profile = CatalogProfile::companies();
    profile.debounce = Duration::from_millis(20);
    let mut loader = CatalogLoader::new(profile, gateway.clone(), SessionCache::in_memory());

    loader.mount();
    assert!(scan_complete(&mut loader));
    let set = loader.state().working_set();
    assert_eq!(set.len(), 38);
    assert!(set
        .iter()
        .all(|record| !["co-5", "co-35"].contains(&record.id().as_str())));

    loader.set_search_query("Company 3");
    assert!(loader.pump_until(
        |state| state.mode().query() == Some("Company 3") && !state.loading_state().searching,
        WAIT,
    ));
    // "Company 3" and "Company 30".."Company 39", less the inactive co-35.
    assert_eq!(loader.state().working_set().len(), 10);
    let active = Filter::eq("is_active", "true");
    assert!(gateway
        .calls()
        .iter()
        .all(|query| query.filters.contains(&active)));
}

#[test]
fn remount_restores_from_the_session_cache_without_fetching() {
    init_logging();
    let store = MemorySessionStore::new();
    let first_gateway = Arc::new(FakeGateway::new().with_table("companies", company_rows(40)));
    let mut first = CatalogLoader::new(
        CatalogProfile::companies(),
        first_gateway,
        SessionCache::new(store.clone()),
    );
    first.mount();
    assert!(scan_complete(&mut first));
    first.load_more();
    first.on_scroll(ScrollMetrics::new(640, 800, 4_000));
    let shown = first.visible_records().to_vec();
    drop(first);

    let second_gateway = Arc::new(FakeGateway::new().with_table("companies", company_rows(40)));
    let mut second = CatalogLoader::new(
        CatalogProfile::companies(),
        second_gateway.clone(),
        SessionCache::new(store),
    );
    second.mount();

    assert_eq!(second.visible_records(), shown.as_slice());
    assert_eq!(second.state().working_set().len(), 40);
    assert_eq!(second.take_scroll_restore(), Some(640));
    assert_eq!(second.take_scroll_restore(), None);

    thread::sleep(Duration::from_millis(50));
    second.pump();
    assert!(second_gateway.calls().is_empty());
}

#[test]
fn rapid_typing_issues_a_single_search() {
    init_logging();
    let gateway = Arc::new(FakeGateway::new().with_table("jobs", job_rows(6, 60)));
    let mut profile = CatalogProfile::jobs();
    profile.debounce = Duration::from_millis(40);
    let mut loader = CatalogLoader::new(profile, gateway.clone(), SessionCache::in_memory());
    loader.mount();
    assert!(scan_complete(&mut loader));

    loader.set_search_query("engineer");
    loader.set_search_query("engineering");
    loader.set_search_query("Engineer 1");

    assert!(loader.pump_until(
        |state| state.mode().query() == Some("Engineer 1") && !state.loading_state().searching,
        WAIT,
    ));
    thread::sleep(Duration::from_millis(100));
    loader.pump();

    assert_eq!(gateway.search_calls(), vec!["Engineer 1".to_string()]);
    // "Engineer 1", "Engineer 10".."Engineer 19"
    assert_eq!(loader.state().working_set().len(), 11);
    assert_eq!(loader.visible_records().len(), 11);
    assert!(!loader.has_more());

    loader.set_search_query("");
    assert!(loader.pump_until(
        |state| state.mode() == &ListMode::Paginated && state.scan_status() == ScanStatus::Complete,
        WAIT,
    ));
    assert_eq!(loader.state().working_set().len(), 66);
}

#[test]
fn filter_change_supersedes_in_flight_work() {
    init_logging();
    let gateway = Arc::new(
        FakeGateway::new()
            .with_table("jobs", job_rows(6, 60))
            .with_delay(Duration::from_millis(100)),
    );
    let mut loader = CatalogLoader::new(
        CatalogProfile::jobs(),
        gateway.clone(),
        SessionCache::in_memory(),
    );

    loader.mount();
    loader.set_filters(FilterPatch::category(Some("it".to_string())));

    assert!(scan_complete(&mut loader));
    thread::sleep(Duration::from_millis(200));
    loader.pump();

    let set = loader.state().working_set();
    assert_eq!(set.len(), 22);
    assert!(set.iter().all(|record| record.field("category_id") == Some("it")));
    assert_eq!(loader.state().list_key(), "jobs:category=it");
}

#[test]
fn failed_scan_keeps_progress_and_load_more_recovers() {
    init_logging();
    let gateway = Arc::new(FakeGateway::new().with_table("jobs", job_rows(6, 60)));
    gateway.fail_from_offset(Some(25));
    let mut loader = CatalogLoader::new(
        CatalogProfile::jobs(),
        gateway.clone(),
        SessionCache::in_memory(),
    );

    loader.mount();
    assert!(loader.pump_until(|state| state.scan_status() == ScanStatus::Failed, WAIT));
    assert_eq!(loader.state().working_set().len(), 31);
    assert!(loader.has_more());

    gateway.fail_from_offset(None);
    loader.load_more();
    assert_eq!(loader.visible_records().len(), 31);
    loader.load_more();
    assert!(loader.loading_state().loading_more);

    assert!(loader.pump_until(|state| !state.loading_state().loading_more, WAIT));
    assert_eq!(loader.state().working_set().len(), 56);
    assert_eq!(loader.visible_records().len(), 56);
}

#[test]
fn opening_a_job_bumps_its_view_counter() {
    init_logging();
    let gateway = Arc::new(FakeGateway::new().with_table("jobs", job_rows(0, 3)));
    let mut loader = CatalogLoader::new(
        CatalogProfile::jobs(),
        gateway.clone(),
        SessionCache::in_memory(),
    );

    loader.open_record(RecordId::new("job-2"));

    let mut waited = Duration::ZERO;
    while gateway.procedures().is_empty() && waited < WAIT {
        thread::sleep(Duration::from_millis(10));
        waited += Duration::from_millis(10);
    }
    let procedures = gateway.procedures();
    assert_eq!(procedures.len(), 1);
    assert_eq!(procedures[0].0, "increment_job_views");
    assert_eq!(procedures[0].1, serde_json::json!({ "job_id": "job-2" }));
}
