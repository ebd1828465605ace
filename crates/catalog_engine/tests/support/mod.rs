#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::time::Duration;

use catalog_engine::{
    EngineEvent, EventSink, FailureKind, Filter, GatewayError, ListQuery, RemoteGateway, RowPage,
};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use serde_json::{json, Value};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(catalog_logging::initialize_for_tests);
}

/// In-memory remote store that evaluates queries the way PostgREST would
/// and records every call it receives.
#[derive(Default)]
pub struct FakeGateway {
    tables: HashMap<String, Vec<Value>>,
    calls: Mutex<Vec<ListQuery>>,
    procedures: Mutex<Vec<(String, Value)>>,
    fail_from_offset: Mutex<Option<usize>>,
    delay: Option<Duration>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(table.to_string(), rows);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Ranged queries starting at or after `offset` fail with HTTP 503.
    pub fn fail_from_offset(&self, offset: Option<usize>) {
        *self.fail_from_offset.lock().unwrap() = offset;
    }

    pub fn calls(&self) -> Vec<ListQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .iter()
            .flat_map(|query| query.filters.iter())
            .filter_map(|filter| match filter {
                Filter::ILike { pattern, .. } => Some(pattern.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn procedures(&self) -> Vec<(String, Value)> {
        self.procedures.lock().unwrap().clone()
    }

    fn evaluate(&self, query: &ListQuery) -> Result<RowPage, GatewayError> {
        if let (Some(range), Some(fail_from)) = (query.range, *self.fail_from_offset.lock().unwrap()) {
            if range.offset >= fail_from {
                return Err(GatewayError::new(
                    FailureKind::HttpStatus(503),
                    "503 Service Unavailable",
                ));
            }
        }

        let mut rows: Vec<Value> = self
            .tables
            .get(&query.table)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| query.filters.iter().all(|filter| matches(row, filter)))
            .collect();
        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let (a, b) = (scalar(a, &order.column), scalar(b, &order.column));
                if order.descending {
                    b.cmp(&a)
                } else {
                    a.cmp(&b)
                }
            });
        }

        let total = query.count.then_some(rows.len() as u64);
        let rows = match query.range {
            Some(range) => rows
                .into_iter()
                .skip(range.offset)
                .take(range.limit.unwrap_or(usize::MAX))
                .collect(),
            None => rows,
        };
        Ok(RowPage { rows, total })
    }
}

#[async_trait::async_trait]
impl RemoteGateway for FakeGateway {
    async fn query_list(&self, query: &ListQuery) -> Result<RowPage, GatewayError> {
        self.calls.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.evaluate(query)
    }

    async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, GatewayError> {
        self.procedures.lock().unwrap().push((name.to_string(), args));
        Ok(Value::Null)
    }
}

fn scalar(row: &Value, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn has_tag(row: &Value, column: &str, tag: &str) -> bool {
    row.get(column)
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag)))
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => scalar(row, column) == *value,
        Filter::ILike { column, pattern } => scalar(row, column)
            .to_lowercase()
            .contains(&pattern.to_lowercase()),
        Filter::In { column, values } => values.contains(&scalar(row, column)),
        Filter::HasTag { column, tag } => has_tag(row, column, tag),
        Filter::LacksTag { column, tag } => !has_tag(row, column, tag),
    }
}

/// Job rows, newest first: `premium` premium-tagged ones interleaved with `regular` plain ones.
pub fn job_rows(premium: usize, regular: usize) -> Vec<Value> {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    (0..premium + regular)
        .map(|i| {
            let is_premium = i % 2 == 0 && i / 2 < premium;
            let tags = if is_premium {
                json!(["premium", "new"])
            } else {
                json!(["remote"])
            };
            let category = if i % 3 == 0 { "it" } else { "sales" };
            json!({
                "id": format!("job-{i}"),
                "title": format!("Engineer {i}"),
                "slug": format!("engineer-{i}"),
                "tags": tags,
                "views": i,
                "is_active": true,
                "category_id": category,
                "company_id": (i % 4).to_string(),
                "created_at": (base - ChronoDuration::minutes(i as i64)).to_rfc3339(),
                "companies": { "name": "Acme", "logo": null, "is_verified": true }
            })
        })
        .collect()
}

/// Company rows; company `i` owns `i % 9` jobs.
pub fn company_rows(count: usize) -> Vec<Value> {
    let base = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let jobs: Vec<Value> = (0..i % 9).map(|j| json!({ "id": format!("{i}-{j}") })).collect();
            json!({
                "id": format!("co-{i}"),
                "name": format!("Company {i}"),
                "is_active": true,
                "created_at": (base + ChronoDuration::hours(i as i64)).to_rfc3339(),
                "jobs": jobs
            })
        })
        .collect()
}

/// Company rows where every id in `inactive` has `is_active: false`.
pub fn company_rows_with_inactive(count: usize, inactive: &[usize]) -> Vec<Value> {
    let mut rows = company_rows(count);
    for &i in inactive {
        rows[i]["is_active"] = json!(false);
    }
    rows
}

/// Job rows where each index in `broken` lost its title, so the transform rejects it.
pub fn job_rows_missing_title(premium: usize, regular: usize, broken: &[usize]) -> Vec<Value> {
    let mut rows = job_rows(premium, regular);
    for &i in broken {
        if let Some(row) = rows[i].as_object_mut() {
            row.remove("title");
        }
    }
    rows
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
