use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::RecordKind;

/// Canonical intra-tier ordering of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOrdering {
    /// Newest first.
    CreatedDesc,
    /// Highest secondary count first, newest first on ties.
    ScoreDesc,
}

/// Fire-and-forget counter RPC, called as `name({id_arg: <record id>})`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterProcedure {
    pub name: String,
    pub id_arg: String,
}

/// Parameters that turn the generic loader into a job list or a company list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProfile {
    pub kind: RecordKind,
    /// Remote table queried for this list.
    pub table: String,
    /// Column projection (PostgREST `select`).
    pub select: String,
    /// Embedded one-to-many relation used to derive counts, if any.
    pub join: Option<String>,
    /// Column matched by free-text search.
    pub search_column: String,
    /// Column used for remote recency ordering.
    pub created_column: String,
    /// Column holding tags; only meaningful with a priority tier.
    pub tags_column: String,
    /// Boolean column that must be true for a row to be listed.
    #[serde(default)]
    pub active_column: Option<String>,
    /// Remote procedure bumped when a record is opened.
    #[serde(default)]
    pub view_counter: Option<CounterProcedure>,
    /// Whether premium records are fetched as a separate, uncapped tier.
    pub has_priority_tier: bool,
    pub page_size: usize,
    pub scan_chunk_size: usize,
    pub window_step: usize,
    /// Distance from the bottom, in pixels, that counts as "near the end".
    pub scroll_threshold: u32,
    #[serde(with = "duration_ms")]
    pub debounce: Duration,
    pub ordering: ListOrdering,
}

impl CatalogProfile {
    pub fn jobs() -> Self {
        Self {
            kind: RecordKind::Job,
            table: "jobs".to_string(),
            select: "id,title,slug,location,type,salary,tags,views,created_at,company_id,category_id,companies(name,logo,is_verified)".to_string(),
            join: None,
            search_column: "title".to_string(),
            created_column: "created_at".to_string(),
            tags_column: "tags".to_string(),
            active_column: Some("is_active".to_string()),
            view_counter: Some(CounterProcedure {
                name: "increment_job_views".to_string(),
                id_arg: "job_id".to_string(),
            }),
            has_priority_tier: true,
            page_size: 25,
            scan_chunk_size: 1000,
            window_step: 25,
            scroll_threshold: 500,
            debounce: Duration::from_millis(500),
            ordering: ListOrdering::CreatedDesc,
        }
    }

    pub fn companies() -> Self {
        Self {
            kind: RecordKind::Company,
            table: "companies".to_string(),
            select: "id,name,slug,logo,website,address,is_verified,is_active,created_at".to_string(),
            join: Some("jobs!company_id(id)".to_string()),
            search_column: "name".to_string(),
            created_column: "created_at".to_string(),
            tags_column: "tags".to_string(),
            active_column: Some("is_active".to_string()),
            view_counter: None,
            has_priority_tier: false,
            page_size: 15,
            scan_chunk_size: 1000,
            window_step: 15,
            scroll_threshold: 100,
            debounce: Duration::from_millis(500),
            ordering: ListOrdering::ScoreDesc,
        }
    }

    pub fn for_kind(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Job => Self::jobs(),
            RecordKind::Company => Self::companies(),
        }
    }

    /// Short prefix used in session cache keys.
    pub fn key_prefix(&self) -> &str {
        &self.table
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
