use std::collections::HashSet;

use catalog_core::{Record, RecordKind, Tag};
use catalog_logging::catalog_warn;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Turns one raw remote row into a [`Record`]; `None` for rows missing required columns.
pub trait RecordTransform: Send + Sync {
    fn transform(&self, row: &Value) -> Option<Record>;

    /// Transforms a batch, skipping (and logging) malformed rows.
    fn transform_rows(&self, rows: &[Value]) -> Vec<Record> {
        let records: Vec<Record> = rows.iter().filter_map(|row| self.transform(row)).collect();
        let skipped = rows.len() - records.len();
        if skipped > 0 {
            catalog_warn!("Skipped {} malformed rows out of {}", skipped, rows.len());
        }
        records
    }
}

pub fn transform_for(kind: RecordKind) -> &'static dyn RecordTransform {
    match kind {
        RecordKind::Job => &JobTransform,
        RecordKind::Company => &CompanyTransform,
    }
}

/// `jobs` rows with the embedded `companies(name, logo, is_verified)` relation.
#[derive(Debug, Default, Clone, Copy)]
pub struct JobTransform;

impl RecordTransform for JobTransform {
    fn transform(&self, row: &Value) -> Option<Record> {
        let id = id_of(row)?;
        let title = text(row, "title")?;
        let created_at = timestamp(row, "created_at")?;

        let mut builder = Record::builder(id, RecordKind::Job, title, created_at)
            .tags(tags(row))
            .score(row.get("views").and_then(Value::as_u64).unwrap_or(0));
        if let Some(slug) = text(row, "slug") {
            builder = builder.slug(slug);
        }
        for column in ["location", "type", "salary", "company_id", "category_id"] {
            if let Some(value) = scalar(row, column) {
                builder = builder.field(column, value);
            }
        }
        if let Some(company) = row.get("companies").filter(|value| value.is_object()) {
            if let Some(name) = text(company, "name") {
                builder = builder.field("company", name);
            }
            if let Some(logo) = text(company, "logo") {
                builder = builder.field("company_logo", logo);
            }
            if let Some(verified) = company.get("is_verified").and_then(Value::as_bool) {
                builder = builder.field("company_verified", verified.to_string());
            }
        }
        Some(builder.build())
    }
}

/// `companies` rows with the embedded `jobs(id)` relation; the job count becomes the score.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompanyTransform;

impl RecordTransform for CompanyTransform {
    fn transform(&self, row: &Value) -> Option<Record> {
        let id = id_of(row)?;
        let name = text(row, "name")?;
        let created_at = timestamp(row, "created_at")?;

        let job_ids: HashSet<String> = row
            .get("jobs")
            .and_then(Value::as_array)
            .map(|jobs| jobs.iter().filter_map(id_of).collect())
            .unwrap_or_default();

        let mut builder = Record::builder(id, RecordKind::Company, name, created_at)
            .tags(tags(row))
            .score(job_ids.len() as u64);
        if let Some(slug) = text(row, "slug") {
            builder = builder.slug(slug);
        }
        for column in ["logo", "website", "address", "is_verified"] {
            if let Some(value) = scalar(row, column) {
                builder = builder.field(column, value);
            }
        }
        Some(builder.build())
    }
}

fn id_of(row: &Value) -> Option<String> {
    match row.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn text(row: &Value, column: &str) -> Option<String> {
    row.get(column)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Strings, numbers and booleans rendered as display text.
fn scalar(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Value::Number(value) => Some(value.to_string()),
        Value::Bool(value) => Some(value.to_string()),
        _ => None,
    }
}

fn tags(row: &Value) -> Vec<Tag> {
    row.get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .filter_map(Tag::parse)
                .collect()
        })
        .unwrap_or_default()
}

/// Accepts RFC 3339 and the zone-less `timestamp` form, which is taken as UTC.
fn timestamp(row: &Value, column: &str) -> Option<DateTime<Utc>> {
    let raw = row.get(column)?.as_str()?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn job_row_keeps_known_tags_and_company() {
        let row = json!({
            "id": "9b1c",
            "title": " Backend Developer ",
            "slug": "backend-developer",
            "location": "Baku",
            "salary": null,
            "tags": ["premium", "hot", "remote"],
            "views": 41,
            "created_at": "2024-05-20T08:30:00+00:00",
            "companies": { "name": "Acme", "logo": null, "is_verified": true }
        });

        let record = JobTransform.transform(&row).unwrap();
        assert_eq!(record.id().as_str(), "9b1c");
        assert_eq!(record.title(), "Backend Developer");
        assert_eq!(record.tags(), &[Tag::Premium, Tag::Remote]);
        assert_eq!(record.score(), 41);
        assert_eq!(record.field("company"), Some("Acme"));
        assert_eq!(record.field("company_verified"), Some("true"));
        assert_eq!(record.field("salary"), None);
        assert_eq!(
            record.created_at(),
            Utc.with_ymd_and_hms(2024, 5, 20, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn company_score_counts_distinct_jobs() {
        let row = json!({
            "id": 42,
            "name": "Acme",
            "created_at": "2023-01-01T00:00:00",
            "jobs": [{ "id": "a" }, { "id": "b" }, { "id": "a" }]
        });

        let record = CompanyTransform.transform(&row).unwrap();
        assert_eq!(record.id().as_str(), "42");
        assert_eq!(record.score(), 2);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let rows = vec![
            json!({ "id": "a", "name": "Kept", "created_at": "2023-01-01T00:00:00Z" }),
            json!({ "id": "b", "created_at": "2023-01-01T00:00:00Z" }),
            json!({ "id": "c", "name": "Bad date", "created_at": "yesterday" }),
        ];

        let records = CompanyTransform.transform_rows(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "Kept");
    }
}
