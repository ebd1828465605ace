use catalog_core::{CatalogProfile, Filters, Record, RecordId, RecordKind, Tag};

use crate::gateway::{Filter, ListQuery, RemoteGateway};
use crate::transform::transform_for;
use crate::GatewayError;

/// Rows of one query after transformation, plus the remote total if counted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordBatch {
    pub records: Vec<Record>,
    /// Raw rows returned, including any the transform rejected.
    pub received: usize,
    pub total: Option<u64>,
}

/// Query matching the list's filter context, newest first, with no tier or range applied.
pub fn base_query(profile: &CatalogProfile, filters: &Filters) -> ListQuery {
    let mut query = ListQuery::new(&profile.table, &profile.select).order_desc(&profile.created_column);
    if let Some(column) = &profile.active_column {
        query = query.filter(Filter::eq(column, "true"));
    }
    if let Some(category) = &filters.category {
        query = query.filter(Filter::eq(owner_column(profile, "category_id"), category));
    }
    if let Some(company) = &filters.company {
        query = query.filter(Filter::eq(owner_column(profile, "company_id"), company));
    }
    if let Some(saved) = &filters.saved_only {
        query = query.filter(Filter::In {
            column: "id".to_string(),
            values: saved.iter().map(RecordId::to_string).collect(),
        });
    }
    query
}

/// Companies are filtered on their own id.
fn owner_column<'a>(profile: &CatalogProfile, column: &'a str) -> &'a str {
    match (profile.kind, column) {
        (RecordKind::Company, "company_id") => "id",
        _ => column,
    }
}

/// Every premium record of the context, uncapped.
pub fn premium_tier(profile: &CatalogProfile, filters: &Filters) -> ListQuery {
    base_query(profile, filters).filter(Filter::HasTag {
        column: profile.tags_column.clone(),
        tag: Tag::Premium.as_str().to_string(),
    })
}

/// One window of the regular tier. Lists without a priority tier page over every row.
pub fn regular_tier(
    profile: &CatalogProfile,
    filters: &Filters,
    offset: usize,
    limit: usize,
) -> ListQuery {
    let query = base_query(profile, filters).range(offset, limit);
    if profile.has_priority_tier {
        query.filter(Filter::LacksTag {
            column: profile.tags_column.clone(),
            tag: Tag::Premium.as_str().to_string(),
        })
    } else {
        query
    }
}

/// Full, unpaginated substring search across both tiers.
pub fn search(profile: &CatalogProfile, filters: &Filters, text: &str) -> ListQuery {
    base_query(profile, filters).filter(Filter::ilike(&profile.search_column, text.trim()))
}

/// Runs `query`, embedding the profile's relation when it has one.
pub async fn fetch_records(
    gateway: &dyn RemoteGateway,
    profile: &CatalogProfile,
    query: &ListQuery,
) -> Result<RecordBatch, GatewayError> {
    let page = match &profile.join {
        Some(relation) => gateway.query_with_join(query, relation).await?,
        None => gateway.query_list(query).await?,
    };
    Ok(RecordBatch {
        records: transform_for(profile.kind).transform_rows(&page.rows),
        received: page.rows.len(),
        total: page.total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_context_filters() {
        let filters = Filters {
            category: Some("it".to_string()),
            company: Some("42".to_string()),
            saved_only: None,
        };
        let query = regular_tier(&CatalogProfile::jobs(), &filters, 25, 1000);

        assert_eq!(query.table, "jobs");
        assert_eq!(
            query.filters,
            vec![
                Filter::eq("is_active", "true"),
                Filter::eq("category_id", "it"),
                Filter::eq("company_id", "42"),
                Filter::LacksTag {
                    column: "tags".to_string(),
                    tag: "premium".to_string(),
                },
            ]
        );
        assert_eq!(query.range.map(|r| (r.offset, r.limit)), Some((25, Some(1000))));
    }

    #[test]
    fn companies_have_no_tier_filter() {
        let filters = Filters {
            company: Some("42".to_string()),
            ..Filters::default()
        };
        let query = regular_tier(&CatalogProfile::companies(), &filters, 0, 15);
        assert_eq!(
            query.filters,
            vec![Filter::eq("is_active", "true"), Filter::eq("id", "42")]
        );
    }

    #[test]
    fn search_is_unranged() {
        let query = search(&CatalogProfile::companies(), &Filters::default(), " acme ");
        assert_eq!(query.range, None);
        assert_eq!(
            query.filters,
            vec![Filter::eq("is_active", "true"), Filter::ilike("name", "acme")]
        );
    }
}
