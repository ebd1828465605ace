use serde::{Deserialize, Serialize};

use crate::{CatalogProfile, RecordId};

/// Active filter set of a list context (search query excluded).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filters {
    pub category: Option<String>,
    pub company: Option<String>,
    /// Restrict to these ids ("saved jobs" view).
    pub saved_only: Option<Vec<RecordId>>,
}

impl Filters {
    /// Saved-only with nothing saved can never match a row.
    pub fn matches_nothing(&self) -> bool {
        self.saved_only.as_ref().is_some_and(|ids| ids.is_empty())
    }
}

/// Partial filter update. `None` leaves a field alone, `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPatch {
    pub category: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub saved_only: Option<Option<Vec<RecordId>>>,
}

impl FilterPatch {
    pub fn category(value: Option<String>) -> Self {
        Self {
            category: Some(value),
            ..Self::default()
        }
    }

    pub fn company(value: Option<String>) -> Self {
        Self {
            company: Some(value),
            ..Self::default()
        }
    }

    pub fn saved_only(value: Option<Vec<RecordId>>) -> Self {
        Self {
            saved_only: Some(value),
            ..Self::default()
        }
    }

    /// Returns the patched filters; callers compare with the original to detect a change.
    pub fn apply(&self, filters: &Filters) -> Filters {
        let mut next = filters.clone();
        if let Some(category) = &self.category {
            next.category = normalize(category.clone());
        }
        if let Some(company) = &self.company {
            next.company = normalize(company.clone());
        }
        if let Some(saved) = &self.saved_only {
            next.saved_only = saved.clone().map(|mut ids| {
                ids.sort();
                ids.dedup();
                ids
            });
        }
        next
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Session cache key identifying a list's filter identity.
///
/// `jobs`, `jobs:company=42`, `jobs:category=it;saved`, `companies:q=acme`.
pub fn list_key(profile: &CatalogProfile, filters: &Filters, query: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(category) = &filters.category {
        parts.push(format!("category={category}"));
    }
    if let Some(company) = &filters.company {
        parts.push(format!("company={company}"));
    }
    if let Some(saved) = &filters.saved_only {
        if saved.is_empty() {
            parts.push("saved".to_string());
        } else {
            let ids: Vec<&str> = saved.iter().map(RecordId::as_str).collect();
            parts.push(format!("saved={}", ids.join(",")));
        }
    }
    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        parts.push(format!("q={}", query.to_lowercase()));
    }

    if parts.is_empty() {
        profile.key_prefix().to_string()
    } else {
        format!("{}:{}", profile.key_prefix(), parts.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_list_key_is_the_table() {
        let key = list_key(&CatalogProfile::jobs(), &Filters::default(), None);
        assert_eq!(key, "jobs");
    }

    #[test]
    fn list_key_includes_every_filter_and_query() {
        let filters = Filters {
            category: Some("it".to_string()),
            company: Some("42".to_string()),
            saved_only: None,
        };
        let key = list_key(&CatalogProfile::jobs(), &filters, Some("  Rust "));
        assert_eq!(key, "jobs:category=it;company=42;q=rust");
    }

    #[test]
    fn blank_query_does_not_change_key() {
        let key = list_key(&CatalogProfile::companies(), &Filters::default(), Some("   "));
        assert_eq!(key, "companies");
    }

    #[test]
    fn patch_trims_and_clears() {
        let base = Filters {
            category: Some("it".to_string()),
            ..Filters::default()
        };
        let next = FilterPatch::company(Some(" 42 ".to_string())).apply(&base);
        assert_eq!(next.company.as_deref(), Some("42"));
        assert_eq!(next.category.as_deref(), Some("it"));

        let cleared = FilterPatch::category(Some("  ".to_string())).apply(&next);
        assert_eq!(cleared.category, None);
    }

    #[test]
    fn saved_ids_are_sorted_and_deduped() {
        let patch = FilterPatch::saved_only(Some(vec!["b".into(), "a".into(), "b".into()]));
        let next = patch.apply(&Filters::default());
        assert_eq!(next.saved_only, Some(vec!["a".into(), "b".into()]));
        assert!(!next.matches_nothing());

        let empty = FilterPatch::saved_only(Some(Vec::new())).apply(&Filters::default());
        assert!(empty.matches_nothing());
    }
}
