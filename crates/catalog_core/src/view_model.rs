use crate::{Record, ScanStatus};

/// Spinner inputs for the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingState {
    pub initial_loading: bool,
    pub loading_more: bool,
    pub searching: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogViewModel {
    pub list_key: String,
    /// Revealed prefix of the working set.
    pub visible: Vec<Record>,
    pub total_known: usize,
    pub premium_count: usize,
    pub has_more: bool,
    pub scan: ScanStatus,
    pub loading: LoadingState,
    pub search_query: Option<String>,
    pub dirty: bool,
}
