use serde::{Deserialize, Serialize};

use crate::Record;

/// Bumped whenever the serialized record shape changes; older blobs are treated as a miss.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// Session-scoped snapshot of a list's working set and scroll position.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub version: u32,
    pub list_key: String,
    pub records: Vec<Record>,
    pub scroll_offset: u32,
    /// Remote offset of the regular tier already covered.
    #[serde(default)]
    pub regular_offset: usize,
    /// True once every remote row has been merged (or a search result is held).
    #[serde(default)]
    pub scan_complete: bool,
    /// How many records were revealed when the snapshot was taken.
    #[serde(default)]
    pub window_len: usize,
}

impl CacheEntry {
    pub fn new(list_key: impl Into<String>, records: Vec<Record>, scroll_offset: u32) -> Self {
        let window_len = records.len();
        Self {
            version: CACHE_SCHEMA_VERSION,
            list_key: list_key.into(),
            records,
            scroll_offset,
            regular_offset: 0,
            scan_complete: true,
            window_len,
        }
    }

    pub fn with_progress(mut self, regular_offset: usize, scan_complete: bool) -> Self {
        self.regular_offset = regular_offset;
        self.scan_complete = scan_complete;
        self
    }

    pub fn with_window(mut self, window_len: usize) -> Self {
        self.window_len = window_len;
        self
    }

    pub fn is_current(&self) -> bool {
        self.version == CACHE_SCHEMA_VERSION
    }
}
