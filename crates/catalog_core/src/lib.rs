//! Catalog core: pure list-loading state machine and view-model helpers.
//!
//! Nothing in this crate performs IO. Remote results and timer expiries come
//! in as [`Msg`]s, and requests for work go out as [`Effect`]s that an engine
//! executes.
mod cursor;
mod effect;
mod filters;
mod msg;
mod profile;
mod record;
mod snapshot;
mod state;
mod update;
mod view_model;
mod window;
mod working_set;

pub use cursor::{FetchCursor, TierCursors};
pub use effect::Effect;
pub use filters::{list_key, FilterPatch, Filters};
pub use msg::Msg;
pub use profile::{CatalogProfile, CounterProcedure, ListOrdering};
pub use record::{Record, RecordBuilder, RecordId, RecordKind, Tag, Tier};
pub use snapshot::{CacheEntry, CACHE_SCHEMA_VERSION};
pub use state::{CatalogState, ContextId, ListMode, PendingSearch, Revision, ScanStatus};
pub use update::update;
pub use view_model::{CatalogViewModel, LoadingState};
pub use window::{DisplayWindow, ScrollMetrics, WindowAdvance};
pub use working_set::{merge, WorkingSet};
