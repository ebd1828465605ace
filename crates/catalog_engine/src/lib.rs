//! Catalog engine: remote queries, background loading and the session cache.
//!
//! [`CatalogLoader`] is the entry point for front-ends. The lower-level pieces
//! are public for alternative gateways and tests.
mod engine;
mod fast_path;
mod gateway;
mod loader;
mod persist;
mod query;
mod rest;
mod scan;
mod search;
mod session_cache;
mod sink;
mod transform;
mod types;

pub use engine::EngineHandle;
pub use fast_path::{load_first_page, load_page};
pub use gateway::{Filter, ListQuery, Order, RemoteGateway, RowPage, RowRange};
pub use loader::CatalogLoader;
pub use persist::{ensure_session_dir, PersistError, SessionDir};
pub use query::{base_query, fetch_records, premium_tier, regular_tier, RecordBatch};
pub use rest::{GatewaySettings, PostgrestGateway};
pub use scan::{run_scan, ScanRequest};
pub use search::run_search;
pub use session_cache::{
    CacheError, FileSessionStore, MemorySessionStore, SessionCache, SessionStore,
};
pub use sink::EventSink;
pub use transform::{transform_for, CompanyTransform, JobTransform, RecordTransform};
pub use types::{EngineEvent, FailureKind, FirstPage, GatewayError};
