use std::fmt;

use catalog_core::{ContextId, Msg, Record, RecordId, Revision};
use thiserror::Error;

use crate::query::RecordBatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// A failed remote call. Never escapes an engine task; it is logged and
/// reported to the state machine as a `*Failed` message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: FailureKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Results reported by engine tasks, tagged with the context they were issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    FirstPage {
        context: ContextId,
        result: Result<FirstPage, GatewayError>,
    },
    ScanChunk {
        context: ContextId,
        records: Vec<Record>,
        requested: usize,
        received: usize,
    },
    ScanFinished {
        context: ContextId,
    },
    ScanFailed {
        context: ContextId,
        error: GatewayError,
    },
    Page {
        context: ContextId,
        requested: usize,
        result: Result<RecordBatch, GatewayError>,
    },
    Search {
        context: ContextId,
        result: Result<Vec<Record>, GatewayError>,
    },
    DebounceElapsed {
        revision: Revision,
    },
    ViewsIncremented {
        id: RecordId,
        result: Result<(), GatewayError>,
    },
}

/// Both tiers of the fast path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirstPage {
    pub premium: Vec<Record>,
    pub regular: Vec<Record>,
    /// Raw regular rows returned; decides whether more pages exist.
    pub regular_received: usize,
}

impl EngineEvent {
    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::FirstPage { context, result } => match result {
                Ok(page) => Msg::FirstPageLoaded {
                    context,
                    premium: page.premium,
                    regular: page.regular,
                    regular_received: page.regular_received,
                },
                Err(error) => Msg::FirstPageFailed {
                    context,
                    error: error.to_string(),
                },
            },
            EngineEvent::ScanChunk {
                context,
                records,
                requested,
                received,
            } => Msg::ScanChunkLoaded {
                context,
                records,
                requested,
                received,
            },
            EngineEvent::ScanFinished { context } => Msg::ScanFinished { context },
            EngineEvent::ScanFailed { context, error } => Msg::ScanFailed {
                context,
                error: error.to_string(),
            },
            EngineEvent::Page {
                context,
                requested,
                result,
            } => match result {
                Ok(batch) => Msg::PageLoaded {
                    context,
                    records: batch.records,
                    requested,
                    received: batch.received,
                },
                Err(error) => Msg::PageFailed {
                    context,
                    error: error.to_string(),
                },
            },
            EngineEvent::Search { context, result } => match result {
                Ok(records) => Msg::SearchLoaded { context, records },
                Err(error) => Msg::SearchFailed {
                    context,
                    error: error.to_string(),
                },
            },
            EngineEvent::DebounceElapsed { revision } => Msg::DebounceElapsed { revision },
            EngineEvent::ViewsIncremented { .. } => Msg::NoOp,
        }
    }
}
