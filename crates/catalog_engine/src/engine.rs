use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use catalog_core::{CatalogProfile, ContextId, Filters, RecordId, Revision};
use catalog_logging::{catalog_debug, catalog_error, catalog_warn};
use serde_json::Value;
use tokio::sync::mpsc as async_mpsc;
use tokio_util::sync::CancellationToken;

use crate::fast_path::{load_first_page, load_page};
use crate::gateway::RemoteGateway;
use crate::scan::{run_scan, ScanRequest};
use crate::search::run_search;
use crate::sink::EventSink;
use crate::{EngineEvent, GatewayError};

enum EngineCommand {
    FirstPage {
        context: ContextId,
        filters: Filters,
    },
    Scan(ScanRequest),
    Page {
        context: ContextId,
        filters: Filters,
        offset: usize,
        limit: usize,
    },
    Search {
        context: ContextId,
        filters: Filters,
        query: String,
    },
    ArmDebounce {
        revision: Revision,
        delay: Duration,
    },
    Cancel {
        context: ContextId,
    },
    IncrementViews {
        id: RecordId,
    },
}

/// Runs remote work for one list on a dedicated thread.
///
/// Commands go in over an unbounded channel; results come back as [`EngineEvent`]s
/// that the owner drains with [`EngineHandle::try_recv`]. Dropping the handle stops
/// the thread and aborts whatever is still in flight.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn spawn(gateway: Arc<dyn RemoteGateway>, profile: CatalogProfile) -> Self {
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    catalog_error!("Engine runtime failed to start: {}", err);
                    return;
                }
            };
            let worker = Worker {
                gateway,
                profile: Arc::new(profile),
                events: event_tx,
                contexts: HashMap::new(),
                debounce: None,
            };
            runtime.block_on(worker.run(cmd_rx));
        });

        Self { cmd_tx, event_rx }
    }

    pub fn fetch_first_page(&self, context: ContextId, filters: Filters) {
        self.send(EngineCommand::FirstPage { context, filters });
    }

    pub fn start_scan(&self, context: ContextId, filters: Filters, from_offset: usize) {
        self.send(EngineCommand::Scan(ScanRequest {
            context,
            filters,
            from_offset,
        }));
    }

    pub fn fetch_page(&self, context: ContextId, filters: Filters, offset: usize, limit: usize) {
        self.send(EngineCommand::Page {
            context,
            filters,
            offset,
            limit,
        });
    }

    pub fn run_search(&self, context: ContextId, filters: Filters, query: String) {
        self.send(EngineCommand::Search {
            context,
            filters,
            query,
        });
    }

    /// (Re)starts the debounce timer; a previously armed revision never fires.
    pub fn arm_debounce(&self, revision: Revision, delay: Duration) {
        self.send(EngineCommand::ArmDebounce { revision, delay });
    }

    pub fn cancel_context(&self, context: ContextId) {
        self.send(EngineCommand::Cancel { context });
    }

    pub fn increment_views(&self, id: RecordId) {
        self.send(EngineCommand::IncrementViews { id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            catalog_warn!("Engine thread is gone; command dropped");
        }
    }
}

struct Worker {
    gateway: Arc<dyn RemoteGateway>,
    profile: Arc<CatalogProfile>,
    events: mpsc::Sender<EngineEvent>,
    /// Cancellation per live context.
    contexts: HashMap<ContextId, CancellationToken>,
    debounce: Option<CancellationToken>,
}

impl Worker {
    async fn run(mut self, mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>) {
        while let Some(command) = cmd_rx.recv().await {
            self.handle(command);
        }
        for token in self.contexts.values() {
            token.cancel();
        }
        catalog_debug!("Engine for {} stopped", self.profile.table);
    }

    fn token_for(&mut self, context: ContextId) -> CancellationToken {
        self.contexts.entry(context).or_default().clone()
    }

    fn handle(&mut self, command: EngineCommand) {
        let gateway = self.gateway.clone();
        let profile = self.profile.clone();
        let events = self.events.clone();

        match command {
            EngineCommand::FirstPage { context, filters } => {
                let cancel = self.token_for(context);
                tokio::spawn(async move {
                    let loaded = cancel
                        .run_until_cancelled(load_first_page(gateway.as_ref(), &profile, &filters))
                        .await;
                    if let Some(result) = loaded {
                        log_failure("First page", &result);
                        events.emit(EngineEvent::FirstPage { context, result });
                    }
                });
            }
            EngineCommand::Scan(request) => {
                let cancel = self.token_for(request.context);
                tokio::spawn(async move {
                    run_scan(gateway.as_ref(), &profile, request, &events, &cancel).await;
                });
            }
            EngineCommand::Page {
                context,
                filters,
                offset,
                limit,
            } => {
                let cancel = self.token_for(context);
                tokio::spawn(async move {
                    let loaded = cancel
                        .run_until_cancelled(load_page(
                            gateway.as_ref(),
                            &profile,
                            &filters,
                            offset,
                            limit,
                        ))
                        .await;
                    if let Some(result) = loaded {
                        log_failure("Load-more page", &result);
                        events.emit(EngineEvent::Page {
                            context,
                            requested: limit,
                            result,
                        });
                    }
                });
            }
            EngineCommand::Search {
                context,
                filters,
                query,
            } => {
                let cancel = self.token_for(context);
                tokio::spawn(async move {
                    let found = cancel
                        .run_until_cancelled(run_search(gateway.as_ref(), &profile, &filters, &query))
                        .await;
                    if let Some(result) = found {
                        log_failure("Search", &result);
                        events.emit(EngineEvent::Search { context, result });
                    }
                });
            }
            EngineCommand::ArmDebounce { revision, delay } => {
                if let Some(previous) = self.debounce.take() {
                    previous.cancel();
                }
                let cancel = CancellationToken::new();
                self.debounce = Some(cancel.clone());
                tokio::spawn(async move {
                    let elapsed = cancel.run_until_cancelled(tokio::time::sleep(delay)).await;
                    if elapsed.is_some() {
                        events.emit(EngineEvent::DebounceElapsed { revision });
                    }
                });
            }
            EngineCommand::Cancel { context } => {
                if let Some(token) = self.contexts.remove(&context) {
                    catalog_debug!("Cancelling in-flight work for context {}", context);
                    token.cancel();
                }
            }
            EngineCommand::IncrementViews { id } => {
                let Some(counter) = profile.view_counter.clone() else {
                    return;
                };
                tokio::spawn(async move {
                    let mut args = serde_json::Map::new();
                    args.insert(counter.id_arg.clone(), Value::String(id.to_string()));
                    let result = gateway
                        .call_procedure(&counter.name, Value::Object(args))
                        .await
                        .map(|_| ());
                    log_failure("View counter", &result);
                    events.emit(EngineEvent::ViewsIncremented { id, result });
                });
            }
        }
    }
}

fn log_failure<T>(what: &str, result: &Result<T, GatewayError>) {
    if let Err(err) = result {
        catalog_warn!("{} request failed: {}", what, err);
    }
}
