use std::sync::mpsc;

use crate::EngineEvent;

/// Where engine tasks report results.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

impl EventSink for mpsc::Sender<EngineEvent> {
    fn emit(&self, event: EngineEvent) {
        // The receiver is gone once the loader is dropped; nothing left to tell.
        let _ = self.send(event);
    }
}
