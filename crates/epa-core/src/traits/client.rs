//! Client processor traits

use std::sync::Arc;

use crate::types::{ClientId, EventProcessorIdentifier, EventProcessorInfo};

/// A processor instance as reported by one connected client
pub trait ClientProcessor: Send + Sync {
    /// Session identifier of the reporting client
    fn client_id(&self) -> &ClientId;

    /// Context the client operates in
    fn context(&self) -> &str;

    /// Processor state reported by the client
    fn info(&self) -> &EventProcessorInfo;

    /// Logical processor this instance belongs to
    fn identifier(&self) -> EventProcessorIdentifier {
        self.info().identifier()
    }

    /// Whether the client is part of the given component (application)
    fn belongs_to_component(&self, component: &str) -> bool;
}

/// Live view over the processors reported by connected clients
pub trait ClientRegistry: Send + Sync {
    /// Snapshot of every reported processor instance
    ///
    /// Order is stable within one snapshot. Clients may connect or
    /// disconnect right after the snapshot is taken.
    fn list_all(&self) -> Vec<Arc<dyn ClientProcessor>>;
}
