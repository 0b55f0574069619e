//! Registry of connected clients and the processors they report

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use epa_core::traits::{ClientProcessor, ClientRegistry};
use epa_core::{ClientId, EventProcessorInfo};

use super::command::ClientCommand;

/// Details a client provides when it connects
#[derive(Debug, Clone)]
pub struct ClientRegistration {
    /// Session identifier
    pub client_id: ClientId,
    /// Component (application) the client belongs to
    pub component: String,
    /// Context the client operates in
    pub context: String,
    /// Processors the client runs
    pub processors: Vec<EventProcessorInfo>,
}

/// A connected client session
#[derive(Debug, Clone)]
pub struct ClientSession {
    /// Session identifier
    pub client_id: ClientId,
    /// Component (application) the client belongs to
    pub component: String,
    /// Context the client operates in
    pub context: String,
    /// Processors the client last reported
    pub processors: Vec<EventProcessorInfo>,
    /// Connection order, used to keep snapshots deterministic
    sequence: u64,
    /// Command channel to the client
    commands: mpsc::Sender<ClientCommand>,
}

impl ClientSession {
    /// Sender for the client's command channel
    pub fn commands(&self) -> mpsc::Sender<ClientCommand> {
        self.commands.clone()
    }
}

/// All clients currently connected, indexed by client ID
pub struct ConnectedClients {
    clients: DashMap<ClientId, Arc<ClientSession>>,
    next_sequence: AtomicU64,
    command_buffer: usize,
}

impl ConnectedClients {
    /// Create an empty registry with the given command channel capacity
    pub fn new(command_buffer: usize) -> Self {
        Self {
            clients: DashMap::new(),
            next_sequence: AtomicU64::new(0),
            command_buffer: command_buffer.max(1),
        }
    }

    /// Register a connected client, returning the receiving end of its
    /// command channel
    ///
    /// A client registering again under the same ID replaces its previous
    /// session; the previous command channel closes.
    pub fn register(&self, registration: ClientRegistration) -> mpsc::Receiver<ClientCommand> {
        let (tx, rx) = mpsc::channel(self.command_buffer);
        let session = ClientSession {
            client_id: registration.client_id.clone(),
            component: registration.component,
            context: registration.context,
            processors: distinct_processors(&registration.client_id, registration.processors),
            sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
            commands: tx,
        };

        tracing::info!(
            client = %session.client_id,
            component = %session.component,
            context = %session.context,
            processors = session.processors.len(),
            "Client registered"
        );

        if self
            .clients
            .insert(registration.client_id, Arc::new(session))
            .is_some()
        {
            tracing::debug!("Replaced previous session for re-registered client");
        }
        rx
    }

    /// Replace the processors a client reports
    ///
    /// Returns false if the client is not connected.
    pub fn update_processors(&self, client_id: &ClientId, processors: Vec<EventProcessorInfo>) -> bool {
        match self.clients.get_mut(client_id) {
            Some(mut entry) => {
                let updated = ClientSession {
                    processors: distinct_processors(client_id, processors),
                    ..ClientSession::clone(entry.value())
                };
                *entry = Arc::new(updated);
                true
            }
            None => {
                tracing::debug!(client = %client_id, "Processor update for unknown client");
                false
            }
        }
    }

    /// Remove a disconnected client
    pub fn remove(&self, client_id: &ClientId) -> Option<Arc<ClientSession>> {
        let removed = self.clients.remove(client_id).map(|(_, session)| session);
        if removed.is_some() {
            tracing::info!(client = %client_id, "Client removed");
        }
        removed
    }

    /// Get a session by client ID
    pub fn get(&self, client_id: &ClientId) -> Option<Arc<ClientSession>> {
        self.clients.get(client_id).map(|r| Arc::clone(&r))
    }

    /// Sessions in connection order
    pub fn sessions(&self) -> Vec<Arc<ClientSession>> {
        let mut sessions: Vec<_> = self.clients.iter().map(|r| Arc::clone(&r)).collect();
        sessions.sort_by_key(|session| session.sequence);
        sessions
    }

    /// Number of connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Check if no client is connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Keep the first report of each processor identifier
fn distinct_processors(client_id: &ClientId, processors: Vec<EventProcessorInfo>) -> Vec<EventProcessorInfo> {
    let reported = processors.len();
    let mut seen = HashSet::new();
    let distinct: Vec<_> = processors
        .into_iter()
        .filter(|info| seen.insert(info.identifier()))
        .collect();

    if distinct.len() < reported {
        tracing::warn!(
            client = %client_id,
            duplicates = reported - distinct.len(),
            "Ignoring duplicate processor reports"
        );
    }
    distinct
}

impl ClientRegistry for ConnectedClients {
    fn list_all(&self) -> Vec<Arc<dyn ClientProcessor>> {
        self.sessions()
            .into_iter()
            .flat_map(|session| {
                (0..session.processors.len()).map(move |index| {
                    Arc::new(ReportedProcessor {
                        session: Arc::clone(&session),
                        index,
                    }) as Arc<dyn ClientProcessor>
                })
            })
            .collect()
    }
}

/// One processor of one session, as seen in a snapshot
struct ReportedProcessor {
    session: Arc<ClientSession>,
    index: usize,
}

impl ClientProcessor for ReportedProcessor {
    fn client_id(&self) -> &ClientId {
        &self.session.client_id
    }

    fn context(&self) -> &str {
        &self.session.context
    }

    fn info(&self) -> &EventProcessorInfo {
        &self.session.processors[self.index]
    }

    fn belongs_to_component(&self, component: &str) -> bool {
        self.session.component == component
    }
}
