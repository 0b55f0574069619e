//! Global admin daemon state

use std::sync::Arc;

use epa_core::access::StaticTokenAccessController;
use epa_core::config::AdminConfig;
use epa_core::traits::AccessController;

use crate::connection::{ChannelPublisher, ConnectedClients};
use crate::coordinator::EventProcessorAdminService;

/// Admin service wired to the live client registry
pub type AdminService = EventProcessorAdminService<ConnectedClients, ChannelPublisher>;

/// Global state for the admin daemon
pub struct AdminState {
    /// Configuration
    pub config: AdminConfig,
    /// Connected clients
    pub clients: Arc<ConnectedClients>,
    /// Admin coordinator
    pub admin: Arc<AdminService>,
    /// Access control, if enabled
    pub access: Option<Arc<dyn AccessController>>,
}

impl AdminState {
    /// Create state from configuration
    ///
    /// Access control uses the configured static token when enabled.
    pub fn new(config: AdminConfig) -> Self {
        let access = config
            .access_control
            .enabled
            .then(|| config.access_control.token.clone().unwrap_or_default())
            .map(|token| Arc::new(StaticTokenAccessController::new(token)) as Arc<dyn AccessController>);
        Self::with_access(config, access)
    }

    /// Create state with a custom access controller
    pub fn with_access(config: AdminConfig, access: Option<Arc<dyn AccessController>>) -> Self {
        let clients = Arc::new(ConnectedClients::new(config.command_buffer));
        let publisher = Arc::new(ChannelPublisher::new(
            Arc::clone(&clients),
            config.dispatch_timeout,
        ));
        let admin = Arc::new(EventProcessorAdminService::new(Arc::clone(&clients), publisher));

        Self {
            config,
            clients,
            admin,
            access,
        }
    }

    /// Whether requests must authenticate
    pub fn requires_authentication(&self) -> bool {
        self.access.is_some()
    }
}
