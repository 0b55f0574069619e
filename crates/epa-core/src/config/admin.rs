//! Admin coordinator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;
use crate::error::ConfigError;
use crate::ipc::DEFAULT_IPC_PORT;
use crate::types::DEFAULT_CONTEXT;

/// Configuration for the admin daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Address of the admin IPC server (localhost only)
    pub ipc_address: String,

    /// Context presented to access control for admin requests
    ///
    /// Commands to clients always use the context each client reported.
    pub default_context: String,

    /// How long to wait for a single client to acknowledge a command
    #[serde(with = "duration_secs")]
    pub dispatch_timeout: Duration,

    /// Capacity of each client's command channel
    pub command_buffer: usize,

    /// Access control for admin requests
    pub access_control: AccessControlConfig,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            ipc_address: format!("127.0.0.1:{}", DEFAULT_IPC_PORT),
            default_context: DEFAULT_CONTEXT.to_string(),
            dispatch_timeout: Duration::from_secs(5),
            command_buffer: 32,
            access_control: AccessControlConfig::default(),
        }
    }
}

impl AdminConfig {
    /// Check the configuration for values the daemon cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "dispatch_timeout must be greater than zero".into(),
            ));
        }
        if self.command_buffer == 0 {
            return Err(ConfigError::Invalid(
                "command_buffer must be greater than zero".into(),
            ));
        }
        if self.access_control.enabled
            && self
                .access_control
                .token
                .as_deref()
                .map_or(true, str::is_empty)
        {
            return Err(ConfigError::Invalid(
                "access_control.token is required when access control is enabled".into(),
            ));
        }
        Ok(())
    }
}

/// Static token access control
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessControlConfig {
    /// Whether admin requests must authenticate
    pub enabled: bool,
    /// Pre-shared token
    pub token: Option<String>,
}
