//! Core error types for the admin coordinator

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::types::{ClientId, CommandKind, EventProcessorIdentifier};

/// Errors returned by admin operations
#[derive(Error, Debug)]
pub enum AdminError {
    /// A required command dispatch failed; commands already accepted by
    /// other clients are not rolled back
    #[error("{command} command for {processor} failed on client {client_id}: {source}")]
    Dispatch {
        client_id: ClientId,
        processor: EventProcessorIdentifier,
        command: CommandKind,
        #[source]
        source: DispatchError,
    },

    /// The caller is not allowed to invoke the method
    #[error("Not authorized to call {method}")]
    Unauthorized { method: String },
}

impl AdminError {
    /// Client that caused the failure, if any
    pub fn client_id(&self) -> Option<&ClientId> {
        match self {
            AdminError::Dispatch { client_id, .. } => Some(client_id),
            AdminError::Unauthorized { .. } => None,
        }
    }
}

/// Failure delivering a single command to a single client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The addressed client is not connected
    #[error("Client not connected: {0}")]
    ClientNotConnected(ClientId),

    /// The client did not acknowledge in time
    #[error("Client {client_id} did not acknowledge within {after:?}")]
    Timeout { client_id: ClientId, after: Duration },

    /// The client refused the command
    #[error("Client {client_id} rejected command: {reason}")]
    Rejected { client_id: ClientId, reason: String },

    /// The client's command channel closed mid-flight
    #[error("Command channel closed for client {0}")]
    ChannelClosed(ClientId),

    /// The dispatch task ended before completing
    #[error("Dispatch aborted: {0}")]
    Aborted(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
