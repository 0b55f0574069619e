//! IPC protocol for operator tools talking to the admin daemon
//!
//! Uses JSON-encoded messages, one per line, over TCP on localhost
//! (127.0.0.1).

use serde::{Deserialize, Serialize};

use crate::types::{ClientId, EventProcessorIdentifier, SegmentId, SegmentStatus};

/// Default IPC port for the admin daemon
pub const DEFAULT_IPC_PORT: u16 = 8124;

/// IPC request from an operator tool to the admin daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Present the access token for this connection
    Authenticate { token: String },

    /// List logical processors, optionally only those of one component
    ListProcessors { component: Option<String> },

    /// Pause every instance of a processor
    Pause {
        processor_name: String,
        token_store_identifier: String,
    },

    /// Start every instance of a processor
    Start {
        processor_name: String,
        token_store_identifier: String,
    },

    /// Split a segment of a processor
    Split {
        processor_name: String,
        token_store_identifier: String,
    },

    /// Merge two segments of a processor
    Merge {
        processor_name: String,
        token_store_identifier: String,
    },

    /// Move a segment to the given client
    MoveSegment {
        processor_name: String,
        token_store_identifier: String,
        segment: SegmentId,
        target_client: String,
    },

    /// Ping (for keepalive)
    Ping,
}

impl IpcRequest {
    /// Method name checked by access control
    pub fn method(&self) -> &'static str {
        match self {
            IpcRequest::Authenticate { .. } => "authenticate",
            IpcRequest::ListProcessors { .. } => "list_processors",
            IpcRequest::Pause { .. } => "pause",
            IpcRequest::Start { .. } => "start",
            IpcRequest::Split { .. } => "split",
            IpcRequest::Merge { .. } => "merge",
            IpcRequest::MoveSegment { .. } => "move_segment",
            IpcRequest::Ping => "ping",
        }
    }

    /// Whether the request may be sent before authenticating
    pub fn is_public(&self) -> bool {
        matches!(self, IpcRequest::Authenticate { .. } | IpcRequest::Ping)
    }

    /// Processor targeted by the request, if any
    pub fn identifier(&self) -> Option<EventProcessorIdentifier> {
        match self {
            IpcRequest::Pause {
                processor_name,
                token_store_identifier,
            }
            | IpcRequest::Start {
                processor_name,
                token_store_identifier,
            }
            | IpcRequest::Split {
                processor_name,
                token_store_identifier,
            }
            | IpcRequest::Merge {
                processor_name,
                token_store_identifier,
            }
            | IpcRequest::MoveSegment {
                processor_name,
                token_store_identifier,
                ..
            } => Some(EventProcessorIdentifier::new(
                processor_name.as_str(),
                token_store_identifier.as_str(),
            )),
            _ => None,
        }
    }
}

/// IPC response from the admin daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpcResponse {
    /// Logical processors
    Processors {
        processors: Vec<EventProcessorSummary>,
    },

    /// Generic success
    Ok,

    /// Error response
    Error { message: String },

    /// Pong response
    Pong,
}

/// One logical event processor and all of its running instances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProcessorSummary {
    /// Logical identity
    pub identifier: EventProcessorIdentifier,
    /// Processing mode reported by the first instance
    pub mode: String,
    /// Whether the processor streams events
    pub is_streaming: bool,
    /// Every instance of the processor, in registry order
    pub instances: Vec<EventProcessorInstance>,
}

/// A single client's instance of a processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProcessorInstance {
    /// Client running the instance
    pub client_id: ClientId,
    /// Whether the instance is running
    pub running: bool,
    /// Whether the instance reported an error
    pub error: bool,
    /// Threads processing segments
    pub active_threads: u32,
    /// Threads free to claim segments
    pub available_threads: u32,
    /// Segments claimed by the instance
    pub segments: Vec<SegmentStatus>,
}
