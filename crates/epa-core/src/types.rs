//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Context used by every command unless a client reports another one
pub const DEFAULT_CONTEXT: &str = "default";

/// Identifier of a segment of the event stream
pub type SegmentId = i32;

/// Identity of a logical event processor
///
/// Two processor instances are the same logical processor iff both the
/// processor name and the token store identifier match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProcessorIdentifier {
    /// Name of the processor
    pub processor_name: String,
    /// Identifier of the token store holding the processor's segment claims
    pub token_store_identifier: String,
}

impl EventProcessorIdentifier {
    /// Create a new identifier
    pub fn new(processor_name: impl Into<String>, token_store_identifier: impl Into<String>) -> Self {
        Self {
            processor_name: processor_name.into(),
            token_store_identifier: token_store_identifier.into(),
        }
    }

    /// Processor name
    pub fn processor_name(&self) -> &str {
        &self.processor_name
    }

    /// Token store identifier
    pub fn token_store_identifier(&self) -> &str {
        &self.token_store_identifier
    }
}

impl fmt::Display for EventProcessorIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.processor_name, self.token_store_identifier)
    }
}

/// Unique identifier of a connected client session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl ClientId {
    /// Create a new client ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Authenticated identity on whose behalf an admin operation runs
///
/// Opaque to the coordinator; only the name is surfaced in audit records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    name: String,
}

impl Principal {
    /// Create a principal with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Principal used when access control is disabled
    pub fn anonymous() -> Self {
        Self::new("<anonymous>")
    }

    /// Name used in audit records
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Kind of command sent to a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Pause the processor
    Pause,
    /// Start the processor
    Start,
    /// Split a segment in two
    Split,
    /// Merge two segments
    Merge,
    /// Release a claimed segment
    Release,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Pause => write!(f, "pause"),
            CommandKind::Start => write!(f, "start"),
            CommandKind::Split => write!(f, "split"),
            CommandKind::Merge => write!(f, "merge"),
            CommandKind::Release => write!(f, "release"),
        }
    }
}

/// Processor state as reported by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventProcessorInfo {
    /// Processor name
    pub processor_name: String,
    /// Token store identifier
    pub token_store_identifier: String,
    /// Processing mode reported by the client (e.g. "Tracking", "Pooled")
    pub mode: String,
    /// Whether the processor streams events (and therefore claims segments)
    pub is_streaming_processor: bool,
    /// Whether the processor is running on the client
    pub running: bool,
    /// Whether the processor is in an error state
    pub error: bool,
    /// Threads currently processing segments
    pub active_threads: u32,
    /// Threads still available to claim segments
    pub available_threads: u32,
    /// Segments claimed by this instance
    pub segments: Vec<SegmentStatus>,
}

impl EventProcessorInfo {
    /// Create info for a running processor with no claimed segments
    pub fn new(processor_name: impl Into<String>, token_store_identifier: impl Into<String>) -> Self {
        Self {
            processor_name: processor_name.into(),
            token_store_identifier: token_store_identifier.into(),
            is_streaming_processor: true,
            running: true,
            ..Default::default()
        }
    }

    /// Logical identity of the reported processor
    pub fn identifier(&self) -> EventProcessorIdentifier {
        EventProcessorIdentifier::new(&self.processor_name, &self.token_store_identifier)
    }
}

/// Status of a single segment claimed by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentStatus {
    /// Segment identifier
    pub segment_id: SegmentId,
    /// Fraction denominator: the segment covers `1 / one_part_of` of the stream
    pub one_part_of: u32,
    /// Whether the segment has caught up with the head of the stream
    pub caught_up: bool,
    /// Whether the segment is replaying
    pub replaying: bool,
    /// Last processed token position, if any
    pub token_position: Option<i64>,
    /// Error description, if the segment failed
    pub error_state: Option<String>,
}
