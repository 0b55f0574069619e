//! Commands delivered to connected clients

use tokio::sync::oneshot;

use epa_core::types::CommandKind;
use epa_core::{ClientId, SegmentId};

/// What a client is asked to do with one of its processors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Pause processing
    Pause,
    /// Start processing
    Start,
    /// Split a segment; the listed clients take part in the split
    Split { clients: Vec<ClientId> },
    /// Merge two segments held by the listed clients
    Merge { clients: Vec<ClientId> },
    /// Release a claimed segment
    Release { segment: SegmentId },
}

impl Instruction {
    /// Kind of command, for logging and errors
    pub fn kind(&self) -> CommandKind {
        match self {
            Instruction::Pause => CommandKind::Pause,
            Instruction::Start => CommandKind::Start,
            Instruction::Split { .. } => CommandKind::Split,
            Instruction::Merge { .. } => CommandKind::Merge,
            Instruction::Release { .. } => CommandKind::Release,
        }
    }
}

/// A command queued for a client, with the channel for its acknowledgment
#[derive(Debug)]
pub struct ClientCommand {
    /// Context the command applies to
    pub context: String,
    /// Processor the command applies to
    pub processor_name: String,
    /// What to do
    pub instruction: Instruction,
    /// Acknowledgment back to the publisher; `Err` carries the rejection reason
    pub ack: oneshot::Sender<Result<(), String>>,
}

impl ClientCommand {
    /// Accept the command
    pub fn accept(self) {
        // The publisher may have given up waiting
        let _ = self.ack.send(Ok(()));
    }

    /// Reject the command with a reason
    pub fn reject(self, reason: impl Into<String>) {
        let _ = self.ack.send(Err(reason.into()));
    }
}
