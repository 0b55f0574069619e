//! Command publisher backed by the clients' command channels

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use epa_core::traits::CommandPublisher;
use epa_core::{ClientId, DispatchError, SegmentId};

use super::command::{ClientCommand, Instruction};
use super::registry::ConnectedClients;

/// Publishes commands by queueing them on the addressed client's channel
/// and waiting for its acknowledgment
///
/// Queueing and acknowledgment together are bounded by the dispatch
/// timeout, so an unresponsive client fails its own dispatch instead of
/// holding up the admin call.
pub struct ChannelPublisher {
    clients: Arc<ConnectedClients>,
    timeout: Duration,
}

impl ChannelPublisher {
    /// Create a publisher delivering to `clients`
    pub fn new(clients: Arc<ConnectedClients>, timeout: Duration) -> Self {
        Self { clients, timeout }
    }

    async fn deliver(
        &self,
        client_id: &ClientId,
        context: &str,
        processor_name: &str,
        instruction: Instruction,
    ) -> Result<(), DispatchError> {
        let session = self
            .clients
            .get(client_id)
            .ok_or_else(|| DispatchError::ClientNotConnected(client_id.clone()))?;
        let commands = session.commands();
        drop(session);

        let kind = instruction.kind();
        let (ack_tx, ack_rx) = oneshot::channel();
        let command = ClientCommand {
            context: context.to_string(),
            processor_name: processor_name.to_string(),
            instruction,
            ack: ack_tx,
        };

        let exchange = async {
            commands
                .send(command)
                .await
                .map_err(|_| DispatchError::ChannelClosed(client_id.clone()))?;

            match ack_rx.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(reason)) => Err(DispatchError::Rejected {
                    client_id: client_id.clone(),
                    reason,
                }),
                Err(_) => Err(DispatchError::ChannelClosed(client_id.clone())),
            }
        };

        let result = tokio::time::timeout(self.timeout, exchange)
            .await
            .unwrap_or_else(|_| {
                Err(DispatchError::Timeout {
                    client_id: client_id.clone(),
                    after: self.timeout,
                })
            });

        tracing::debug!(
            client = %client_id,
            processor = processor_name,
            command = %kind,
            ok = result.is_ok(),
            "Command delivered"
        );
        result
    }
}

#[async_trait]
impl CommandPublisher for ChannelPublisher {
    async fn pause_processor(
        &self,
        context: &str,
        client_id: &ClientId,
        processor_name: &str,
    ) -> Result<(), DispatchError> {
        self.deliver(client_id, context, processor_name, Instruction::Pause)
            .await
    }

    async fn start_processor(
        &self,
        context: &str,
        client_id: &ClientId,
        processor_name: &str,
    ) -> Result<(), DispatchError> {
        self.deliver(client_id, context, processor_name, Instruction::Start)
            .await
    }

    /// Delivered to the first listed client, which coordinates the split
    async fn split_segment(
        &self,
        context: &str,
        client_ids: &[ClientId],
        processor_name: &str,
    ) -> Result<(), DispatchError> {
        let representative = representative(client_ids)?;
        let instruction = Instruction::Split {
            clients: client_ids.to_vec(),
        };
        self.deliver(representative, context, processor_name, instruction)
            .await
    }

    /// Delivered to the first listed client, which coordinates the merge
    async fn merge_segment(
        &self,
        context: &str,
        client_ids: &[ClientId],
        processor_name: &str,
    ) -> Result<(), DispatchError> {
        let representative = representative(client_ids)?;
        let instruction = Instruction::Merge {
            clients: client_ids.to_vec(),
        };
        self.deliver(representative, context, processor_name, instruction)
            .await
    }

    async fn release_segment(
        &self,
        context: &str,
        client_id: &ClientId,
        processor_name: &str,
        segment: SegmentId,
    ) -> Result<(), DispatchError> {
        self.deliver(client_id, context, processor_name, Instruction::Release { segment })
            .await
    }
}

fn representative(client_ids: &[ClientId]) -> Result<&ClientId, DispatchError> {
    client_ids
        .first()
        .ok_or_else(|| DispatchError::Aborted("no clients to address".to_string()))
}
