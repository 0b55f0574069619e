//! Event processor admin coordinator
//!
//! The `EventProcessorAdminService` turns operator requests into commands
//! for the clients running a logical event processor. It never locks the
//! registry: every call works on a snapshot taken when it starts, and a
//! client that goes away mid-call simply fails its own dispatch.
//!
//! # Dispatch Model
//!
//! Pause, start and move send one command per selected client. All
//! commands are spawned at once and the call resolves when every client
//! has acknowledged, or with the first failure. Commands still in flight
//! after a failure are left to finish; nothing is rolled back.
//!
//! Split and merge send a single command naming the first two matching
//! clients. With fewer than two matches there is nothing to rebalance and
//! the call succeeds without sending anything.

use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, FuturesUnordered, Stream, StreamExt};

use epa_core::ipc::{EventProcessorInstance, EventProcessorSummary};
use epa_core::traits::{ClientProcessor, ClientRegistry, CommandPublisher};
use epa_core::types::CommandKind;
use epa_core::{AdminError, ClientId, DispatchError, EventProcessorIdentifier, Principal, SegmentId};

use crate::grouping::{group_by_identifier, matching, EventProcessorGroup};

/// Coordinates admin operations across the clients running a processor
pub struct EventProcessorAdminService<R: ?Sized, P: ?Sized> {
    registry: Arc<R>,
    publisher: Arc<P>,
}

impl<R, P> EventProcessorAdminService<R, P>
where
    R: ClientRegistry + ?Sized,
    P: CommandPublisher + ?Sized + 'static,
{
    /// Create a service reading `registry` and sending through `publisher`
    pub fn new(registry: Arc<R>, publisher: Arc<P>) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// Pause every instance of the processor
    pub async fn pause(
        &self,
        identifier: &EventProcessorIdentifier,
        principal: &Principal,
    ) -> Result<(), AdminError> {
        audit(principal, CommandKind::Pause, identifier);
        let targets = self.matching(identifier);

        self.dispatch_each(
            identifier,
            CommandKind::Pause,
            targets,
            |publisher, context, client_id, name| async move {
                publisher.pause_processor(&context, &client_id, &name).await
            },
        )
        .await
    }

    /// Start every instance of the processor
    pub async fn start(
        &self,
        identifier: &EventProcessorIdentifier,
        principal: &Principal,
    ) -> Result<(), AdminError> {
        audit(principal, CommandKind::Start, identifier);
        let targets = self.matching(identifier);

        self.dispatch_each(
            identifier,
            CommandKind::Start,
            targets,
            |publisher, context, client_id, name| async move {
                publisher.start_processor(&context, &client_id, &name).await
            },
        )
        .await
    }

    /// Split a segment between the first two instances of the processor
    pub async fn split(
        &self,
        identifier: &EventProcessorIdentifier,
        principal: &Principal,
    ) -> Result<(), AdminError> {
        audit(principal, CommandKind::Split, identifier);
        let Some((context, clients)) = self.first_pair(identifier) else {
            tracing::debug!(processor = %identifier, "Fewer than two instances, nothing to split");
            return Ok(());
        };

        self.publisher
            .split_segment(&context, &clients, identifier.processor_name())
            .await
            .map_err(|source| dispatch_error(identifier, CommandKind::Split, &clients[0], source))
    }

    /// Merge two segments held by the first two instances of the processor
    pub async fn merge(
        &self,
        identifier: &EventProcessorIdentifier,
        principal: &Principal,
    ) -> Result<(), AdminError> {
        audit(principal, CommandKind::Merge, identifier);
        let Some((context, clients)) = self.first_pair(identifier) else {
            tracing::debug!(processor = %identifier, "Fewer than two instances, nothing to merge");
            return Ok(());
        };

        self.publisher
            .merge_segment(&context, &clients, identifier.processor_name())
            .await
            .map_err(|source| dispatch_error(identifier, CommandKind::Merge, &clients[0], source))
    }

    /// Move a segment to `target_client`
    ///
    /// Every other instance releases the segment; the target claims it
    /// through the normal claim protocol and receives no command. If the
    /// target is not among the instances, every instance releases.
    pub async fn move_segment(
        &self,
        identifier: &EventProcessorIdentifier,
        segment: SegmentId,
        target_client: &ClientId,
        principal: &Principal,
    ) -> Result<(), AdminError> {
        audit(principal, CommandKind::Release, identifier);
        let matched = self.matching(identifier);
        if !matched.is_empty() && matched.iter().all(|p| p.client_id() != target_client) {
            tracing::info!(
                processor = %identifier,
                segment,
                target = %target_client,
                "Move target is not running the processor, releasing from all instances"
            );
        }

        let targets = matched
            .into_iter()
            .filter(|processor| processor.client_id() != target_client)
            .collect();

        self.dispatch_each(
            identifier,
            CommandKind::Release,
            targets,
            move |publisher, context, client_id, name| async move {
                publisher
                    .release_segment(&context, &client_id, &name, segment)
                    .await
            },
        )
        .await
    }

    /// Logical processors visible to `component`
    ///
    /// A processor is included when any of its instances belongs to the
    /// component, and then lists all of its instances.
    pub fn event_processors_by_component(
        &self,
        component: &str,
        principal: &Principal,
    ) -> impl Stream<Item = EventProcessorSummary> + Send + 'static {
        tracing::debug!(target: "audit", principal = principal.name(), component, "List event processors");
        let component = component.to_string();
        let groups = group_by_identifier(&self.registry.list_all());

        stream::iter(groups)
            .filter(move |group| futures::future::ready(group.belongs_to_component(&component)))
            .map(summarize)
    }

    /// Every logical processor reported by connected clients
    pub fn event_processors(
        &self,
        principal: &Principal,
    ) -> impl Stream<Item = EventProcessorSummary> + Send + 'static {
        tracing::debug!(target: "audit", principal = principal.name(), "List all event processors");
        stream::iter(group_by_identifier(&self.registry.list_all())).map(summarize)
    }

    fn matching(&self, identifier: &EventProcessorIdentifier) -> Vec<Arc<dyn ClientProcessor>> {
        matching(&self.registry.list_all(), identifier)
    }

    /// Context and ids of the first two matching instances
    fn first_pair(&self, identifier: &EventProcessorIdentifier) -> Option<(String, [ClientId; 2])> {
        match self.matching(identifier).as_slice() {
            [first, second, ..] => Some((
                first.context().to_string(),
                [first.client_id().clone(), second.client_id().clone()],
            )),
            _ => None,
        }
    }

    /// Send one command per target and wait for all acknowledgments
    async fn dispatch_each<F, Fut>(
        &self,
        identifier: &EventProcessorIdentifier,
        command: CommandKind,
        targets: Vec<Arc<dyn ClientProcessor>>,
        send: F,
    ) -> Result<(), AdminError>
    where
        F: Fn(Arc<P>, String, ClientId, String) -> Fut,
        Fut: Future<Output = Result<(), DispatchError>> + Send + 'static,
    {
        if targets.is_empty() {
            tracing::debug!(processor = %identifier, %command, "No matching instances");
            return Ok(());
        }

        tracing::debug!(processor = %identifier, %command, clients = targets.len(), "Dispatching");

        // Dropping a JoinHandle detaches the task, so returning early on a
        // failure leaves the remaining sends running.
        let mut pending: FuturesUnordered<_> = targets
            .iter()
            .map(|target| {
                let client_id = target.client_id().clone();
                let handle = tokio::spawn(send(
                    Arc::clone(&self.publisher),
                    target.context().to_string(),
                    client_id.clone(),
                    identifier.processor_name().to_string(),
                ));
                async move { (client_id, handle.await) }
            })
            .collect();

        while let Some((client_id, joined)) = pending.next().await {
            let outcome = joined.unwrap_or_else(|e| Err(DispatchError::Aborted(e.to_string())));
            if let Err(source) = outcome {
                return Err(dispatch_error(identifier, command, &client_id, source));
            }
            tracing::trace!(processor = %identifier, %command, client = %client_id, "Acknowledged");
        }

        Ok(())
    }
}

fn audit(principal: &Principal, command: CommandKind, identifier: &EventProcessorIdentifier) {
    tracing::info!(
        target: "audit",
        principal = principal.name(),
        %command,
        processor = %identifier,
        "Admin request"
    );
}

fn dispatch_error(
    identifier: &EventProcessorIdentifier,
    command: CommandKind,
    client_id: &ClientId,
    source: DispatchError,
) -> AdminError {
    tracing::warn!(processor = %identifier, %command, client = %client_id, error = %source, "Dispatch failed");
    AdminError::Dispatch {
        client_id: client_id.clone(),
        processor: identifier.clone(),
        command,
        source,
    }
}

fn summarize(group: EventProcessorGroup) -> EventProcessorSummary {
    let (mode, is_streaming) = group
        .members
        .first()
        .map(|p| (p.info().mode.clone(), p.info().is_streaming_processor))
        .unwrap_or_default();

    EventProcessorSummary {
        identifier: group.identifier,
        mode,
        is_streaming,
        instances: group
            .members
            .iter()
            .map(|processor| {
                let info = processor.info();
                EventProcessorInstance {
                    client_id: processor.client_id().clone(),
                    running: info.running,
                    error: info.error,
                    active_threads: info.active_threads,
                    available_threads: info.available_threads,
                    segments: info.segments.clone(),
                }
            })
            .collect(),
    }
}
