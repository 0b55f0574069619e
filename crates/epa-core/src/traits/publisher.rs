//! Command publisher trait

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::types::{ClientId, SegmentId};

/// Delivers processor commands to connected clients
///
/// Each call addresses a single command and reports whether the client
/// accepted it. Implementations must bound the time spent waiting on an
/// unresponsive client and never retry.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Ask a client to pause the named processor
    async fn pause_processor(
        &self,
        context: &str,
        client_id: &ClientId,
        processor_name: &str,
    ) -> Result<(), DispatchError>;

    /// Ask a client to start the named processor
    async fn start_processor(
        &self,
        context: &str,
        client_id: &ClientId,
        processor_name: &str,
    ) -> Result<(), DispatchError>;

    /// Ask the clients to split a segment of the named processor
    async fn split_segment(
        &self,
        context: &str,
        client_ids: &[ClientId],
        processor_name: &str,
    ) -> Result<(), DispatchError>;

    /// Ask the clients to merge two segments of the named processor
    async fn merge_segment(
        &self,
        context: &str,
        client_ids: &[ClientId],
        processor_name: &str,
    ) -> Result<(), DispatchError>;

    /// Ask a client to release a claimed segment
    async fn release_segment(
        &self,
        context: &str,
        client_id: &ClientId,
        processor_name: &str,
        segment: SegmentId,
    ) -> Result<(), DispatchError>;
}
