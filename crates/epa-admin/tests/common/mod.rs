//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use epa_core::traits::{ClientProcessor, ClientRegistry, CommandPublisher};
use epa_core::types::DEFAULT_CONTEXT;
use epa_core::{ClientId, DispatchError, EventProcessorInfo, SegmentId};

/// Client processor with a fixed identity and component membership
pub struct FakeClientProcessor {
    client_id: ClientId,
    belongs_to_component: bool,
    info: EventProcessorInfo,
}

impl FakeClientProcessor {
    /// A client running `processor_name` on `token_store`, in no component
    pub fn new(client_id: &str, processor_name: &str, token_store: &str) -> Arc<dyn ClientProcessor> {
        Self::with_info(client_id, false, EventProcessorInfo::new(processor_name, token_store))
    }

    /// A client reporting `info`, in every component iff `belongs`
    pub fn with_info(client_id: &str, belongs: bool, info: EventProcessorInfo) -> Arc<dyn ClientProcessor> {
        Arc::new(Self {
            client_id: ClientId::new(client_id),
            belongs_to_component: belongs,
            info,
        })
    }
}

impl ClientProcessor for FakeClientProcessor {
    fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    fn context(&self) -> &str {
        DEFAULT_CONTEXT
    }

    fn info(&self) -> &EventProcessorInfo {
        &self.info
    }

    fn belongs_to_component(&self, _component: &str) -> bool {
        self.belongs_to_component
    }
}

/// Registry returning the same processors on every snapshot
pub struct StaticRegistry(pub Vec<Arc<dyn ClientProcessor>>);

impl ClientRegistry for StaticRegistry {
    fn list_all(&self) -> Vec<Arc<dyn ClientProcessor>> {
        self.0.clone()
    }
}

/// A command seen by the recording publisher
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Published {
    Pause { context: String, client: String, processor: String },
    Start { context: String, client: String, processor: String },
    Split { context: String, clients: Vec<String>, processor: String },
    Merge { context: String, clients: Vec<String>, processor: String },
    Release { context: String, client: String, processor: String, segment: SegmentId },
}

impl Published {
    pub fn pause(client: &str, processor: &str) -> Self {
        Published::Pause {
            context: DEFAULT_CONTEXT.into(),
            client: client.into(),
            processor: processor.into(),
        }
    }

    pub fn start(client: &str, processor: &str) -> Self {
        Published::Start {
            context: DEFAULT_CONTEXT.into(),
            client: client.into(),
            processor: processor.into(),
        }
    }

    pub fn split(clients: [&str; 2], processor: &str) -> Self {
        Published::Split {
            context: DEFAULT_CONTEXT.into(),
            clients: clients.iter().map(|c| c.to_string()).collect(),
            processor: processor.into(),
        }
    }

    pub fn merge(clients: [&str; 2], processor: &str) -> Self {
        Published::Merge {
            context: DEFAULT_CONTEXT.into(),
            clients: clients.iter().map(|c| c.to_string()).collect(),
            processor: processor.into(),
        }
    }

    pub fn release(client: &str, processor: &str, segment: SegmentId) -> Self {
        Published::Release {
            context: DEFAULT_CONTEXT.into(),
            client: client.into(),
            processor: processor.into(),
            segment,
        }
    }
}

/// Publisher recording every command, failing those addressed to chosen clients
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Published>>,
    unreachable: HashSet<String>,
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Publisher for which `clients` are disconnected
    pub fn with_unreachable(clients: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            published: Mutex::new(Vec::new()),
            unreachable: clients.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Recorded commands, sorted since dispatch order is not defined
    pub fn published(&self) -> Vec<Published> {
        let mut published = self.published.lock().unwrap().clone();
        published.sort();
        published
    }

    fn record(&self, client_id: &ClientId, command: Published) -> Result<(), DispatchError> {
        self.published.lock().unwrap().push(command);
        if self.unreachable.contains(client_id.as_str()) {
            return Err(DispatchError::ClientNotConnected(client_id.clone()));
        }
        Ok(())
    }
}

fn names(client_ids: &[ClientId]) -> Vec<String> {
    client_ids.iter().map(|c| c.to_string()).collect()
}

#[async_trait]
impl CommandPublisher for RecordingPublisher {
    async fn pause_processor(
        &self,
        context: &str,
        client_id: &ClientId,
        processor_name: &str,
    ) -> Result<(), DispatchError> {
        self.record(
            client_id,
            Published::Pause {
                context: context.into(),
                client: client_id.to_string(),
                processor: processor_name.into(),
            },
        )
    }

    async fn start_processor(
        &self,
        context: &str,
        client_id: &ClientId,
        processor_name: &str,
    ) -> Result<(), DispatchError> {
        self.record(
            client_id,
            Published::Start {
                context: context.into(),
                client: client_id.to_string(),
                processor: processor_name.into(),
            },
        )
    }

    async fn split_segment(
        &self,
        context: &str,
        client_ids: &[ClientId],
        processor_name: &str,
    ) -> Result<(), DispatchError> {
        self.record(
            &client_ids[0],
            Published::Split {
                context: context.into(),
                clients: names(client_ids),
                processor: processor_name.into(),
            },
        )
    }

    async fn merge_segment(
        &self,
        context: &str,
        client_ids: &[ClientId],
        processor_name: &str,
    ) -> Result<(), DispatchError> {
        self.record(
            &client_ids[0],
            Published::Merge {
                context: context.into(),
                clients: names(client_ids),
                processor: processor_name.into(),
            },
        )
    }

    async fn release_segment(
        &self,
        context: &str,
        client_id: &ClientId,
        processor_name: &str,
        segment: SegmentId,
    ) -> Result<(), DispatchError> {
        self.record(
            client_id,
            Published::Release {
                context: context.into(),
                client: client_id.to_string(),
                processor: processor_name.into(),
                segment,
            },
        )
    }
}
