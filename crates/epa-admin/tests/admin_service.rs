//! Admin coordinator tests against a recording publisher

mod common;

use std::sync::Arc;

use futures::StreamExt;

use common::{FakeClientProcessor, Published, RecordingPublisher, StaticRegistry};
use epa_admin::EventProcessorAdminService;
use epa_core::traits::ClientProcessor;
use epa_core::types::CommandKind;
use epa_core::{AdminError, ClientId, EventProcessorIdentifier, EventProcessorInfo, Principal};

const PROCESSOR: &str = "processorName";
const TOKEN_STORE: &str = "tokenStore";

type Service = EventProcessorAdminService<StaticRegistry, RecordingPublisher>;

fn service(processors: Vec<Arc<dyn ClientProcessor>>, publisher: &Arc<RecordingPublisher>) -> Service {
    EventProcessorAdminService::new(Arc::new(StaticRegistry(processors)), Arc::clone(publisher))
}

fn identifier() -> EventProcessorIdentifier {
    EventProcessorIdentifier::new(PROCESSOR, TOKEN_STORE)
}

fn principal() -> Principal {
    Principal::new("authenticated-user")
}

/// Clients A and B run the processor; C runs another processor on the same
/// store and D runs the same processor on another store
fn four_clients() -> Vec<Arc<dyn ClientProcessor>> {
    vec![
        FakeClientProcessor::new("Client-A", PROCESSOR, TOKEN_STORE),
        FakeClientProcessor::new("Client-B", PROCESSOR, TOKEN_STORE),
        FakeClientProcessor::new("Client-C", "anotherProcessor", TOKEN_STORE),
        FakeClientProcessor::new("Client-D", PROCESSOR, "anotherTokenStore"),
    ]
}

#[tokio::test]
async fn test_pause_targets_only_matching_clients() {
    let publisher = RecordingPublisher::new();
    let admin = service(four_clients(), &publisher);

    admin.pause(&identifier(), &principal()).await.unwrap();

    assert_eq!(
        publisher.published(),
        vec![
            Published::pause("Client-A", PROCESSOR),
            Published::pause("Client-B", PROCESSOR),
        ]
    );
}

#[tokio::test]
async fn test_start_targets_only_matching_clients() {
    let publisher = RecordingPublisher::new();
    let admin = service(four_clients(), &publisher);

    admin.start(&identifier(), &principal()).await.unwrap();

    assert_eq!(
        publisher.published(),
        vec![
            Published::start("Client-A", PROCESSOR),
            Published::start("Client-B", PROCESSOR),
        ]
    );
}

#[tokio::test]
async fn test_split_uses_first_two_matches() {
    let publisher = RecordingPublisher::new();
    let admin = service(four_clients(), &publisher);

    admin.split(&identifier(), &principal()).await.unwrap();

    assert_eq!(
        publisher.published(),
        vec![Published::split(["Client-A", "Client-B"], PROCESSOR)]
    );
}

#[tokio::test]
async fn test_merge_uses_first_two_matches() {
    let publisher = RecordingPublisher::new();
    let admin = service(four_clients(), &publisher);

    admin.merge(&identifier(), &principal()).await.unwrap();

    assert_eq!(
        publisher.published(),
        vec![Published::merge(["Client-A", "Client-B"], PROCESSOR)]
    );
}

#[tokio::test]
async fn test_split_and_merge_ignore_matches_beyond_the_second() {
    let publisher = RecordingPublisher::new();
    let admin = service(
        vec![
            FakeClientProcessor::new("Client-1", PROCESSOR, TOKEN_STORE),
            FakeClientProcessor::new("Client-X", "other", TOKEN_STORE),
            FakeClientProcessor::new("Client-2", PROCESSOR, TOKEN_STORE),
            FakeClientProcessor::new("Client-3", PROCESSOR, TOKEN_STORE),
            FakeClientProcessor::new("Client-4", PROCESSOR, TOKEN_STORE),
        ],
        &publisher,
    );

    admin.split(&identifier(), &principal()).await.unwrap();
    admin.merge(&identifier(), &principal()).await.unwrap();

    assert_eq!(
        publisher.published(),
        vec![
            Published::split(["Client-1", "Client-2"], PROCESSOR),
            Published::merge(["Client-1", "Client-2"], PROCESSOR),
        ]
    );
}

#[tokio::test]
async fn test_split_and_merge_need_two_instances() {
    let publisher = RecordingPublisher::new();
    let admin = service(
        vec![
            FakeClientProcessor::new("Client-A", PROCESSOR, TOKEN_STORE),
            FakeClientProcessor::new("Client-B", PROCESSOR, "anotherTokenStore"),
        ],
        &publisher,
    );

    admin.split(&identifier(), &principal()).await.unwrap();
    admin.merge(&identifier(), &principal()).await.unwrap();

    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn test_move_releases_from_everyone_but_the_target() {
    let publisher = RecordingPublisher::new();
    let admin = service(
        vec![
            FakeClientProcessor::new("Client-A", PROCESSOR, TOKEN_STORE),
            FakeClientProcessor::new("Client-B", PROCESSOR, TOKEN_STORE),
            FakeClientProcessor::new("Client-C", "anotherProcessor", TOKEN_STORE),
            FakeClientProcessor::new("Client-D", PROCESSOR, "anotherTokenStore"),
            FakeClientProcessor::new("Client-E", PROCESSOR, TOKEN_STORE),
        ],
        &publisher,
    );

    admin
        .move_segment(&identifier(), 2, &ClientId::new("Client-B"), &principal())
        .await
        .unwrap();

    assert_eq!(
        publisher.published(),
        vec![
            Published::release("Client-A", PROCESSOR, 2),
            Published::release("Client-E", PROCESSOR, 2),
        ]
    );
}

#[tokio::test]
async fn test_move_to_absent_target_releases_from_all() {
    let publisher = RecordingPublisher::new();
    let admin = service(four_clients(), &publisher);

    admin
        .move_segment(&identifier(), 7, &ClientId::new("Client-Z"), &principal())
        .await
        .unwrap();

    assert_eq!(
        publisher.published(),
        vec![
            Published::release("Client-A", PROCESSOR, 7),
            Published::release("Client-B", PROCESSOR, 7),
        ]
    );
}

#[tokio::test]
async fn test_move_with_only_the_target_is_a_no_op() {
    let publisher = RecordingPublisher::new();
    let admin = service(
        vec![FakeClientProcessor::new("Client-A", PROCESSOR, TOKEN_STORE)],
        &publisher,
    );

    admin
        .move_segment(&identifier(), 0, &ClientId::new("Client-A"), &principal())
        .await
        .unwrap();

    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn test_unknown_processor_is_a_no_op_everywhere() {
    let publisher = RecordingPublisher::new();
    let admin = service(four_clients(), &publisher);
    let unknown = EventProcessorIdentifier::new("missing", TOKEN_STORE);

    admin.pause(&unknown, &principal()).await.unwrap();
    admin.start(&unknown, &principal()).await.unwrap();
    admin.split(&unknown, &principal()).await.unwrap();
    admin.merge(&unknown, &principal()).await.unwrap();
    admin
        .move_segment(&unknown, 1, &ClientId::new("Client-A"), &principal())
        .await
        .unwrap();

    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn test_repeated_pause_succeeds() {
    let publisher = RecordingPublisher::new();
    let admin = service(four_clients(), &publisher);

    admin.pause(&identifier(), &principal()).await.unwrap();
    admin.pause(&identifier(), &principal()).await.unwrap();

    assert_eq!(publisher.published().len(), 4);
}

#[tokio::test]
async fn test_dispatch_failure_identifies_client() {
    let publisher = RecordingPublisher::with_unreachable(&["Client-B"]);
    let admin = service(four_clients(), &publisher);

    let err = admin.pause(&identifier(), &principal()).await.unwrap_err();

    match err {
        AdminError::Dispatch {
            client_id,
            processor,
            command,
            ..
        } => {
            assert_eq!(client_id, ClientId::new("Client-B"));
            assert_eq!(processor, identifier());
            assert_eq!(command, CommandKind::Pause);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Client-A's pause is not undone
    assert!(publisher
        .published()
        .contains(&Published::pause("Client-A", PROCESSOR)));
}

#[tokio::test]
async fn test_release_failure_identifies_client() {
    let publisher = RecordingPublisher::with_unreachable(&["Client-A"]);
    let admin = service(four_clients(), &publisher);

    let err = admin
        .move_segment(&identifier(), 2, &ClientId::new("Client-B"), &principal())
        .await
        .unwrap_err();

    assert_eq!(err.client_id(), Some(&ClientId::new("Client-A")));
}

fn processor_info(name: &str, token_store: &str) -> EventProcessorInfo {
    EventProcessorInfo::new(name, token_store)
}

#[tokio::test]
async fn test_processors_by_component_include_whole_groups() {
    let publisher = RecordingPublisher::new();
    let admin = service(
        vec![
            FakeClientProcessor::with_info("Client-A", true, processor_info("blue", "X")),
            FakeClientProcessor::with_info("Client-B", false, processor_info("blue", "X")),
            FakeClientProcessor::with_info("Client-C", false, processor_info("blue", "Y")),
            FakeClientProcessor::with_info("Client-D", false, processor_info("green", "X")),
            FakeClientProcessor::with_info("Client-E", true, processor_info("green", "Y")),
        ],
        &publisher,
    );

    let clients: Vec<String> = admin
        .event_processors_by_component("component", &principal())
        .flat_map(|summary| futures::stream::iter(summary.instances))
        .map(|instance| instance.client_id.to_string())
        .collect()
        .await;

    assert_eq!(clients, vec!["Client-A", "Client-B", "Client-E"]);
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn test_processors_by_component_group_identity() {
    let publisher = RecordingPublisher::new();
    let admin = service(
        vec![
            FakeClientProcessor::with_info("Client-A", false, processor_info("blue", "X")),
            FakeClientProcessor::with_info("Client-B", true, processor_info("green", "Y")),
            FakeClientProcessor::with_info("Client-C", false, processor_info("blue", "X")),
        ],
        &publisher,
    );

    let summaries: Vec<_> = admin
        .event_processors_by_component("component", &principal())
        .collect()
        .await;

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].identifier, EventProcessorIdentifier::new("green", "Y"));
    assert_eq!(summaries[0].instances.len(), 1);
}

#[tokio::test]
async fn test_all_processors_in_first_seen_order() {
    let publisher = RecordingPublisher::new();
    let admin = service(four_clients(), &publisher);

    let identifiers: Vec<_> = admin
        .event_processors(&principal())
        .map(|summary| summary.identifier.to_string())
        .collect()
        .await;

    assert_eq!(
        identifiers,
        vec![
            "processorName@tokenStore",
            "anotherProcessor@tokenStore",
            "processorName@anotherTokenStore",
        ]
    );
}
