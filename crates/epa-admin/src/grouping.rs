//! Grouping of reported processor instances by logical processor
//!
//! Pure functions over a registry snapshot. Ordering always follows the
//! snapshot: split and merge select their targets by position, so the same
//! snapshot must always produce the same groups.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use epa_core::traits::ClientProcessor;
use epa_core::{ClientId, EventProcessorIdentifier};

/// Instances of one logical processor at a single point in time
pub struct EventProcessorGroup {
    /// Shared identity of all members
    pub identifier: EventProcessorIdentifier,
    /// Members in snapshot order
    pub members: Vec<Arc<dyn ClientProcessor>>,
}

impl EventProcessorGroup {
    /// Whether the group is visible to `component`
    pub fn belongs_to_component(&self, component: &str) -> bool {
        group_belongs_to_component(&self.members, component)
    }
}

/// Every instance whose identifier equals `identifier`, in snapshot order
///
/// A client appears at most once; later reports of the same processor by
/// the same client are ignored.
pub fn matching(
    snapshot: &[Arc<dyn ClientProcessor>],
    identifier: &EventProcessorIdentifier,
) -> Vec<Arc<dyn ClientProcessor>> {
    let mut seen = HashSet::new();
    snapshot
        .iter()
        .filter(|processor| processor.identifier() == *identifier)
        .filter(|processor| seen.insert(processor.client_id().clone()))
        .cloned()
        .collect()
}

/// Partition a snapshot by identifier, ordered by first appearance
///
/// Each client is a member of a group at most once.
pub fn group_by_identifier(snapshot: &[Arc<dyn ClientProcessor>]) -> Vec<EventProcessorGroup> {
    let mut positions: HashMap<EventProcessorIdentifier, usize> = HashMap::new();
    let mut members: HashSet<(EventProcessorIdentifier, ClientId)> = HashSet::new();
    let mut groups: Vec<EventProcessorGroup> = Vec::new();

    for processor in snapshot {
        let identifier = processor.identifier();
        if !members.insert((identifier.clone(), processor.client_id().clone())) {
            continue;
        }
        match positions.get(&identifier) {
            Some(&index) => groups[index].members.push(Arc::clone(processor)),
            None => {
                positions.insert(identifier.clone(), groups.len());
                groups.push(EventProcessorGroup {
                    identifier,
                    members: vec![Arc::clone(processor)],
                });
            }
        }
    }

    groups
}

/// True iff any member belongs to `component`
///
/// A processor is one logical unit: a single member owned by the component
/// exposes the whole group to it.
pub fn group_belongs_to_component(group: &[Arc<dyn ClientProcessor>], component: &str) -> bool {
    group
        .iter()
        .any(|processor| processor.belongs_to_component(component))
}
