//! Per-channel member table
//!
//! Maps each member actor to the frontend node its session lives on.

use std::collections::HashMap;

use super::types::{ActorId, MemberRecord, NodeId};

/// Actor id to owning node mapping for one channel
#[derive(Debug, Default)]
pub struct MemberTable {
    members: HashMap<ActorId, NodeId>,
}

impl MemberTable {
    /// Create an empty member table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the node for an actor
    ///
    /// Returns the node previously recorded for the actor, if any.
    pub fn put(&mut self, actor_id: ActorId, node_id: NodeId) -> Option<NodeId> {
        self.members.insert(actor_id, node_id)
    }

    /// Remove an actor, returning whether it was present
    pub fn remove(&mut self, actor_id: ActorId) -> bool {
        self.members.remove(&actor_id).is_some()
    }

    /// Get the node recorded for an actor
    pub fn get(&self, actor_id: ActorId) -> Option<&NodeId> {
        self.members.get(&actor_id)
    }

    pub fn contains(&self, actor_id: ActorId) -> bool {
        self.members.contains_key(&actor_id)
    }

    /// Snapshot of all members at the time of the call
    pub fn entries(&self) -> Vec<MemberRecord> {
        self.members
            .iter()
            .map(|(&actor_id, node_id)| MemberRecord {
                actor_id,
                node_id: node_id.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Drop every member
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut table = MemberTable::new();

        assert!(table.put(1, NodeId::from("fe-1")).is_none());
        assert_eq!(table.get(1), Some(&NodeId::from("fe-1")));
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_put_overwrites_and_returns_previous() {
        let mut table = MemberTable::new();
        table.put(1, NodeId::from("fe-1"));

        let previous = table.put(1, NodeId::from("fe-2"));

        assert_eq!(previous, Some(NodeId::from("fe-1")));
        assert_eq!(table.get(1), Some(&NodeId::from("fe-2")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut table = MemberTable::new();
        table.put(1, NodeId::from("fe-1"));

        assert!(table.remove(1));
        assert!(!table.remove(1));
        assert!(table.is_empty());
    }

    #[test]
    fn test_entries_is_a_snapshot() {
        let mut table = MemberTable::new();
        table.put(1, NodeId::from("fe-1"));
        table.put(2, NodeId::from("fe-2"));

        let snapshot = table.entries();
        table.put(3, NodeId::from("fe-3"));
        table.remove(1);

        let mut actors: Vec<ActorId> = snapshot.iter().map(|m| m.actor_id).collect();
        actors.sort_unstable();
        assert_eq!(actors, vec![1, 2]);
    }
}
