//! Grouping of recipients by owning node

use std::collections::{HashMap, HashSet};

use crate::registry::{ActorId, MemberRecord, NodeId, Recipients};

/// Actors grouped by the node their sessions live on
///
/// Built from a membership snapshot for a single call and consumed by the
/// dispatcher; never stored. Each actor is addressed at most once per call.
#[derive(Debug, Default)]
pub struct BroadcastTarget {
    by_node: HashMap<NodeId, Vec<ActorId>>,
    seen: HashSet<ActorId>,
}

impl BroadcastTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one member to its node's group
    ///
    /// Returns `false` and ignores the record if the actor is already
    /// targeted; the first record seen for an actor wins.
    pub fn push(&mut self, record: MemberRecord) -> bool {
        if !self.seen.insert(record.actor_id) {
            return false;
        }
        self.by_node
            .entry(record.node_id)
            .or_default()
            .push(record.actor_id);
        true
    }

    /// Number of distinct nodes
    pub fn node_count(&self) -> usize {
        self.by_node.len()
    }

    /// Number of actors across all nodes
    pub fn actor_count(&self) -> usize {
        self.by_node.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    /// Actors grouped on a node
    pub fn actors_on(&self, node: &NodeId) -> Option<&[ActorId]> {
        self.by_node.get(node).map(Vec::as_slice)
    }

    /// One dispatch target per node
    pub fn into_targets(self) -> Vec<(NodeId, Recipients)> {
        self.by_node
            .into_iter()
            .map(|(node, actors)| (node, Recipients::Actors(actors)))
            .collect()
    }
}

impl FromIterator<MemberRecord> for BroadcastTarget {
    fn from_iter<I: IntoIterator<Item = MemberRecord>>(iter: I) -> Self {
        let mut target = BroadcastTarget::new();
        for record in iter {
            target.push(record);
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_actors_by_node() {
        let target: BroadcastTarget = [
            MemberRecord::new(1, "fe-1"),
            MemberRecord::new(2, "fe-2"),
            MemberRecord::new(3, "fe-1"),
            MemberRecord::new(4, "fe-3"),
            MemberRecord::new(5, "fe-3"),
        ]
        .into_iter()
        .collect();

        assert_eq!(target.node_count(), 3);
        assert_eq!(target.actor_count(), 5);
        assert_eq!(target.actors_on(&NodeId::from("fe-1")), Some(&[1, 3][..]));
        assert_eq!(target.actors_on(&NodeId::from("fe-2")), Some(&[2][..]));
        assert_eq!(target.actors_on(&NodeId::from("fe-3")), Some(&[4, 5][..]));
    }

    #[test]
    fn test_into_targets_one_per_node() {
        let target: BroadcastTarget = [MemberRecord::new(1, "fe-1"), MemberRecord::new(2, "fe-1")]
            .into_iter()
            .collect();

        let targets = target.into_targets();
        assert_eq!(
            targets,
            vec![(NodeId::from("fe-1"), Recipients::Actors(vec![1, 2]))]
        );
    }

    #[test]
    fn test_repeated_actor_is_targeted_once() {
        let mut target = BroadcastTarget::new();

        assert!(target.push(MemberRecord::new(1, "fe-1")));
        assert!(!target.push(MemberRecord::new(1, "fe-1")));
        assert!(!target.push(MemberRecord::new(1, "fe-2")));

        assert_eq!(target.node_count(), 1);
        assert_eq!(target.actor_count(), 1);
        assert_eq!(target.actors_on(&NodeId::from("fe-1")), Some(&[1][..]));
    }

    #[test]
    fn test_empty_target() {
        let target = BroadcastTarget::new();

        assert!(target.is_empty());
        assert!(target.into_targets().is_empty());
    }
}
