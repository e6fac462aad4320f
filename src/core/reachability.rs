//! Associated-set traversal
//!
//! The associated set of a target is everything the target is "attached to":
//! the networks it sits in and, transitively, every group that lists the
//! target or any of those networks.
//!
//! The walk is a breadth-first search with an asymmetric first hop:
//!
//! 1. The target seeds the queue.
//! 2. Only *directly attached networks* (edge `end` of network kind) join the
//!    queue at the first hop. Direct groups, hosts and services do not.
//! 3. The queue is then drained without restriction, following each incident
//!    edge to its `start` endpoint. Since membership edges start at the group
//!    and containment edges start at the entity holding them, this climbs from
//!    members to the groups that contain them.
//!
//! Output order is discovery order; the visited set guarantees no entity
//! appears twice.

use crate::core::catalog::{Entity, EntityId};
use crate::core::graph::RelationshipGraph;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Ordered associated set of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociatedSet {
    order: Vec<EntityId>,
    members: HashSet<EntityId>,
}

impl AssociatedSet {
    /// Runs the two-phase traversal from `target`.
    pub fn compute(graph: &RelationshipGraph<'_>, target: EntityId) -> Self {
        let catalog = graph.catalog();
        let mut visited: HashSet<EntityId> = HashSet::from([target]);
        let mut queue: VecDeque<EntityId> = VecDeque::from([target]);

        for edge in graph.edges_of(target) {
            if catalog.entity(edge.end).is_network() && visited.insert(edge.end) {
                queue.push_back(edge.end);
            }
        }

        let mut order = Vec::new();
        while let Some(current) = queue.pop_front() {
            order.push(current);
            for edge in graph.edges_of(current) {
                if visited.insert(edge.start) {
                    queue.push_back(edge.start);
                }
            }
        }

        debug!(
            "Associated set of {}: {} entities",
            catalog.entity(target).uid,
            order.len()
        );

        Self {
            order,
            members: visited,
        }
    }

    /// Entities in discovery order, target first.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolves the set against the graph's catalog, preserving order.
    pub fn entities<'a>(
        &'a self,
        graph: &'a RelationshipGraph<'a>,
    ) -> impl Iterator<Item = &'a Entity> + 'a {
        let catalog = graph.catalog();
        self.order.iter().map(move |&id| catalog.entity(id))
    }
}
