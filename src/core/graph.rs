//! Relationship graph over catalog entities
//!
//! Edges live in a single arena and are addressed by [`EdgeId`]. Each entity
//! keeps the handles of the edges it participates in, so adjacency walks are
//! O(degree) without any ownership cycles between entities and edges.
//!
//! Two independent passes produce the edges:
//!
//! 1. **Membership**: one edge per (group, member) pair, `start = group`,
//!    `end = member`, recorded on both endpoints.
//! 2. **Containment**: for every (network, host) pair where the host address
//!    falls inside the network range, two edges are installed: `host -> network`
//!    on the host and `network -> host` on the network.

use crate::core::catalog::{Catalog, Entity, EntityId, Payload};
use crate::core::error::{Error, Result};
use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;
use tracing::debug;

/// Handle of an edge inside the [`RelationshipGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(usize);

/// How an edge was formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EdgeKind {
    /// Host address inside a network range; installed in both directions
    #[strum(serialize = "Di")]
    Containment,
    /// Entity listed as a group member; one edge shared by both endpoints
    #[strum(serialize = "Mono")]
    Membership,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub start: EntityId,
    pub end: EntityId,
    pub kind: EdgeKind,
}

/// Adjacency between the entities of one catalog.
#[derive(Debug)]
pub struct RelationshipGraph<'a> {
    catalog: &'a Catalog,
    edges: Vec<Edge>,
    incident: Vec<Vec<EdgeId>>,
}

impl<'a> RelationshipGraph<'a> {
    /// Builds membership and containment edges for every entity in `catalog`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownObject`] if a group lists a member that was not loaded
    /// - [`Error::InvalidSubnet`] if a network's subnet/prefix is not a valid
    ///   IPv4 CIDR range
    pub fn build(catalog: &'a Catalog) -> Result<Self> {
        let mut graph = Self {
            catalog,
            edges: Vec::new(),
            incident: vec![Vec::new(); catalog.len()],
        };

        let mut networks: Vec<(EntityId, Ipv4Network)> = Vec::new();
        let mut hosts: Vec<(EntityId, Ipv4Addr)> = Vec::new();

        for (id, entity) in catalog.iter() {
            match &entity.payload {
                Payload::Group { members } => {
                    for member in members {
                        let member_id =
                            catalog.require(member, || format!("group {}", entity.name))?;
                        graph.add_membership(id, member_id);
                    }
                }
                Payload::Network { .. } => {
                    if let Some(range) = subnet_range(entity)? {
                        networks.push((id, range));
                    } else {
                        debug!("Network {} has no IPv4 subnet, skipping containment", entity.uid);
                    }
                }
                Payload::Host { ipv4: Some(addr) } => hosts.push((id, *addr)),
                _ => {}
            }
        }

        for &(network_id, range) in &networks {
            for &(host_id, addr) in &hosts {
                if range.contains(addr) {
                    graph.add_containment(host_id, network_id);
                }
            }
        }

        debug!(
            "Relationship graph: {} entities, {} edges ({} networks x {} hosts)",
            catalog.len(),
            graph.edges.len(),
            networks.len(),
            hosts.len()
        );
        Ok(graph)
    }

    fn push_edge(&mut self, edge: Edge) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(edge);
        id
    }

    fn add_membership(&mut self, group: EntityId, member: EntityId) {
        let id = self.push_edge(Edge {
            start: group,
            end: member,
            kind: EdgeKind::Membership,
        });
        self.incident[member.index()].push(id);
        if member != group {
            self.incident[group.index()].push(id);
        }
    }

    fn add_containment(&mut self, host: EntityId, network: EntityId) {
        let to = self.push_edge(Edge {
            start: host,
            end: network,
            kind: EdgeKind::Containment,
        });
        let from = self.push_edge(Edge {
            start: network,
            end: host,
            kind: EdgeKind::Containment,
        });
        self.incident[host.index()].push(to);
        self.incident[network.index()].push(from);
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges the entity participates in, in installation order.
    pub fn edges_of(&self, entity: EntityId) -> impl Iterator<Item = &Edge> {
        self.incident[entity.index()]
            .iter()
            .map(|&id| self.edge(id))
    }

    /// Returns `true` if an edge of `kind` runs from `start` to `end`.
    pub fn has_edge(&self, start: EntityId, end: EntityId, kind: EdgeKind) -> bool {
        self.edges_of(start)
            .chain(self.edges_of(end))
            .any(|e| e.start == start && e.end == end && e.kind == kind)
    }
}

/// Parses a network's subnet and prefix into an IPv4 range.
///
/// Returns `Ok(None)` for networks without an IPv4 subnet (IPv6-only objects).
///
/// # Errors
///
/// Returns [`Error::InvalidSubnet`] when the subnet is present but the address
/// or prefix length is invalid, or the prefix length is missing.
pub fn subnet_range(entity: &Entity) -> Result<Option<Ipv4Network>> {
    let Payload::Network {
        subnet: Some(subnet),
        mask_length,
    } = &entity.payload
    else {
        return Ok(None);
    };

    let invalid = |mask: u32, reason: String| Error::InvalidSubnet {
        uid: entity.uid.clone(),
        subnet: subnet.clone(),
        mask,
        reason,
    };

    let mask = mask_length.ok_or_else(|| invalid(0, "missing mask-length4".to_string()))?;
    let addr: Ipv4Addr = subnet
        .trim()
        .parse()
        .map_err(|e: std::net::AddrParseError| invalid(mask, e.to_string()))?;
    let prefix = u8::try_from(mask).map_err(|e| invalid(mask, e.to_string()))?;
    let range = Ipv4Network::new(addr, prefix).map_err(|e| invalid(mask, e.to_string()))?;

    Ok(Some(range))
}
