//! Core policy analysis
//!
//! Built bottom-up:
//!
//! - [`catalog`]: Typed policy objects keyed by identifier and name
//! - [`graph`]: Membership and containment edges between catalog entities
//! - [`reachability`]: Two-phase traversal producing a target's associated set
//! - [`rules`]: Access rule records decoded from the ACL export
//! - [`classifier`]: Inbound/outbound partition of rules against an associated set
//! - [`error`]: Error types shared by every stage

pub mod catalog;
pub mod classifier;
pub mod error;
pub mod graph;
pub mod reachability;
pub mod rules;

#[cfg(test)]
pub mod test_helpers;
