//! cpaudit - Firewall policy export auditor
//!
//! Answers one question over a point-in-time policy export: given a named
//! object, which objects is it attached to, and which access rules permit
//! traffic out of or into that set?
//!
//! # Architecture
//!
//! - [`core`] - Object catalog, relationship graph, traversal, rule classification
//! - [`loader`] - Reading export files and hashing them
//! - [`audit`] - The end-to-end pipeline
//! - [`report`] - Report model, text tables and JSON output
//! - [`config`] - Configuration loading
//! - [`validators`] - Sanitization of export text for terminal output
//! - [`utils`] - Utility functions (XDG directories)

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_errors_doc)]

pub mod audit;
pub mod config;
pub mod core;
pub mod loader;
pub mod report;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use core::catalog::{Catalog, Entity, EntityId, EntityKind};
pub use core::classifier::{Classification, MatchPolicy, RuleClassifier};
pub use core::error::{Error, Result};
pub use core::graph::RelationshipGraph;
pub use core::reachability::AssociatedSet;
pub use core::rules::AclRule;
