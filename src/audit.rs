//! End-to-end audit pipeline
//!
//! objects file → catalog → graph → target → associated set
//! → ACL file → classified rules → report
//!
//! Any failure aborts the run before a report exists, so callers never see
//! partial results.

use crate::config::AuditConfig;
use crate::core::catalog::{Catalog, EntityId};
use crate::core::classifier::RuleClassifier;
use crate::core::error::{ACL_EXPORT, OBJECT_EXPORT, Result};
use crate::core::graph::RelationshipGraph;
use crate::core::reachability::AssociatedSet;
use crate::core::rules::decode_rules;
use crate::loader::read_export;
use crate::report::{AuditReport, InputDigest};
use std::path::PathBuf;
use tracing::info;

/// How the target object is selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    Name(String),
    Uid(String),
}

impl TargetSelector {
    /// # Errors
    ///
    /// Unknown or ambiguous targets, see [`Catalog::resolve_name`].
    pub fn resolve(&self, catalog: &Catalog) -> Result<EntityId> {
        match self {
            TargetSelector::Name(name) => catalog.resolve_name(name),
            TargetSelector::Uid(uid) => catalog.resolve_uid(uid),
        }
    }
}

/// Inputs of one audit run
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub objects_path: PathBuf,
    pub acls_path: PathBuf,
    pub target: TargetSelector,
}

/// Runs the whole pipeline and returns the finished report.
///
/// # Errors
///
/// Returns the first load, resolution, or domain error encountered.
pub fn run(request: &AuditRequest, config: &AuditConfig) -> Result<AuditReport> {
    let objects = read_export(&request.objects_path, OBJECT_EXPORT)?;
    let objects_digest = InputDigest::from(&objects);
    let catalog = Catalog::load(objects.records)?;
    let graph = RelationshipGraph::build(&catalog)?;

    let target = request.target.resolve(&catalog)?;
    let associated = AssociatedSet::compute(&graph, target);
    info!(
        "Target {} is associated with {} objects",
        catalog.entity(target),
        associated.len()
    );

    let acls = read_export(&request.acls_path, ACL_EXPORT)?;
    let acls_digest = InputDigest::from(&acls);
    let rules = decode_rules(acls.records, &config.access_rule_marker)?;

    let policy = config.match_policy();
    let classification = RuleClassifier::new(&catalog, &associated, &policy).classify(&rules)?;
    info!(
        "Classified {} outbound and {} inbound rules",
        classification.outbound.len(),
        classification.inbound.len()
    );

    AuditReport::build(
        &catalog,
        &associated,
        &classification,
        vec![objects_digest, acls_digest],
    )
}
