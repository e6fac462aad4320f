//! Partitioning of access rules by their relation to an associated set
//!
//! For each enabled rule whose action resolves to the accept action:
//!
//! - a source identifier in the associated set (or the wildcard "any" object)
//!   makes the rule **outbound** from the target;
//! - otherwise a matching destination identifier makes it **inbound** to the
//!   target.
//!
//! Source is checked before destination and a rule lands in at most one
//! bucket. A negated side never matches. Rule order is preserved.

use crate::core::catalog::Catalog;
use crate::core::error::Result;
use crate::core::reachability::AssociatedSet;
use crate::core::rules::AclRule;
use tracing::trace;

/// Object names and type tags that carry matching semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Name of the rulebase action object meaning "accept"
    pub accept_action_name: String,
    /// Type tag of the wildcard object matching every address
    pub any_object_type: String,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            accept_action_name: "Accept".to_string(),
            any_object_type: "CpmiAnyObject".to_string(),
        }
    }
}

/// Which bucket a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Direction {
    /// Traffic originating in the associated set
    #[strum(serialize = "outbound")]
    Outbound,
    /// Traffic destined to the associated set
    #[strum(serialize = "inbound")]
    Inbound,
}

/// Rules split by direction, each bucket in original rule order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Classification<'r> {
    pub inbound: Vec<&'r AclRule>,
    pub outbound: Vec<&'r AclRule>,
}

pub struct RuleClassifier<'a> {
    catalog: &'a Catalog,
    associated: &'a AssociatedSet,
    policy: &'a MatchPolicy,
}

impl<'a> RuleClassifier<'a> {
    pub fn new(catalog: &'a Catalog, associated: &'a AssociatedSet, policy: &'a MatchPolicy) -> Self {
        Self {
            catalog,
            associated,
            policy,
        }
    }

    /// Classifies every rule, keeping input order within each bucket.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownObject`] when an evaluated rule references
    /// an action, source or destination identifier missing from the catalog.
    pub fn classify<'r>(&self, rules: &'r [AclRule]) -> Result<Classification<'r>> {
        let mut classification = Classification::default();

        for rule in rules {
            match self.direction(rule)? {
                Some(Direction::Outbound) => classification.outbound.push(rule),
                Some(Direction::Inbound) => classification.inbound.push(rule),
                None => {}
            }
        }

        Ok(classification)
    }

    /// Decides the bucket of a single rule, `None` when it is irrelevant.
    ///
    /// # Errors
    ///
    /// See [`RuleClassifier::classify`].
    pub fn direction(&self, rule: &AclRule) -> Result<Option<Direction>> {
        if !rule.enabled {
            trace!("{} is disabled", rule.label());
            return Ok(None);
        }

        if !self.is_accept(rule)? {
            trace!("{} does not accept traffic", rule.label());
            return Ok(None);
        }

        if self.side_matches(rule, &rule.source, rule.source_negate)? {
            return Ok(Some(Direction::Outbound));
        }
        if self.side_matches(rule, &rule.destination, rule.destination_negate)? {
            return Ok(Some(Direction::Inbound));
        }

        Ok(None)
    }

    fn is_accept(&self, rule: &AclRule) -> Result<bool> {
        let action = self
            .catalog
            .require(&rule.action, || format!("action of {}", rule.label()))?;
        Ok(self.catalog.entity(action).name == self.policy.accept_action_name)
    }

    fn side_matches(&self, rule: &AclRule, uids: &[String], negated: bool) -> Result<bool> {
        // A negated side means "everything except"; it never counts as a match.
        if negated {
            return Ok(false);
        }

        for uid in uids {
            if self.is_associated(rule, uid)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_associated(&self, rule: &AclRule, uid: &str) -> Result<bool> {
        let id = self.catalog.require(uid, || rule.label())?;
        Ok(self.associated.contains(id)
            || self.catalog.entity(id).type_tag == self.policy.any_object_type)
    }
}
