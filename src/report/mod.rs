//! Audit report model and renderers
//!
//! [`AuditReport::build`] resolves every identifier the report needs against
//! the catalog, so rendering itself cannot fail. Two renderers exist:
//! [`AuditReport::to_text`] (three plain-text tables) and
//! [`AuditReport::to_json`].

pub mod table;

use crate::core::catalog::{Catalog, Entity, EntityKind, Payload};
use crate::core::classifier::Classification;
use crate::core::error::Result;
use crate::core::reachability::AssociatedSet;
use crate::core::rules::AclRule;
use crate::loader::ExportFile;
use crate::validators::sanitize_cell;
use chrono::{DateTime, Utc};
use serde::Serialize;
use table::Table;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TargetInfo {
    pub name: String,
    pub uid: String,
    #[serde(rename = "type")]
    pub type_tag: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InputDigest {
    pub path: String,
    pub sha256: String,
}

impl From<&ExportFile> for InputDigest {
    fn from(export: &ExportFile) -> Self {
        Self {
            path: export.path.display().to_string(),
            sha256: export.sha256.clone(),
        }
    }
}

/// One row of the associated-objects table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AssociatedRow {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub summary: String,
    pub comment: String,
    pub uid: String,
}

impl AssociatedRow {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            name: entity.name.clone(),
            type_tag: entity.type_tag.clone(),
            summary: kind_summary(entity),
            comment: entity.comments.trim().to_string(),
            uid: entity.uid.clone(),
        }
    }
}

/// One row of an inbound/outbound rule table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RuleRow {
    pub number: u32,
    pub name: String,
    /// Source names, `!`-prefixed when the rule negates its source
    pub source: Vec<String>,
    pub destination: Vec<String>,
    /// `name:type[:port]` per service, service groups expanded
    pub service: Vec<String>,
    pub comment: String,
}

impl RuleRow {
    /// Resolves a rule's identifiers into display strings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownObject`] for any source, destination,
    /// service or service-group member missing from the catalog.
    pub fn from_rule(rule: &AclRule, catalog: &Catalog) -> Result<Self> {
        Ok(Self {
            number: rule.number,
            name: rule.name.clone(),
            source: endpoint_names(rule, &rule.source, rule.source_negate, catalog)?,
            destination: endpoint_names(rule, &rule.destination, rule.destination_negate, catalog)?,
            service: service_descriptions(rule, catalog)?,
            comment: rule.comments.trim().to_string(),
        })
    }
}

/// Type-specific summary: address for hosts, range for networks, member
/// count for groups.
pub fn kind_summary(entity: &Entity) -> String {
    match &entity.payload {
        Payload::Host { ipv4 } => ipv4.map(|a| a.to_string()).unwrap_or_default(),
        Payload::Network {
            subnet: Some(subnet),
            mask_length,
        } => format!("{}/{}", subnet, mask_length.unwrap_or_default()),
        Payload::Network { subnet: None, .. } => String::new(),
        Payload::Group { members } => format!("Members {}", members.len()),
        Payload::Service { .. } | Payload::Other => String::new(),
    }
}

/// Renders one service as `name:type`, plus `:port` unless it is ICMP-family
/// or has no port.
pub fn describe_service(service: &Entity) -> String {
    let mut out = format!("{}:{}", service.name, service.type_tag);
    if !service.type_tag.contains("icmp")
        && let Some(port) = service.port()
    {
        out.push(':');
        out.push_str(port);
    }
    out
}

fn endpoint_names(
    rule: &AclRule,
    uids: &[String],
    negated: bool,
    catalog: &Catalog,
) -> Result<Vec<String>> {
    uids.iter()
        .map(|uid| {
            let id = catalog.require(uid, || rule.label())?;
            let name = &catalog.entity(id).name;
            Ok(if negated { format!("!{name}") } else { name.clone() })
        })
        .collect()
}

fn service_descriptions(rule: &AclRule, catalog: &Catalog) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for uid in &rule.service {
        let service = catalog.entity(catalog.require(uid, || format!("services of {}", rule.label()))?);

        if service.kind() == EntityKind::Group {
            for member in service.members() {
                let id = catalog.require(member, || format!("service group {}", service.name))?;
                out.push(describe_service(catalog.entity(id)));
            }
            continue;
        }

        out.push(describe_service(service));
    }
    Ok(out)
}

/// Everything one audit run reports.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub target: TargetInfo,
    pub inputs: Vec<InputDigest>,
    pub associated: Vec<AssociatedRow>,
    pub outbound: Vec<RuleRow>,
    pub inbound: Vec<RuleRow>,
}

impl AuditReport {
    /// Builds the report for `set` (whose first entity is the target).
    ///
    /// # Errors
    ///
    /// See [`RuleRow::from_rule`].
    pub fn build(
        catalog: &Catalog,
        set: &AssociatedSet,
        classification: &Classification<'_>,
        inputs: Vec<InputDigest>,
    ) -> Result<Self> {
        let target = set
            .ids()
            .first()
            .map(|&id| catalog.entity(id))
            .map_or_else(
                || TargetInfo {
                    name: String::new(),
                    uid: String::new(),
                    type_tag: String::new(),
                },
                |e| TargetInfo {
                    name: e.name.clone(),
                    uid: e.uid.clone(),
                    type_tag: e.type_tag.clone(),
                },
            );

        let associated = set
            .ids()
            .iter()
            .map(|&id| AssociatedRow::from_entity(catalog.entity(id)))
            .collect();

        let rows = |rules: &[&AclRule]| -> Result<Vec<RuleRow>> {
            rules.iter().map(|r| RuleRow::from_rule(r, catalog)).collect()
        };

        Ok(Self {
            generated_at: Utc::now(),
            target,
            inputs,
            associated,
            outbound: rows(&classification.outbound)?,
            inbound: rows(&classification.inbound)?,
        })
    }

    /// Renders the associated-objects table followed by the outbound and
    /// inbound rule tables, separated by blank lines.
    pub fn to_text(&self) -> String {
        let target = sanitize_cell(&self.target.name);

        let mut associated = Table::new(
            format!("{target} Belongs To"),
            ["Name", "Type", "Extra", "Comment", "UID"],
        );
        for row in &self.associated {
            associated.add_row([
                sanitize_cell(&row.name),
                sanitize_cell(&row.type_tag),
                sanitize_cell(&row.summary),
                sanitize_cell(&row.comment),
                sanitize_cell(&row.uid),
            ]);
        }

        let outbound = rule_table(format!("{target} -> Target"), &self.outbound);
        let inbound = rule_table(format!("Target -> {target}"), &self.inbound);

        format!("{associated}\n{outbound}\n{inbound}")
    }

    /// Pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn rule_table(title: String, rows: &[RuleRow]) -> Table<4> {
    let joined = |items: &[String]| {
        items
            .iter()
            .map(|s| sanitize_cell(s))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut table = Table::new(title, ["No.", "Src", "Dst", "Service"]);
    for row in rows {
        table.add_row([
            row.number.to_string(),
            joined(&row.source),
            joined(&row.destination),
            joined(&row.service),
        ]);
    }
    table
}
