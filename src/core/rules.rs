//! Access-control rule records
//!
//! Rules reference objects by identifier only, given either bare or as
//! embedded objects (full-detail exports). Identifiers are resolved against
//! the catalog when rules are classified or rendered, never here.

use crate::core::catalog::{deserialize_uid, deserialize_uid_list};
use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default discriminator marking a record as an access rule.
pub const ACCESS_RULE_MARKER: &str = "access-rule";

/// One access-control entry as it appears in the export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    /// Identifier of the rulebase action object (Accept, Drop, ...)
    #[serde(default, deserialize_with = "deserialize_uid")]
    pub action: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "deserialize_uid_list")]
    pub source: Vec<String>,
    #[serde(rename = "source-negate", default)]
    pub source_negate: bool,
    #[serde(default, deserialize_with = "deserialize_uid_list")]
    pub destination: Vec<String>,
    #[serde(rename = "destination-negate", default)]
    pub destination_negate: bool,
    #[serde(default, deserialize_with = "deserialize_uid_list")]
    pub service: Vec<String>,
    #[serde(rename = "rule-number", default)]
    pub number: u32,
    #[serde(default)]
    pub comments: String,
    #[serde(rename = "type", default)]
    pub type_tag: String,
}

impl AclRule {
    /// Short label for log and error messages.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("rule {}", self.number)
        } else {
            format!("rule {} ({})", self.number, self.name)
        }
    }
}

/// Decodes the access rules out of raw ACL records.
///
/// Records whose `type` contains `marker` are decoded as rules. Records with
/// a nested `rulebase` array (access sections, layered exports) are flattened
/// depth-first so their rules keep document order. Everything else is skipped.
///
/// # Errors
///
/// Returns [`Error::RuleDecode`] for the first access rule record that does
/// not decode. `index` counts access rules in document order.
pub fn decode_rules(records: Vec<serde_json::Value>, marker: &str) -> Result<Vec<AclRule>> {
    let mut rules = Vec::new();
    let mut skipped = 0usize;
    let mut pending: Vec<serde_json::Value> = records.into_iter().rev().collect();

    while let Some(mut record) = pending.pop() {
        if let Some(serde_json::Value::Array(nested)) = record.get_mut("rulebase").map(serde_json::Value::take) {
            pending.extend(nested.into_iter().rev());
        }

        let is_rule = record
            .get("type")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|t| t.contains(marker));
        if !is_rule {
            skipped += 1;
            continue;
        }

        let index = rules.len();
        let rule: AclRule =
            serde_json::from_value(record).map_err(|source| Error::RuleDecode { index, source })?;
        rules.push(rule);
    }

    debug!("Skipped {} non-rule ACL records", skipped);
    info!("Loaded {} access rules", rules.len());
    Ok(rules)
}
