//! Object catalog: typed policy objects keyed by identifier and by name
//!
//! The catalog is the sole owner of every [`Entity`] decoded from an object
//! export. Everything else (the relationship graph, the traversal, the rule
//! classifier, the report renderers) refers to entities through [`EntityId`]
//! handles or borrows.
//!
//! # Record format
//!
//! Each record is a JSON object with at least a `uid`. The `type` tag selects
//! the kind-specific fields that are read:
//!
//! | type tag                    | fields                          |
//! |-----------------------------|---------------------------------|
//! | `host`                      | `ipv4-address`                  |
//! | `network`                   | `subnet4`, `mask-length4`       |
//! | `group`, `service-group`    | `members`                       |
//! | `service-tcp`, `service-*`  | `port`, `protocol`              |
//!
//! Any other tag (`CpmiAnyObject`, `RulebaseAction`, gateways, `time-group`,
//! ...) is kept as a plain entity so rules can still resolve it by
//! identifier. Its members, if any, are ignored.

use crate::core::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

/// Handle of an entity inside the [`Catalog`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Coarse object kind derived from the export's open-ended type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EntityKind {
    #[strum(serialize = "host")]
    Host,
    #[strum(serialize = "network")]
    Network,
    #[strum(serialize = "group")]
    Group,
    #[strum(serialize = "service")]
    Service,
    #[strum(serialize = "other")]
    Other,
}

impl EntityKind {
    /// Classifies a raw type tag.
    pub fn from_type_tag(tag: &str) -> Self {
        match tag {
            "host" => EntityKind::Host,
            "network" => EntityKind::Network,
            "group" | "service-group" => EntityKind::Group,
            t if t.starts_with("service-") => EntityKind::Service,
            _ => EntityKind::Other,
        }
    }
}

/// Port values appear both as strings (`"443"`, `"1024-65535"`) and numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Text(String),
    Number(u64),
}

impl PortValue {
    fn into_string(self) -> String {
        match self {
            PortValue::Text(s) => s,
            PortValue::Number(n) => n.to_string(),
        }
    }
}

/// Object references (group members, rule endpoints and actions) appear as
/// bare identifiers or, in full-detail exports, as embedded objects carrying
/// a `uid`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MemberRef {
    Uid(String),
    Object { uid: String },
}

impl MemberRef {
    fn into_uid(self) -> String {
        match self {
            MemberRef::Uid(uid) | MemberRef::Object { uid } => uid,
        }
    }
}

/// One object record as it appears in the export.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRecord {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub comments: String,
    #[serde(rename = "type", default)]
    pub type_tag: String,
    #[serde(rename = "ipv4-address", default)]
    pub ipv4_address: Option<String>,
    #[serde(rename = "subnet4", default)]
    pub subnet4: Option<String>,
    #[serde(rename = "mask-length4", default)]
    pub mask_length4: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_port")]
    pub port: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "deserialize_uid_list")]
    pub members: Vec<String>,
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<PortValue>::deserialize(deserializer)?.map(PortValue::into_string))
}

pub(crate) fn deserialize_uid_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let refs = Option::<Vec<MemberRef>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(refs.into_iter().map(MemberRef::into_uid).collect())
}

pub(crate) fn deserialize_uid<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<MemberRef>::deserialize(deserializer)?
        .map(MemberRef::into_uid)
        .unwrap_or_default())
}

/// Kind-specific payload of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Host {
        ipv4: Option<Ipv4Addr>,
    },
    /// Subnet text is kept verbatim; it is parsed into a range when the
    /// relationship graph is built.
    Network {
        subnet: Option<String>,
        mask_length: Option<u32>,
    },
    Group {
        members: Vec<String>,
    },
    Service {
        port: Option<String>,
        protocol: Option<String>,
    },
    Other,
}

/// A policy object. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub uid: String,
    pub name: String,
    pub comments: String,
    pub type_tag: String,
    pub payload: Payload,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self.payload {
            Payload::Host { .. } => EntityKind::Host,
            Payload::Network { .. } => EntityKind::Network,
            Payload::Group { .. } => EntityKind::Group,
            Payload::Service { .. } => EntityKind::Service,
            Payload::Other => EntityKind::Other,
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind() == EntityKind::Network
    }

    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        match self.payload {
            Payload::Host { ipv4 } => ipv4,
            _ => None,
        }
    }

    /// Member identifiers, empty for non-group entities.
    pub fn members(&self) -> &[String] {
        match &self.payload {
            Payload::Group { members } => members,
            _ => &[],
        }
    }

    pub fn port(&self) -> Option<&str> {
        match &self.payload {
            Payload::Service { port, .. } => port.as_deref(),
            _ => None,
        }
    }

    /// Builds an entity from a decoded record, parsing host addresses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] when a host carries a non-empty
    /// address that is not dotted IPv4.
    pub fn from_record(record: ObjectRecord) -> Result<Self> {
        let kind = EntityKind::from_type_tag(&record.type_tag);
        if kind != EntityKind::Group && !record.members.is_empty() {
            debug!(
                "Ignoring {} members of {} ({} is {} kind)",
                record.members.len(),
                record.uid,
                record.type_tag,
                kind
            );
        }

        let payload = match kind {
            EntityKind::Host => {
                let ipv4 = match non_empty(record.ipv4_address) {
                    Some(text) => Some(text.trim().parse::<Ipv4Addr>().map_err(|_| {
                        Error::InvalidAddress {
                            uid: record.uid.clone(),
                            value: text.clone(),
                        }
                    })?),
                    None => {
                        debug!("Host {} has no IPv4 address", record.uid);
                        None
                    }
                };
                Payload::Host { ipv4 }
            }
            EntityKind::Network => Payload::Network {
                subnet: non_empty(record.subnet4),
                mask_length: record.mask_length4,
            },
            EntityKind::Group => Payload::Group {
                members: record.members,
            },
            EntityKind::Service => Payload::Service {
                port: non_empty(record.port),
                protocol: non_empty(record.protocol),
            },
            EntityKind::Other => Payload::Other,
        };

        Ok(Self {
            uid: record.uid,
            name: record.name,
            comments: record.comments,
            type_tag: record.type_tag,
            payload,
        })
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.type_tag, self.uid)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// All decoded entities plus the identifier and name indexes.
#[derive(Debug, Default)]
pub struct Catalog {
    entities: Vec<Entity>,
    by_uid: HashMap<String, EntityId>,
    by_name: HashMap<String, EntityId>,
    /// Names shared by more than one entity, with every holder
    name_collisions: BTreeMap<String, Vec<EntityId>>,
    duplicate_uids: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes raw object records and builds the catalog.
    ///
    /// # Errors
    ///
    /// Any record that fails to decode aborts the whole load.
    pub fn load(records: Vec<serde_json::Value>) -> Result<Self> {
        let mut catalog = Self::new();

        for (index, raw) in records.into_iter().enumerate() {
            let uid = raw
                .get("uid")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("<no uid>")
                .to_string();
            let record: ObjectRecord = serde_json::from_value(raw)
                .map_err(|source| Error::ObjectDecode { index, uid, source })?;
            catalog.insert(Entity::from_record(record)?);
        }

        info!(
            "Loaded {} objects ({} duplicate identifiers, {} shared names)",
            catalog.len(),
            catalog.duplicate_uids,
            catalog.name_collisions.len()
        );
        Ok(catalog)
    }

    /// Builds a catalog from already-decoded records.
    pub fn from_records(records: impl IntoIterator<Item = ObjectRecord>) -> Result<Self> {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(Entity::from_record(record)?);
        }
        Ok(catalog)
    }

    /// Inserts an entity. A repeated identifier replaces the earlier entity
    /// in place (last write wins).
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = if let Some(&existing) = self.by_uid.get(&entity.uid) {
            warn!(
                "Duplicate object identifier {}; keeping the later record",
                entity.uid
            );
            self.duplicate_uids += 1;
            let old_name = std::mem::take(&mut self.entities[existing.0].name);
            self.forget_name(&old_name, existing);
            self.entities[existing.0] = entity;
            existing
        } else {
            let id = EntityId(self.entities.len());
            self.by_uid.insert(entity.uid.clone(), id);
            self.entities.push(entity);
            id
        };

        let name = self.entities[id.0].name.clone();
        if let Some(previous) = self.by_name.insert(name.clone(), id)
            && previous != id
        {
            warn!("Object name {:?} is shared by several objects", name);
            let holders = self.name_collisions.entry(name).or_default();
            for holder in [previous, id] {
                if !holders.contains(&holder) {
                    holders.push(holder);
                }
            }
        }

        id
    }

    fn forget_name(&mut self, name: &str, id: EntityId) {
        if self.by_name.get(name) == Some(&id) {
            self.by_name.remove(name);
        }
        if let Some(holders) = self.name_collisions.get_mut(name) {
            holders.retain(|&h| h != id);
            if let Some(&remaining) = holders.first() {
                self.by_name.insert(name.to_string(), remaining);
            }
            if holders.len() < 2 {
                self.name_collisions.remove(name);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of records whose identifier repeated an earlier one.
    pub fn duplicate_uids(&self) -> usize {
        self.duplicate_uids
    }

    /// Names held by more than one entity.
    pub fn name_collisions(&self) -> impl Iterator<Item = &str> {
        self.name_collisions.keys().map(String::as_str)
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i), e))
    }

    pub fn id_of(&self, uid: &str) -> Option<EntityId> {
        self.by_uid.get(uid).copied()
    }

    pub fn get(&self, uid: &str) -> Option<&Entity> {
        self.id_of(uid).map(|id| self.entity(id))
    }

    /// Looks up an identifier that some other record depends on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownObject`] naming the referencing record.
    pub fn require(&self, uid: &str, referenced_by: impl FnOnce() -> String) -> Result<EntityId> {
        self.id_of(uid).ok_or_else(|| Error::UnknownObject {
            uid: uid.to_string(),
            referenced_by: referenced_by(),
        })
    }

    /// Resolves a target by display name.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownTarget`] if no entity carries the name
    /// - [`Error::AmbiguousTarget`] if several entities carry it
    pub fn resolve_name(&self, name: &str) -> Result<EntityId> {
        if let Some(holders) = self.name_collisions.get(name) {
            return Err(Error::AmbiguousTarget {
                name: name.to_string(),
                uids: holders
                    .iter()
                    .map(|&id| self.entity(id).uid.clone())
                    .collect(),
            });
        }
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownTarget(name.to_string()))
    }

    /// Resolves a target by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTarget`] if the identifier is not loaded.
    pub fn resolve_uid(&self, uid: &str) -> Result<EntityId> {
        self.id_of(uid)
            .ok_or_else(|| Error::UnknownTarget(uid.to_string()))
    }
}
