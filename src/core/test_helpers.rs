//! Shared test utilities for core module tests
//!
//! Provides record builders so tests don't repeat JSON boilerplate.
//! This module is only compiled in test mode.

use crate::core::catalog::{Catalog, ObjectRecord};
use crate::core::rules::AclRule;

fn record(uid: &str, name: &str, type_tag: &str) -> ObjectRecord {
    ObjectRecord {
        uid: uid.to_string(),
        name: name.to_string(),
        comments: String::new(),
        type_tag: type_tag.to_string(),
        ipv4_address: None,
        subnet4: None,
        mask_length4: None,
        port: None,
        protocol: None,
        members: Vec::new(),
    }
}

/// Host record; an empty `ipv4` leaves the address unset.
pub fn host(uid: &str, name: &str, ipv4: &str) -> ObjectRecord {
    ObjectRecord {
        ipv4_address: Some(ipv4.to_string()),
        ..record(uid, name, "host")
    }
}

pub fn network(uid: &str, name: &str, subnet: &str, mask: u32) -> ObjectRecord {
    ObjectRecord {
        subnet4: Some(subnet.to_string()),
        mask_length4: Some(mask),
        ..record(uid, name, "network")
    }
}

pub fn group(uid: &str, name: &str, members: &[&str]) -> ObjectRecord {
    ObjectRecord {
        members: members.iter().map(ToString::to_string).collect(),
        ..record(uid, name, "group")
    }
}

pub fn service_group(uid: &str, name: &str, members: &[&str]) -> ObjectRecord {
    ObjectRecord {
        type_tag: "service-group".to_string(),
        ..group(uid, name, members)
    }
}

/// Service record; an empty `port` leaves the port unset (ICMP services).
pub fn service(uid: &str, name: &str, type_tag: &str, port: &str) -> ObjectRecord {
    ObjectRecord {
        port: Some(port.to_string()).filter(|p| !p.is_empty()),
        ..record(uid, name, type_tag)
    }
}

pub fn other(uid: &str, name: &str, type_tag: &str) -> ObjectRecord {
    record(uid, name, type_tag)
}

/// Catalog used across core tests:
///
/// - `h1` "H1" 10.0.0.5 inside `n1` "N1" 10.0.0.0/24, member of `g1` "G1"
/// - `web` "web" 192.168.1.10, unrelated to H1
/// - `any` wildcard object, `accept`/`drop` rulebase actions
/// - `s-https` tcp/443, `s-echo` icmp, `sg` service group of both
pub fn sample_catalog() -> Catalog {
    Catalog::from_records([
        host("h1", "H1", "10.0.0.5"),
        network("n1", "N1", "10.0.0.0", 24),
        group("g1", "G1", &["h1"]),
        host("web", "web", "192.168.1.10"),
        other("any", "Any", "CpmiAnyObject"),
        other("accept", "Accept", "RulebaseAction"),
        other("drop", "Drop", "RulebaseAction"),
        service("s-https", "https", "service-tcp", "443"),
        service("s-echo", "echo-request", "service-icmp", ""),
        service_group("sg", "web-services", &["s-https", "s-echo"]),
    ])
    .expect("sample catalog is well formed")
}

/// Enabled accept rule with the given source and destination identifiers.
pub fn accept_rule(number: u32, source: &[&str], destination: &[&str]) -> AclRule {
    AclRule {
        uid: format!("r{number}"),
        name: String::new(),
        action: "accept".to_string(),
        enabled: true,
        source: source.iter().map(ToString::to_string).collect(),
        source_negate: false,
        destination: destination.iter().map(ToString::to_string).collect(),
        destination_negate: false,
        service: vec!["s-https".to_string()],
        number,
        comments: String::new(),
        type_tag: "access-rule".to_string(),
    }
}
