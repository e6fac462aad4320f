//! Integration tests for cpaudit
//!
//! These tests drive the full pipeline (`audit::run`) over the export
//! fixtures in `tests/fixtures/`, plus a few throwaway exports written to
//! temporary directories for the failure paths.
//!
//! ```bash
//! cargo test --test integration_tests
//! ```

#![allow(clippy::uninlined_format_args)]

use cpaudit::audit::{self, AuditRequest, TargetSelector};
use cpaudit::config::AuditConfig;
use cpaudit::loader::digest;
use cpaudit::Error;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn request(target: TargetSelector) -> AuditRequest {
    AuditRequest {
        objects_path: fixture("objects.json"),
        acls_path: fixture("rules.json"),
        target,
    }
}

fn by_name(name: &str) -> AuditRequest {
    request(TargetSelector::Name(name.to_string()))
}

fn numbers(rows: &[cpaudit::report::RuleRow]) -> Vec<u32> {
    rows.iter().map(|r| r.number).collect()
}

fn write_export(dir: &Path, name: &str, json: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_host_audit_end_to_end() {
    let report = audit::run(&by_name("web-01"), &AuditConfig::default()).unwrap();

    assert_eq!(report.target.uid, "9a1f-h1");
    assert_eq!(report.target.type_tag, "host");

    let associated: Vec<_> = report.associated.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(associated, ["web-01", "dmz-net", "web-servers", "all-dmz"]);
    assert_eq!(report.associated[0].summary, "10.20.0.15");
    assert_eq!(report.associated[0].comment, "public web front end");
    assert_eq!(report.associated[1].summary, "10.20.0.0/24");
    assert_eq!(report.associated[3].summary, "Members 2");

    // Any-sourced rule 1 and the all-dmz rule 3 leave the set; rule 2 enters it
    assert_eq!(numbers(&report.outbound), [1, 3]);
    assert_eq!(numbers(&report.inbound), [2]);

    let rule3 = &report.outbound[1];
    assert_eq!(rule3.source, ["all-dmz"]);
    assert_eq!(rule3.destination, ["backend"]);
    assert_eq!(rule3.service, ["postgres:service-tcp:5432"]);
    assert_eq!(rule3.comment, "dmz to backend");

    assert_eq!(
        report.outbound[0].service,
        ["https:service-tcp:443", "echo-request:service-icmp"]
    );
}

#[test]
fn test_isolated_host_audit() {
    let report = audit::run(&by_name("jump"), &AuditConfig::default()).unwrap();

    assert_eq!(report.associated.len(), 1);
    // Rule 6 negates its destination, so it only matches through its source
    assert_eq!(numbers(&report.outbound), [1, 2, 6]);
    assert_eq!(numbers(&report.inbound), [7]);
}

#[test]
fn test_target_by_uid() {
    let report = audit::run(
        &request(TargetSelector::Uid("9a1f-h2".to_string())),
        &AuditConfig::default(),
    )
    .unwrap();

    let associated: Vec<_> = report.associated.iter().map(|r| r.uid.as_str()).collect();
    assert_eq!(associated, ["9a1f-h2", "9a1f-n2", "9a1f-g3"]);
    assert_eq!(numbers(&report.outbound), [1, 7]);
    assert_eq!(numbers(&report.inbound), [3]);
}

#[test]
fn test_disabled_and_drop_rules_never_reported() {
    for target in ["web-01", "jump", "db-01"] {
        let report = audit::run(&by_name(target), &AuditConfig::default()).unwrap();
        let all: Vec<u32> = numbers(&report.outbound)
            .into_iter()
            .chain(numbers(&report.inbound))
            .collect();
        assert!(!all.contains(&4), "disabled rule reported for {}", target);
        assert!(!all.contains(&5), "drop rule reported for {}", target);
    }
}

#[test]
fn test_custom_accept_action_name() {
    let config = AuditConfig {
        accept_action_name: "Drop".to_string(),
        ..AuditConfig::default()
    };
    let report = audit::run(&by_name("web-01"), &config).unwrap();

    assert_eq!(numbers(&report.outbound), [5]);
    assert!(report.inbound.is_empty());
}

#[test]
fn test_text_output() {
    let report = audit::run(&by_name("web-01"), &AuditConfig::default()).unwrap();
    let text = report.to_text();

    let belongs = text.find("web-01 Belongs To").unwrap();
    let outbound = text.find("web-01 -> Target").unwrap();
    let inbound = text.find("Target -> web-01").unwrap();
    assert!(belongs < outbound && outbound < inbound);

    assert!(text.contains("all-dmz"));
    assert!(text.contains("echo-request:service-icmp"));
    assert!(!text.contains("echo-request:service-icmp:"));
    assert!(!text.contains('\x1b'));
}

#[test]
fn test_json_output_carries_input_digests() {
    let report = audit::run(&by_name("web-01"), &AuditConfig::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    let objects_sha = digest(&std::fs::read(fixture("objects.json")).unwrap());
    let rules_sha = digest(&std::fs::read(fixture("rules.json")).unwrap());

    assert_eq!(value["inputs"][0]["sha256"], objects_sha.as_str());
    assert_eq!(value["inputs"][1]["sha256"], rules_sha.as_str());
    assert_eq!(value["target"]["name"], "web-01");
    assert_eq!(value["associated"].as_array().unwrap().len(), 4);
    assert_eq!(value["inbound"][0]["source"][0], "jump");
}

#[test]
fn test_unknown_target() {
    let result = audit::run(&by_name("no-such-object"), &AuditConfig::default());
    assert!(matches!(result, Err(Error::UnknownTarget(ref n)) if n == "no-such-object"));
}

#[test]
fn test_ambiguous_target_suggests_uid() {
    let dir = tempfile::tempdir().unwrap();
    let objects = write_export(
        dir.path(),
        "objects.json",
        r#"[
            {"uid": "a", "name": "twin", "type": "host", "ipv4-address": "10.0.0.1"},
            {"uid": "b", "name": "twin", "type": "host", "ipv4-address": "10.0.0.2"}
        ]"#,
    );
    let rules = write_export(dir.path(), "rules.json", "[]");

    let request = AuditRequest {
        objects_path: objects,
        acls_path: rules,
        target: TargetSelector::Name("twin".to_string()),
    };
    let err = audit::run(&request, &AuditConfig::default()).unwrap_err();
    assert!(matches!(err, Error::AmbiguousTarget { ref uids, .. } if uids.len() == 2));

    let translation = err.translate();
    assert!(translation.suggestions.iter().any(|s| s.contains("--uid")));
}

#[test]
fn test_invalid_subnet_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let objects = write_export(
        dir.path(),
        "objects.json",
        r#"[
            {"uid": "h", "name": "h", "type": "host", "ipv4-address": "10.0.0.1"},
            {"uid": "n", "name": "bad", "type": "network", "subnet4": "10.0.0.300", "mask-length4": 24}
        ]"#,
    );
    let rules = write_export(dir.path(), "rules.json", "[]");

    let request = AuditRequest {
        objects_path: objects,
        acls_path: rules,
        target: TargetSelector::Name("h".to_string()),
    };
    let result = audit::run(&request, &AuditConfig::default());
    assert!(matches!(result, Err(Error::InvalidSubnet { ref uid, .. }) if uid == "n"));
}

#[test]
fn test_rule_with_unknown_object_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write_export(
        dir.path(),
        "rules.json",
        r#"[
            {"uid": "r1", "type": "access-rule", "rule-number": 1, "enabled": true,
             "action": "6c48-accept", "source": ["ghost"], "destination": ["9a1f-h1"],
             "service": ["9a1f-s1"], "source-negate": false, "destination-negate": false}
        ]"#,
    );

    let request = AuditRequest {
        objects_path: fixture("objects.json"),
        acls_path: rules,
        target: TargetSelector::Name("web-01".to_string()),
    };
    let result = audit::run(&request, &AuditConfig::default());
    assert!(matches!(result, Err(Error::UnknownObject { ref uid, .. }) if uid == "ghost"));
}

#[test]
fn test_non_array_export_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let objects = write_export(dir.path(), "objects.json", r#"{"objects": []}"#);

    let request = AuditRequest {
        objects_path: objects,
        acls_path: fixture("rules.json"),
        target: TargetSelector::Name("web-01".to_string()),
    };
    let result = audit::run(&request, &AuditConfig::default());
    assert!(matches!(result, Err(Error::NotAnArray { .. })));
}

#[test]
fn test_missing_export_file() {
    let request = AuditRequest {
        objects_path: fixture("does-not-exist.json"),
        acls_path: fixture("rules.json"),
        target: TargetSelector::Name("web-01".to_string()),
    };
    let err = audit::run(&request, &AuditConfig::default()).unwrap_err();
    assert!(matches!(err, Error::ReadExport { what: "Object", .. }));

    let translation = err.translate();
    assert!(translation.user_message.contains("does-not-exist.json"));
    assert!(translation.suggestions.iter().any(|s| s.contains("--objs")));
}

#[test]
fn test_missing_acl_file_names_the_acl_input() {
    let request = AuditRequest {
        objects_path: fixture("objects.json"),
        acls_path: PathBuf::from("/nope/rules.json"),
        target: TargetSelector::Name("web-01".to_string()),
    };
    let err = audit::run(&request, &AuditConfig::default()).unwrap_err();
    assert!(err.to_string().contains("/nope/rules.json"));

    let translation = err.translate();
    assert!(translation.user_message.contains("/nope/rules.json"));
    assert!(translation.suggestions.iter().any(|s| s.contains("--acls")));
}
