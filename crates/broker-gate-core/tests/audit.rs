// crates/broker-gate-core/tests/audit.rs
// ============================================================================
// Module: Audit Event Tests
// Description: Decision and provisioning audit records.
// ============================================================================

//! ## Overview
//! Validates the audit events the engine emits and the JSON lines written by
//! the file sink.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;

use broker_gate_core::AdminFunction;
use broker_gate_core::AuthorizationEngine;
use broker_gate_core::BrokerAction;
use broker_gate_core::EngineConfig;
use broker_gate_core::FileAuditSink;
use broker_gate_core::InMemoryIdentityStore;
use broker_gate_core::InMemoryMetadataRegistry;
use broker_gate_core::ProvisioningOutcome;
use broker_gate_core::Verdict;
use common::Harness;
use common::acme;
use common::bind;
use common::queue;
use serde_json::Value;

#[test]
fn every_decision_is_recorded() {
    let harness = Harness::new();
    harness.allow_function("alice", AdminFunction::QueueAdd);

    harness.engine.create_queue(&acme("alice"), &queue("c1:acme.com/orders")).unwrap();
    harness.engine.consume_queue(&acme("bob"), &queue("c1:acme.com/orders")).unwrap();
    harness.engine.unbind_queue(&bind("amq.direct", "c1:acme.com/orders", "x")).unwrap();

    let events = harness.audit.decisions.lock().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].action, BrokerAction::CreateQueue);
    assert_eq!(events[0].verdict, Some(Verdict::Allowed));
    assert_eq!(events[0].reason, Some("queue_add"));
    assert_eq!(events[0].tenant_domain.as_deref(), Some("acme.com"));
    assert_eq!(events[1].verdict, Some(Verdict::Denied));
    assert_eq!(events[1].reason, Some("not_eligible"));
    assert_eq!(events[2].username, None);
    assert_eq!(events[2].reason, Some("unbind"));
}

#[test]
fn existing_owner_role_emits_warning() {
    let harness = Harness::new();
    harness.allow_function("alice", AdminFunction::QueueAdd);
    harness.allow_function("bob", AdminFunction::QueueAdd);

    harness.engine.create_queue(&acme("alice"), &queue("c1:acme.com/orders")).unwrap();
    harness.engine.create_queue(&acme("bob"), &queue("c2:acme.com/orders")).unwrap();

    let events = harness.audit.provisioning.lock().unwrap();
    let skipped: Vec<_> = events
        .iter()
        .filter(|event| event.outcome == ProvisioningOutcome::RoleExistsSkipped)
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].role, "Internal/Q_acme.com-orders");
    assert_eq!(skipped[0].username.as_deref(), Some("bob"));
}

#[test]
fn file_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let identity = InMemoryIdentityStore::new();
    identity.assign_role("alice", "admin").unwrap();
    let engine =
        AuthorizationEngine::new(identity, InMemoryMetadataRegistry::new(), EngineConfig::default())
            .with_audit_sink(Arc::new(FileAuditSink::new(&path).unwrap()));

    engine.create_queue(&acme("alice"), &queue("c1:acme.com/orders")).unwrap();
    engine.create_queue(&acme("alice"), &queue("c1:")).unwrap_err();

    let contents = std::fs::read_to_string(&path).unwrap();
    let records: Vec<Value> =
        contents.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    let decisions: Vec<&Value> =
        records.iter().filter(|record| record["event"] == "authz_decision").collect();
    let provisioning: Vec<&Value> =
        records.iter().filter(|record| record["event"] == "role_provisioning").collect();

    assert_eq!(decisions.len(), 2);
    assert_eq!(decisions[0]["action"], "create_queue");
    assert_eq!(decisions[0]["verdict"], "allowed");
    assert_eq!(decisions[0]["reason"], "admin_role");
    assert_eq!(decisions[1]["verdict"], Value::Null);
    assert_eq!(decisions[1]["error_kind"], "malformed_resource_name");
    assert_eq!(provisioning[0]["outcome"], "role_created");
    assert_eq!(provisioning[0]["level"], "info");
}
