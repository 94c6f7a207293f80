// crates/broker-gate-core/tests/queue_lifecycle.rs
// ============================================================================
// Module: Queue Lifecycle Tests
// Description: Create and delete decisions with their registry and role effects.
// ============================================================================

//! ## Overview
//! Validates queue creation eligibility, owner-role provisioning, temporary
//! subscriber queues, and owner-role teardown on deletion.

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

use broker_gate_core::AdminFunction;
use broker_gate_core::DecisionReason;
use broker_gate_core::PermissionKind;
use broker_gate_core::Verdict;
use common::Harness;
use common::acme;
use common::queue;
use common::super_tenant;

const OWNER_ROLE: &str = "Internal/Q_acme.com-orders";

fn owner_grants() -> Vec<(String, PermissionKind)> {
    let id = "event/queue/acme.com/orders".to_string();
    let mut grants = vec![
        (id.clone(), PermissionKind::Consume),
        (id.clone(), PermissionKind::Publish),
        (id, PermissionKind::ChangePermission),
    ];
    grants.sort();
    grants
}

// ============================================================================
// SECTION: Create
// ============================================================================

#[test]
fn create_queue_without_admin_function_is_denied_without_effects() {
    let harness = Harness::new();

    let decision =
        harness.engine.create_queue(&acme("alice"), &queue("c1:acme.com/orders;durable")).unwrap();

    assert_eq!(decision.verdict, Verdict::Denied);
    assert_eq!(decision.reason, DecisionReason::NotEligible);
    assert_eq!(harness.record_counts(), (0, 0));
    assert!(!harness.role_exists(OWNER_ROLE));
}

#[test]
fn create_queue_in_own_domain_provisions_owner_role() {
    let harness = Harness::new();
    harness.allow_function("alice", AdminFunction::QueueAdd);

    let decision =
        harness.engine.create_queue(&acme("alice"), &queue("c1:acme.com/orders;durable")).unwrap();

    assert!(decision.is_allowed());
    assert_eq!(decision.reason, DecisionReason::AdminFunction(AdminFunction::QueueAdd));
    assert_eq!(harness.registry.queue_owner("acme.com/orders").unwrap().unwrap().as_str(), "alice");
    assert_eq!(harness.members(OWNER_ROLE), vec!["alice".to_string()]);
    let mut grants = harness.grants(OWNER_ROLE);
    grants.sort();
    assert_eq!(grants, owner_grants());
}

#[test]
fn create_queue_in_foreign_domain_is_recorded_but_denied() {
    let harness = Harness::new();
    harness.allow_function("alice", AdminFunction::QueueAdd);

    let decision =
        harness.engine.create_queue(&acme("alice"), &queue("c1:other.com/orders")).unwrap();

    assert_eq!(decision.verdict, Verdict::Denied);
    assert_eq!(decision.reason, DecisionReason::ForeignDomain);
    assert_eq!(harness.record_counts(), (1, 0));
    let owner = harness.registry.queue_owner("other.com/orders").unwrap().unwrap();
    assert_eq!(owner.as_str(), "alice");
    assert!(!harness.role_exists("Internal/Q_other.com-orders"));
}

#[test]
fn topic_add_holder_may_create_queue_in_own_domain() {
    let harness = Harness::new();
    harness.allow_function("alice", AdminFunction::TopicAdd);

    let decision =
        harness.engine.create_queue(&acme("alice"), &queue("c1:acme.com/orders")).unwrap();

    assert_eq!(decision.reason, DecisionReason::AdminFunction(AdminFunction::TopicAdd));
    assert!(harness.role_exists(OWNER_ROLE));
}

#[test]
fn temp_queue_creation_never_provisions_owner_role() {
    for admin in [false, true] {
        let harness = Harness::new();
        if admin {
            harness.make_admin("alice");
        } else {
            harness.allow_function("alice", AdminFunction::QueueAdd);
        }
        let roles_before = harness.identity.role_names().unwrap();

        let decision = harness.engine.create_queue(&acme("alice"), &queue("c1:tmp_1234")).unwrap();

        assert_eq!(decision.reason, DecisionReason::TempSubscriberQueue);
        assert_eq!(harness.record_counts(), (1, 0));
        assert_eq!(harness.identity.role_names().unwrap(), roles_before);
    }
}

#[test]
fn super_tenant_admin_creates_unqualified_queue() {
    let harness = Harness::new();
    harness.make_admin("root");

    let decision = harness.engine.create_queue(&super_tenant("root"), &queue("c9:orders")).unwrap();

    assert_eq!(decision.reason, DecisionReason::AdminRole);
    assert_eq!(harness.members("Internal/Q_orders"), vec!["root".to_string()]);
}

#[test]
fn second_creator_keeps_first_owner() {
    let harness = Harness::new();
    harness.allow_function("alice", AdminFunction::QueueAdd);
    harness.allow_function("bob", AdminFunction::QueueAdd);

    harness.engine.create_queue(&acme("alice"), &queue("c1:acme.com/orders")).unwrap();
    let decision = harness.engine.create_queue(&acme("bob"), &queue("c2:acme.com/orders")).unwrap();

    assert!(decision.is_allowed());
    assert_eq!(harness.members(OWNER_ROLE), vec!["alice".to_string()]);
}

// ============================================================================
// SECTION: Delete
// ============================================================================

#[test]
fn delete_queue_removes_owner_role_and_record() {
    let harness = Harness::new();
    harness.allow_function("alice", AdminFunction::QueueAdd);
    harness.allow_function("alice", AdminFunction::QueueDelete);
    harness.engine.create_queue(&acme("alice"), &queue("c1:acme.com/orders")).unwrap();

    let decision =
        harness.engine.delete_queue(&acme("alice"), &queue("c1:acme.com/orders")).unwrap();

    assert_eq!(decision.reason, DecisionReason::AdminFunction(AdminFunction::QueueDelete));
    assert!(!harness.role_exists(OWNER_ROLE));
    assert!(harness.grants(OWNER_ROLE).is_empty());
    assert_eq!(harness.record_counts(), (0, 0));
}

#[test]
fn delete_temp_queue_leaves_roles_untouched() {
    let harness = Harness::new();
    harness.make_admin("alice");
    harness.identity.assign_role("alice", "Internal/Q_tmp_1234").unwrap();
    harness.engine.create_queue(&acme("alice"), &queue("c1:tmp_1234")).unwrap();
    let roles_before = harness.identity.role_names().unwrap();

    let decision = harness.engine.delete_queue(&acme("alice"), &queue("c1:tmp_1234")).unwrap();

    assert_eq!(decision.reason, DecisionReason::TempSubscriberQueue);
    assert_eq!(harness.identity.role_names().unwrap(), roles_before);
    assert_eq!(harness.record_counts(), (0, 0));
}

#[test]
fn delete_queue_without_owner_role_is_allowed() {
    let harness = Harness::new();
    harness.allow_function("alice", AdminFunction::TopicDelete);

    let decision = harness.engine.delete_queue(&acme("alice"), &queue("c1:acme.com/gone")).unwrap();

    assert_eq!(decision.reason, DecisionReason::AdminFunction(AdminFunction::TopicDelete));
}

#[test]
fn delete_queue_without_eligibility_is_denied_without_effects() {
    let harness = Harness::new();
    harness.allow_function("alice", AdminFunction::QueueAdd);
    harness.engine.create_queue(&acme("alice"), &queue("c1:acme.com/orders")).unwrap();

    let decision =
        harness.engine.delete_queue(&acme("alice"), &queue("c1:acme.com/orders")).unwrap();

    assert_eq!(decision.verdict, Verdict::Denied);
    assert!(harness.role_exists(OWNER_ROLE));
    assert_eq!(harness.record_counts(), (1, 0));
}
