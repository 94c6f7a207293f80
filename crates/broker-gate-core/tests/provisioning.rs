// crates/broker-gate-core/tests/provisioning.rs
// ============================================================================
// Module: Role Provisioning Tests
// Description: Idempotence of owner and topic role provisioning.
// ============================================================================

//! ## Overview
//! Drives the role provisioner directly to pin its idempotence guarantees and
//! the audit events it emits.

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

use broker_gate_core::AuditLevel;
use broker_gate_core::EngineConfig;
use broker_gate_core::IdentityStore;
use broker_gate_core::InMemoryIdentityStore;
use broker_gate_core::NameScheme;
use broker_gate_core::ProvisioningOutcome;
use broker_gate_core::QueueName;
use broker_gate_core::RoleProvisioner;
use broker_gate_core::TopicName;
use common::RecordingAuditSink;
use common::acme;

fn outcomes(audit: &RecordingAuditSink) -> Vec<ProvisioningOutcome> {
    audit.provisioning.lock().unwrap().iter().map(|event| event.outcome).collect()
}

#[test]
fn owner_provisioning_twice_is_a_noop_with_warning() {
    let identity = InMemoryIdentityStore::new();
    let config = EngineConfig::default();
    let audit = RecordingAuditSink::default();
    let provisioner = RoleProvisioner::new(&identity, NameScheme::new(&config), &audit);
    let queue = QueueName::from_raw("acme.com/orders");

    let first = provisioner.provision_queue_owner(&acme("alice"), &queue).unwrap();
    let grants_after_first = identity.grants_of_role(&first).unwrap();
    let second = provisioner.provision_queue_owner(&acme("bob"), &queue).unwrap();

    assert_eq!(first, second);
    assert_eq!(identity.role_names().unwrap(), vec![first.as_str().to_string()]);
    assert_eq!(identity.grants_of_role(&second).unwrap(), grants_after_first);
    assert_eq!(grants_after_first.len(), 3);
    assert_eq!(
        outcomes(&audit),
        vec![
            ProvisioningOutcome::RoleCreated,
            ProvisioningOutcome::GrantsAsserted,
            ProvisioningOutcome::RoleExistsSkipped,
        ]
    );
    let warning = audit.provisioning.lock().unwrap().last().cloned().unwrap();
    assert_eq!(warning.level, AuditLevel::Warn);
    assert_eq!(warning.username.as_deref(), Some("bob"));
}

#[test]
fn topic_subscription_twice_keeps_single_membership() {
    let identity = InMemoryIdentityStore::new();
    let config = EngineConfig::default();
    let audit = RecordingAuditSink::default();
    let provisioner = RoleProvisioner::new(&identity, NameScheme::new(&config), &audit);
    let topic = TopicName::from_routing_key("stocks.nyse");
    let temp_queue = QueueName::from_raw("tmp_sub1");

    let role = provisioner.provision_topic_subscriber(&acme("alice"), &topic, &temp_queue).unwrap();
    provisioner.provision_topic_subscriber(&acme("alice"), &topic, &temp_queue).unwrap();

    assert_eq!(identity.members_of_role(&role).unwrap().len(), 1);
    assert_eq!(identity.grants_of_role(&role).unwrap().len(), 6);
    assert_eq!(
        outcomes(&audit),
        vec![
            ProvisioningOutcome::RoleCreated,
            ProvisioningOutcome::GrantsAsserted,
            ProvisioningOutcome::GrantsAsserted,
        ]
    );
}

#[test]
fn deprovision_reports_absent_role() {
    let identity = InMemoryIdentityStore::new();
    let config = EngineConfig::default();
    let audit = RecordingAuditSink::default();
    let provisioner = RoleProvisioner::new(&identity, NameScheme::new(&config), &audit);
    let queue = QueueName::from_raw("orders");

    provisioner.provision_queue_owner(&acme("alice"), &queue).unwrap();
    assert!(provisioner.deprovision_queue_owner(&queue).unwrap());
    assert!(!provisioner.deprovision_queue_owner(&queue).unwrap());

    assert!(identity.role_names().unwrap().is_empty());
    let last = outcomes(&audit);
    assert_eq!(
        &last[last.len() - 2 ..],
        &[ProvisioningOutcome::RoleDeleted, ProvisioningOutcome::RoleAbsent]
    );
}

#[test]
fn custom_role_domain_qualifies_provisioned_roles() {
    let identity = InMemoryIdentityStore::new();
    let config = EngineConfig {
        internal_role_domain: "Broker".to_string(),
        ..EngineConfig::default()
    };
    let audit = RecordingAuditSink::default();
    let provisioner = RoleProvisioner::new(&identity, NameScheme::new(&config), &audit);

    let role =
        provisioner.provision_queue_owner(&acme("alice"), &QueueName::from_raw("orders")).unwrap();

    assert_eq!(role.as_str(), "Broker/Q_orders");
    assert!(identity.role_exists(&role).unwrap());
}
