// crates/broker-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared harness, principals, and audit capture for engine tests.
// Purpose: Provide reusable test infrastructure for deterministic testing.
// Dependencies: broker-gate-core
// ============================================================================

//! ## Overview
//! Builds an engine over shared in-memory collaborators and exposes helpers to
//! seed roles and administrative permissions.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use broker_gate_core::AdminFunction;
use broker_gate_core::AuditSink;
use broker_gate_core::AuthorizationEngine;
use broker_gate_core::BindProperties;
use broker_gate_core::DecisionAuditEvent;
use broker_gate_core::DecisionContext;
use broker_gate_core::EngineConfig;
use broker_gate_core::InMemoryIdentityStore;
use broker_gate_core::InMemoryMetadataRegistry;
use broker_gate_core::PermissionKind;
use broker_gate_core::ProvisioningAuditEvent;
use broker_gate_core::PublishProperties;
use broker_gate_core::QueueProperties;
use broker_gate_core::RoleName;
use broker_gate_core::TenantScope;

// ============================================================================
// SECTION: Audit Capture
// ============================================================================

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    pub decisions: Mutex<Vec<DecisionAuditEvent>>,
    pub provisioning: Mutex<Vec<ProvisioningAuditEvent>>,
}

impl AuditSink for RecordingAuditSink {
    fn record_decision(&self, event: &DecisionAuditEvent) {
        self.decisions.lock().unwrap().push(event.clone());
    }

    fn record_provisioning(&self, event: &ProvisioningAuditEvent) {
        self.provisioning.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

pub type Engine = AuthorizationEngine<InMemoryIdentityStore, InMemoryMetadataRegistry>;

pub struct Harness {
    pub engine: Engine,
    pub identity: InMemoryIdentityStore,
    pub registry: InMemoryMetadataRegistry,
    pub audit: Arc<RecordingAuditSink>,
}

impl Harness {
    pub fn new() -> Self {
        let identity = InMemoryIdentityStore::new();
        let registry = InMemoryMetadataRegistry::new();
        let audit = Arc::new(RecordingAuditSink::default());
        let engine = AuthorizationEngine::new(
            identity.clone(),
            registry.clone(),
            EngineConfig::default(),
        )
        .with_audit_sink(Arc::clone(&audit) as Arc<dyn AuditSink>);
        Self {
            engine,
            identity,
            registry,
            audit,
        }
    }

    /// Puts `username` into the administrative role.
    pub fn make_admin(&self, username: &str) {
        self.identity.assign_role(username, "admin").unwrap();
    }

    /// Lets `username` execute an administrative function.
    pub fn allow_function(&self, username: &str, function: AdminFunction) {
        let role = format!("Internal/{username}-{}", function.as_str());
        let permission = EngineConfig::default().admin_permissions.permission_for(function).clone();
        self.identity
            .grant_role(&role, permission.as_str(), PermissionKind::UiExecute)
            .unwrap();
        self.identity.assign_role(username, &role).unwrap();
    }

    /// Gives `username` a direct grant through a dedicated role.
    pub fn grant(&self, username: &str, permission: &str, kind: PermissionKind) {
        let role = format!("Internal/{username}-{permission}-{}", kind.as_str());
        self.identity.grant_role(&role, permission, kind).unwrap();
        self.identity.assign_role(username, &role).unwrap();
    }

    pub fn role_exists(&self, role: &str) -> bool {
        self.identity.role_names().unwrap().iter().any(|name| name == role)
    }

    pub fn members(&self, role: &str) -> Vec<String> {
        use broker_gate_core::IdentityStore;
        self.identity
            .members_of_role(&RoleName::new(role))
            .unwrap()
            .into_iter()
            .map(|member| member.as_str().to_string())
            .collect()
    }

    pub fn grants(&self, role: &str) -> Vec<(String, PermissionKind)> {
        self.identity
            .grants_of_role(&RoleName::new(role))
            .unwrap()
            .into_iter()
            .map(|(permission, kind)| (permission.as_str().to_string(), kind))
            .collect()
    }

    pub fn record_counts(&self) -> (usize, usize) {
        self.registry.record_counts().unwrap()
    }
}

// ============================================================================
// SECTION: Principals and Properties
// ============================================================================

/// Principal in the `acme.com` tenant.
pub fn acme(username: &str) -> DecisionContext {
    DecisionContext::new(username, TenantScope::tenant("acme.com", 7))
}

/// Principal in the super tenant.
pub fn super_tenant(username: &str) -> DecisionContext {
    DecisionContext::new(
        username,
        TenantScope::new(Some("carbon.super".into()), broker_gate_core::TenantId::SUPER),
    )
}

pub fn queue(internal: &str) -> QueueProperties {
    QueueProperties::new(internal)
}

pub fn bind(exchange: &str, queue_name: &str, routing_key: &str) -> BindProperties {
    BindProperties {
        exchange: exchange.to_string(),
        queue_name: queue_name.to_string(),
        routing_key: routing_key.to_string(),
    }
}

pub fn publish(exchange: &str, routing_key: &str) -> PublishProperties {
    PublishProperties {
        exchange: exchange.to_string(),
        routing_key: routing_key.to_string(),
    }
}
