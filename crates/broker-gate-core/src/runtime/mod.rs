// crates/broker-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Broker Gate Runtime
// Description: Authorization engine, evaluator, provisioner, and helpers.
// Purpose: Execute broker authorization decisions against injected collaborators.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the action handlers, the rule evaluator, and the
//! role provisioner, plus audit sinks and in-memory collaborators. Every
//! broker checkpoint must call into [`AuthorizationEngine`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod engine;
pub mod evaluator;
pub mod provisioner;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditLevel;
pub use audit::AuditSink;
pub use audit::DecisionAuditEvent;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::ProvisioningAuditEvent;
pub use audit::ProvisioningOutcome;
pub use audit::StderrAuditSink;
pub use engine::AuthorizationEngine;
pub use engine::AuthzError;
pub use engine::BackendError;
pub use evaluator::PermissionEvaluator;
pub use evaluator::Rule;
pub use provisioner::RoleProvisioner;
pub use store::GrantKey;
pub use store::InMemoryIdentityStore;
pub use store::InMemoryMetadataRegistry;
