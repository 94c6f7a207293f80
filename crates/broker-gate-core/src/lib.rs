// crates/broker-gate-core/src/lib.rs
// ============================================================================
// Module: Broker Gate Core Library
// Description: Public API surface for the broker authorization engine.
// Purpose: Expose core types, collaborator interfaces, and the runtime engine.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Broker Gate decides whether a principal may create, consume, bind, publish,
//! unbind, or delete queues and topics in a multi-tenant message broker, and
//! provisions the per-resource roles that back future decisions. It owns no
//! storage and integrates through the identity store and metadata registry
//! interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::IdentityStore;
pub use interfaces::IdentityStoreError;
pub use interfaces::MetadataRegistry;
pub use interfaces::RegistryError;
pub use interfaces::StaticTenantResolver;
pub use interfaces::TenantError;
pub use interfaces::TenantResolver;
pub use runtime::AuditLevel;
pub use runtime::AuditSink;
pub use runtime::AuthorizationEngine;
pub use runtime::AuthzError;
pub use runtime::BackendError;
pub use runtime::DecisionAuditEvent;
pub use runtime::FileAuditSink;
pub use runtime::InMemoryIdentityStore;
pub use runtime::InMemoryMetadataRegistry;
pub use runtime::NoopAuditSink;
pub use runtime::PermissionEvaluator;
pub use runtime::ProvisioningAuditEvent;
pub use runtime::ProvisioningOutcome;
pub use runtime::RoleProvisioner;
pub use runtime::Rule;
pub use runtime::StderrAuditSink;
