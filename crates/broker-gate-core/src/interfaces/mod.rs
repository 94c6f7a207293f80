// crates/broker-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Broker Gate Interfaces
// Description: Collaborator contracts for identity, metadata, and tenant resolution.
// Purpose: Define the narrow surfaces the authorization engine calls through.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The engine owns no storage. Role membership and grants live in an
//! [`IdentityStore`]; queue and subscription bookkeeping lives in a
//! [`MetadataRegistry`]. Every collaborator method returns an explicit
//! `Result` so backend failures are never mistaken for a denial.
//!
//! Security posture: the engine fails closed by propagating every
//! collaborator error to the broker unchanged in kind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::decision::DecisionContext;
use crate::core::identifiers::PermissionId;
use crate::core::identifiers::RoleName;
use crate::core::identifiers::TenantScope;
use crate::core::identifiers::Username;
use crate::core::policy::PermissionKind;

// ============================================================================
// SECTION: Identity Store
// ============================================================================

/// Identity store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityStoreError {
    /// Identity store could not be reached or failed internally.
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
    /// Write conflicted with existing state (for example a duplicate role).
    #[error("identity store conflict: {0}")]
    Conflict(String),
    /// Referenced entity does not exist.
    #[error("identity store entity not found: {0}")]
    NotFound(String),
}

/// Role and permission backend consulted by the engine.
pub trait IdentityStore {
    /// Returns the roles held by `username`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the lookup fails.
    fn roles_of_user(&self, username: &Username) -> Result<BTreeSet<String>, IdentityStoreError>;

    /// Returns true when `role` exists.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the lookup fails.
    fn role_exists(&self, role: &RoleName) -> Result<bool, IdentityStoreError>;

    /// Creates `role` with the given initial members.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError::Conflict`] when the role already exists,
    /// or another variant when the write fails.
    fn create_role(&self, role: &RoleName, members: &[Username])
    -> Result<(), IdentityStoreError>;

    /// Deletes `role` and its grants.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the write fails.
    fn delete_role(&self, role: &RoleName) -> Result<(), IdentityStoreError>;

    /// Returns the members of `role`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the lookup fails.
    fn members_of_role(&self, role: &RoleName) -> Result<BTreeSet<Username>, IdentityStoreError>;

    /// Adds members to `role`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the write fails.
    fn add_members_to_role(
        &self,
        role: &RoleName,
        members: &[Username],
    ) -> Result<(), IdentityStoreError>;

    /// Returns true when `username` holds `kind` on `permission`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the lookup fails.
    fn is_authorized(
        &self,
        username: &Username,
        permission: &PermissionId,
        kind: PermissionKind,
    ) -> Result<bool, IdentityStoreError>;

    /// Grants `kind` on `permission` to `role`. Repeating a grant is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the write fails.
    fn grant_permission(
        &self,
        role: &RoleName,
        permission: &PermissionId,
        kind: PermissionKind,
    ) -> Result<(), IdentityStoreError>;
}

// ============================================================================
// SECTION: Metadata Registry
// ============================================================================

/// Metadata registry errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registry could not be reached or failed internally.
    #[error("metadata registry unavailable: {0}")]
    Unavailable(String),
    /// Registry refused the record.
    #[error("metadata registry rejected record: {0}")]
    Rejected(String),
}

/// Persistent bookkeeping of queues and topic subscriptions.
///
/// All names passed in are registry-safe (no `@`).
pub trait MetadataRegistry {
    /// Records a queue and its owner.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the write fails.
    fn create_queue_record(&self, name: &str, owner: &Username) -> Result<(), RegistryError>;

    /// Removes a queue record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the write fails.
    fn delete_queue_record(&self, name: &str) -> Result<(), RegistryError>;

    /// Records a topic subscription backed by `queue_name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the write fails.
    fn create_subscription_record(
        &self,
        routing_key: &str,
        queue_name: &str,
        owner: &Username,
    ) -> Result<(), RegistryError>;

    /// Removes a topic subscription record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the write fails.
    fn delete_subscription_record(
        &self,
        routing_key: &str,
        queue_name: &str,
    ) -> Result<(), RegistryError>;
}

// ============================================================================
// SECTION: Tenant Resolution
// ============================================================================

/// Tenant resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantError {
    /// Tenant context is unavailable for the current request.
    #[error("tenant context unavailable: {0}")]
    Unavailable(String),
}

/// Resolves the tenant scope of the current broker request.
///
/// Broker adapters call this once per request and pass the result to the
/// engine inside a [`DecisionContext`].
pub trait TenantResolver {
    /// Returns the resolved tenant scope.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError`] when no tenant context can be resolved.
    fn current_tenant(&self) -> Result<TenantScope, TenantError>;

    /// Builds a decision context for `username` in the current tenant scope.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError`] when no tenant context can be resolved.
    fn context_for(&self, username: Username) -> Result<DecisionContext, TenantError> {
        Ok(DecisionContext {
            username,
            tenant: self.current_tenant()?,
        })
    }
}

/// Resolver that always returns a fixed tenant scope.
#[derive(Debug, Clone)]
pub struct StaticTenantResolver {
    /// Scope returned for every request.
    scope: TenantScope,
}

impl StaticTenantResolver {
    /// Creates a resolver for a fixed scope.
    #[must_use]
    pub const fn new(scope: TenantScope) -> Self {
        Self {
            scope,
        }
    }
}

impl TenantResolver for StaticTenantResolver {
    fn current_tenant(&self) -> Result<TenantScope, TenantError> {
        Ok(self.scope.clone())
    }
}
