// crates/broker-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Broker Gate Identifiers
// Description: Strongly typed identifiers for principals, tenants, roles, and permissions.
// Purpose: Keep identity-store keys distinct from free-form broker strings.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the identifiers the engine exchanges with the identity
//! store. Role and permission identifiers are literal keys in the store, so
//! their string forms are stable and must never be reformatted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Principal Identifiers
// ============================================================================

/// Username of a pre-authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a new username.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the username without its tenant qualifier.
    ///
    /// Tenant users authenticate as `name@tenant-domain`; role membership
    /// stores the bare name. The suffix is stripped only for non-default
    /// tenants and only when it matches the resolved tenant domain.
    #[must_use]
    pub fn tenant_aware(&self, scope: &TenantScope) -> Self {
        if !scope.is_tenant() {
            return self.clone();
        }
        let Some(domain) = scope.domain() else {
            return self.clone();
        };
        match self.0.rsplit_once('@') {
            Some((bare, suffix)) if suffix == domain.as_str() && !bare.is_empty() => {
                Self::new(bare)
            }
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Tenant Identifiers
// ============================================================================

/// Tenant domain name (for example `acme.com`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantDomain(String);

impl TenantDomain {
    /// Creates a new tenant domain.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self(domain.into())
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TenantDomain {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Numeric tenant identifier as reported by tenant resolution.
///
/// # Invariants
/// - Values `> 0` denote a non-default tenant; zero and negative values denote
///   the default/super tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(i64);

impl TenantId {
    /// Tenant id used by the super tenant.
    pub const SUPER: Self = Self(-1234);

    /// Creates a tenant identifier from a raw value.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Returns true when this id denotes a non-default tenant.
    #[must_use]
    pub const fn is_tenant(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Resolved tenant context for one decision.
///
/// # Invariants
/// - `domain == None` means the default/super tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantScope {
    /// Resolved tenant domain, if any.
    domain: Option<TenantDomain>,
    /// Resolved tenant id.
    id: TenantId,
}

impl TenantScope {
    /// Creates a tenant scope from resolved values.
    #[must_use]
    pub const fn new(domain: Option<TenantDomain>, id: TenantId) -> Self {
        Self {
            domain,
            id,
        }
    }

    /// Scope for the default/super tenant without a domain.
    #[must_use]
    pub const fn default_tenant() -> Self {
        Self::new(None, TenantId::SUPER)
    }

    /// Scope for a non-default tenant.
    #[must_use]
    pub fn tenant(domain: impl Into<String>, id: i64) -> Self {
        Self::new(Some(TenantDomain::new(domain)), TenantId::from_raw(id))
    }

    /// Returns the resolved tenant domain.
    #[must_use]
    pub const fn domain(&self) -> Option<&TenantDomain> {
        self.domain.as_ref()
    }

    /// Returns the resolved tenant id.
    #[must_use]
    pub const fn id(&self) -> TenantId {
        self.id
    }

    /// Returns true when the scope denotes a non-default tenant.
    #[must_use]
    pub const fn is_tenant(&self) -> bool {
        self.id.is_tenant()
    }
}

// ============================================================================
// SECTION: Identity Store Keys
// ============================================================================

/// Qualified role name inside a role domain (`Internal/Q_orders`).
///
/// # Invariants
/// - `domain` never contains `/`; the qualified form is `domain/local`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a role name from an already qualified string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a role name qualified with the given role domain.
    #[must_use]
    pub fn qualified(domain: &str, local: &str) -> Self {
        Self(format!("{domain}/{local}"))
    }

    /// Returns the qualified role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the role name without its domain qualifier.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(_, local)| local)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RoleName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque permission identifier addressed by fine-grained grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(String);

impl PermissionId {
    /// Creates a new permission identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PermissionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
