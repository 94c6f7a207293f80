// crates/broker-gate-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Broker Gate Permission Evaluator
// Description: Ordered, short-circuiting authorization rule chains.
// Purpose: Answer whether a principal may perform an action on a resource.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Action handlers express eligibility as an ordered slice of [`Rule`]s. The
//! evaluator checks them in order and returns the reason of the first rule
//! that matches. No match means denial; collaborator failures propagate and
//! are never read as a denial. Identity lookups use the principal's
//! tenant-aware name, the same name the provisioner records as a member.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AdminFunction;
use crate::core::DecisionContext;
use crate::core::DecisionReason;
use crate::core::EngineConfig;
use crate::core::PermissionId;
use crate::core::PermissionKind;
use crate::core::Username;
use crate::core::is_own_domain;
use crate::interfaces::IdentityStore;
use crate::interfaces::IdentityStoreError;

// ============================================================================
// SECTION: Rules
// ============================================================================

/// One authorization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule<'r> {
    /// Principal holds the administrative role.
    AdminRole,
    /// Principal may execute the administrative function.
    AdminFunction(AdminFunction),
    /// Principal holds the administrative role and owns the named resource.
    AdminInOwnDomain(&'r str),
    /// Principal holds a fine-grained grant.
    Holds(&'r PermissionId, PermissionKind),
}

impl Rule<'_> {
    /// Reason recorded when this rule matches.
    #[must_use]
    pub const fn reason(&self) -> DecisionReason {
        match self {
            Self::AdminRole => DecisionReason::AdminRole,
            Self::AdminFunction(function) => DecisionReason::AdminFunction(*function),
            Self::AdminInOwnDomain(_) => DecisionReason::AdminInOwnDomain,
            Self::Holds(_, kind) => DecisionReason::Grant(*kind),
        }
    }
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Evaluates rules against an identity store.
pub struct PermissionEvaluator<'a, I> {
    /// Identity store consulted for roles and grants.
    identity: &'a I,
    /// Engine configuration.
    config: &'a EngineConfig,
}

impl<'a, I: IdentityStore> PermissionEvaluator<'a, I> {
    /// Creates an evaluator.
    #[must_use]
    pub const fn new(identity: &'a I, config: &'a EngineConfig) -> Self {
        Self {
            identity,
            config,
        }
    }

    /// Returns the reason of the first matching rule, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when a rule cannot be checked.
    pub fn first_match(
        &self,
        ctx: &DecisionContext,
        rules: &[Rule<'_>],
    ) -> Result<Option<DecisionReason>, IdentityStoreError> {
        for rule in rules {
            if self.check(ctx, rule)? {
                return Ok(Some(rule.reason()));
            }
        }
        Ok(None)
    }

    /// Checks a single rule.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the identity store fails.
    pub fn check(&self, ctx: &DecisionContext, rule: &Rule<'_>) -> Result<bool, IdentityStoreError> {
        let principal = ctx.identity_name();
        match rule {
            Rule::AdminRole => self.is_admin(&principal),
            Rule::AdminFunction(function) => self.has_admin_function(&principal, *function),
            Rule::AdminInOwnDomain(resource) => {
                if !is_own_domain(ctx.tenant.domain(), resource, &self.config.super_tenant_domain)
                {
                    return Ok(false);
                }
                self.is_admin(&principal)
            }
            Rule::Holds(permission, kind) => {
                self.identity.is_authorized(&principal, permission, *kind)
            }
        }
    }

    /// Returns true when `username` holds the administrative role.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the role lookup fails.
    pub fn is_admin(&self, username: &Username) -> Result<bool, IdentityStoreError> {
        Ok(self.identity.roles_of_user(username)?.contains(&self.config.admin_role))
    }

    /// Returns true when `username` may execute `function`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the permission check fails.
    pub fn has_admin_function(
        &self,
        username: &Username,
        function: AdminFunction,
    ) -> Result<bool, IdentityStoreError> {
        let permission = self.config.admin_permissions.permission_for(function);
        self.identity.is_authorized(username, permission, PermissionKind::UiExecute)
    }
}
