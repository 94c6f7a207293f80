// crates/broker-gate-core/src/core/decision.rs
// ============================================================================
// Module: Broker Gate Decisions
// Description: Decision requests, resource properties, verdicts, and reasons.
// Purpose: Provide the explicit request/response vocabulary for action handlers.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Every action handler receives an explicit [`DecisionContext`] (principal
//! plus resolved tenant scope) and action-specific resource properties, and
//! returns a [`Decision`]. Resource properties carry broker-internal names;
//! the handlers normalize them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::TenantScope;
use crate::core::identifiers::Username;
use crate::core::policy::AdminFunction;
use crate::core::policy::PermissionKind;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Pre-authenticated principal and its resolved tenant scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionContext {
    /// Principal username as presented by the broker.
    pub username: Username,
    /// Resolved tenant scope for the request.
    pub tenant: TenantScope,
}

impl DecisionContext {
    /// Creates a decision context.
    #[must_use]
    pub fn new(username: impl Into<Username>, tenant: TenantScope) -> Self {
        Self {
            username: username.into(),
            tenant,
        }
    }

    /// Returns the name the identity store knows this principal by.
    ///
    /// Role membership and grant lookups both use this form, so a tenant
    /// principal presented as `name@tenant-domain` resolves to `name`.
    #[must_use]
    pub fn identity_name(&self) -> Username {
        self.username.tenant_aware(&self.tenant)
    }
}

/// Properties of a queue-scoped action (create, consume, delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueProperties {
    /// Internal queue name (`clientId:rawName[;suffix]`).
    pub name: String,
}

impl QueueProperties {
    /// Creates queue properties from an internal name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
        }
    }
}

/// Properties of a bind or unbind action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindProperties {
    /// Exchange name (`<<default>>` for the default exchange).
    pub exchange: String,
    /// Internal queue name.
    pub queue_name: String,
    /// Internal routing key.
    pub routing_key: String,
}

/// Properties of a publish action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishProperties {
    /// Exchange name (`<<default>>` for the default exchange).
    pub exchange: String,
    /// Internal routing key.
    pub routing_key: String,
}

// ============================================================================
// SECTION: Actions
// ============================================================================

/// Broker actions handled by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerAction {
    /// Queue creation.
    CreateQueue,
    /// Queue consumption.
    ConsumeQueue,
    /// Queue binding.
    BindQueue,
    /// Publishing to an exchange.
    PublishToExchange,
    /// Queue unbinding.
    UnbindQueue,
    /// Queue deletion.
    DeleteQueue,
}

impl BrokerAction {
    /// Returns a stable label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateQueue => "create_queue",
            Self::ConsumeQueue => "consume_queue",
            Self::BindQueue => "bind_queue",
            Self::PublishToExchange => "publish_to_exchange",
            Self::UnbindQueue => "unbind_queue",
            Self::DeleteQueue => "delete_queue",
        }
    }
}

impl fmt::Display for BrokerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Verdicts
// ============================================================================

/// Authorization verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The action is permitted.
    Allowed,
    /// The action is refused.
    Denied,
}

impl Verdict {
    /// Returns a stable label for the verdict.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied => "denied",
        }
    }
}

/// Reason attached to a decision.
///
/// # Invariants
/// - Allow reasons name the rule that matched; deny reasons name why no rule
///   could match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Principal holds the administrative role.
    AdminRole,
    /// Principal holds an administrative function permission.
    AdminFunction(AdminFunction),
    /// Principal is an administrator inside its own tenant domain.
    AdminInOwnDomain,
    /// Principal holds a fine-grained grant on the resource.
    Grant(PermissionKind),
    /// Queue is a temporary topic subscriber queue.
    TempSubscriberQueue,
    /// Principal created a new topic through the topic-add function.
    TopicCreator,
    /// Unbind is always permitted at this layer.
    Unbind,
    /// No eligibility rule matched.
    NotEligible,
    /// Resource lies outside the principal's tenant domain.
    ForeignDomain,
    /// Exchange has no authorization path.
    UnknownExchange,
}

impl DecisionReason {
    /// Returns a stable label for audit records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AdminRole => "admin_role",
            Self::AdminFunction(function) => function.as_str(),
            Self::AdminInOwnDomain => "admin_own_domain",
            Self::Grant(kind) => kind.as_str(),
            Self::TempSubscriberQueue => "temp_subscriber_queue",
            Self::TopicCreator => "topic_creator",
            Self::Unbind => "unbind",
            Self::NotEligible => "not_eligible",
            Self::ForeignDomain => "foreign_domain",
            Self::UnknownExchange => "unknown_exchange",
        }
    }
}

/// Decision returned by every action handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Authoritative verdict.
    pub verdict: Verdict,
    /// Reason label for audit logs.
    pub reason: DecisionReason,
}

impl Decision {
    /// Allowed decision with the matching reason.
    #[must_use]
    pub const fn allowed(reason: DecisionReason) -> Self {
        Self {
            verdict: Verdict::Allowed,
            reason,
        }
    }

    /// Denied decision with the refusal reason.
    #[must_use]
    pub const fn denied(reason: DecisionReason) -> Self {
        Self {
            verdict: Verdict::Denied,
            reason,
        }
    }

    /// Returns true when the verdict is [`Verdict::Allowed`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self.verdict, Verdict::Allowed)
    }
}
