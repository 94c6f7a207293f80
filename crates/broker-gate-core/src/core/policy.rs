// crates/broker-gate-core/src/core/policy.rs
// ============================================================================
// Module: Broker Gate Policy Vocabulary
// Description: Permission kinds, administrative functions, and engine settings.
// Purpose: Centralize the well-known names the engine matches against.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Policy vocabulary shared by the evaluator, provisioner, and action
//! handlers. [`EngineConfig`] carries every deployment-tunable name; its
//! defaults reproduce the names the identity store already holds for
//! existing broker deployments.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::PermissionId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Role name prefix for queue-owner roles.
pub const QUEUE_ROLE_PREFIX: &str = "Q_";
/// Role name prefix for topic roles.
pub const TOPIC_ROLE_PREFIX: &str = "T_";
/// Encoded sentinel the broker uses for the default exchange.
pub const DEFAULT_EXCHANGE_SENTINEL: &str = "<<default>>";
/// Canonical name the default exchange sentinel normalizes to.
pub const DEFAULT_EXCHANGE_NAME: &str = "default";

// ============================================================================
// SECTION: Permission Kinds
// ============================================================================

/// Permission kinds understood by the identity store.
///
/// # Invariants
/// - `as_str` values are literal identity-store keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PermissionKind {
    /// Consume messages from a queue.
    #[serde(rename = "consume")]
    Consume,
    /// Publish messages to a queue or topic.
    #[serde(rename = "publish")]
    Publish,
    /// Subscribe to a topic.
    #[serde(rename = "subscribe")]
    Subscribe,
    /// Change permissions of the resource.
    #[serde(rename = "changePermission")]
    ChangePermission,
    /// Execute an administrative UI function (admin-function checks only).
    #[serde(rename = "ui.execute")]
    UiExecute,
}

impl PermissionKind {
    /// Returns the identity-store label for the permission kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Consume => "consume",
            Self::Publish => "publish",
            Self::Subscribe => "subscribe",
            Self::ChangePermission => "changePermission",
            Self::UiExecute => "ui.execute",
        }
    }
}

// ============================================================================
// SECTION: Administrative Functions
// ============================================================================

/// Administrative functions guarded by a coarse permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminFunction {
    /// Add queues.
    QueueAdd,
    /// Browse queues.
    QueueBrowse,
    /// Delete queues.
    QueueDelete,
    /// Add topics.
    TopicAdd,
    /// Delete topics.
    TopicDelete,
    /// Browse the dead letter channel.
    DlcBrowse,
}

impl AdminFunction {
    /// Returns a stable label for audit records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueueAdd => "queue_add",
            Self::QueueBrowse => "queue_browse",
            Self::QueueDelete => "queue_delete",
            Self::TopicAdd => "topic_add",
            Self::TopicDelete => "topic_delete",
            Self::DlcBrowse => "dlc_browse",
        }
    }
}

/// Permission identifiers for each administrative function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPermissions {
    /// Permission for [`AdminFunction::QueueAdd`].
    pub queue_add: PermissionId,
    /// Permission for [`AdminFunction::QueueBrowse`].
    pub queue_browse: PermissionId,
    /// Permission for [`AdminFunction::QueueDelete`].
    pub queue_delete: PermissionId,
    /// Permission for [`AdminFunction::TopicAdd`].
    pub topic_add: PermissionId,
    /// Permission for [`AdminFunction::TopicDelete`].
    pub topic_delete: PermissionId,
    /// Permission for [`AdminFunction::DlcBrowse`].
    pub dlc_browse: PermissionId,
}

impl AdminPermissions {
    /// Returns the permission identifier guarding `function`.
    #[must_use]
    pub const fn permission_for(&self, function: AdminFunction) -> &PermissionId {
        match function {
            AdminFunction::QueueAdd => &self.queue_add,
            AdminFunction::QueueBrowse => &self.queue_browse,
            AdminFunction::QueueDelete => &self.queue_delete,
            AdminFunction::TopicAdd => &self.topic_add,
            AdminFunction::TopicDelete => &self.topic_delete,
            AdminFunction::DlcBrowse => &self.dlc_browse,
        }
    }
}

impl Default for AdminPermissions {
    fn default() -> Self {
        Self {
            queue_add: PermissionId::new("/permission/admin/manage/queue/addQueue"),
            queue_browse: PermissionId::new("/permission/admin/manage/queue/browseQueue"),
            queue_delete: PermissionId::new("/permission/admin/manage/queue/deleteQueue"),
            topic_add: PermissionId::new("/permission/admin/manage/topic/addTopic"),
            topic_delete: PermissionId::new("/permission/admin/manage/topic/deleteTopic"),
            dlc_browse: PermissionId::new("/permission/admin/manage/dlc/browseDlc"),
        }
    }
}

// ============================================================================
// SECTION: Exchanges
// ============================================================================

/// Exchange classification used for bind and publish dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeKind {
    /// The default exchange.
    Default,
    /// The direct exchange.
    Direct,
    /// The topic exchange.
    Topic,
    /// Any other exchange; never authorized.
    Unknown(String),
}

/// Well-known exchange names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeNames {
    /// Normalized default exchange name.
    pub default: String,
    /// Direct exchange name.
    pub direct: String,
    /// Topic exchange name.
    pub topic: String,
}

impl ExchangeNames {
    /// Classifies a normalized exchange name.
    #[must_use]
    pub fn classify(&self, name: &str) -> ExchangeKind {
        if name == self.default {
            ExchangeKind::Default
        } else if name == self.direct {
            ExchangeKind::Direct
        } else if name == self.topic {
            ExchangeKind::Topic
        } else {
            ExchangeKind::Unknown(name.to_string())
        }
    }
}

impl Default for ExchangeNames {
    fn default() -> Self {
        Self {
            default: DEFAULT_EXCHANGE_NAME.to_string(),
            direct: "amq.direct".to_string(),
            topic: "amq.topic".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Configuration for the authorization engine.
///
/// # Invariants
/// - `queue_permission_prefix != topic_permission_prefix`.
/// - `internal_role_domain` contains no `/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Role that grants global administrative override.
    pub admin_role: String,
    /// Domain of the default/super tenant.
    pub super_tenant_domain: String,
    /// Role domain that provisioned roles are created in.
    pub internal_role_domain: String,
    /// Raw-name prefix marking temporary topic subscriber queues.
    pub temp_queue_prefix: String,
    /// Prefix of queue permission identifiers.
    pub queue_permission_prefix: String,
    /// Prefix of topic permission identifiers.
    pub topic_permission_prefix: String,
    /// Well-known exchange names.
    pub exchanges: ExchangeNames,
    /// Administrative function permissions.
    pub admin_permissions: AdminPermissions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin_role: "admin".to_string(),
            super_tenant_domain: "carbon.super".to_string(),
            internal_role_domain: "Internal".to_string(),
            temp_queue_prefix: "tmp_".to_string(),
            queue_permission_prefix: "event/queue/".to_string(),
            topic_permission_prefix: "event/topic/".to_string(),
            exchanges: ExchangeNames::default(),
            admin_permissions: AdminPermissions::default(),
        }
    }
}
