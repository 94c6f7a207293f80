// crates/broker-gate-core/src/runtime/provisioner.rs
// ============================================================================
// Module: Broker Gate Role Provisioner
// Description: Idempotent creation and removal of per-resource roles.
// Purpose: Back future decisions with fine-grained grants after allowed actions.
// Dependencies: crate::{core, interfaces, runtime::audit}
// ============================================================================

//! ## Overview
//! Allowed mutating actions provision roles in the identity store:
//! - queue-owner roles (`Q_`) with the creating principal as sole member;
//! - topic roles (`T_`) shared by every subscriber of the topic.
//!
//! ## Invariants
//! - Provisioning is idempotent: role creation is guarded by an existence
//!   check, membership by an exact-name check, and grants may be repeated.
//! - An existing owner role is never modified ("first creator wins").
//! - Concurrent duplicate creation relies on the identity store rejecting the
//!   second `create_role`; that rejection propagates as an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::DecisionContext;
use crate::core::NameScheme;
use crate::core::PermissionId;
use crate::core::PermissionKind;
use crate::core::QueueName;
use crate::core::RoleName;
use crate::core::TopicName;
use crate::interfaces::IdentityStore;
use crate::interfaces::IdentityStoreError;
use crate::runtime::audit::AuditSink;
use crate::runtime::audit::ProvisioningAuditEvent;
use crate::runtime::audit::ProvisioningOutcome;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Grants held by a queue-owner role on its queue, in grant order.
pub const QUEUE_OWNER_GRANTS: [PermissionKind; 3] =
    [PermissionKind::ChangePermission, PermissionKind::Consume, PermissionKind::Publish];
/// Grants held by a topic role on its topic, in grant order.
pub const TOPIC_GRANTS: [PermissionKind; 3] =
    [PermissionKind::Subscribe, PermissionKind::Publish, PermissionKind::ChangePermission];
/// Grants held by a topic role on its temporary subscriber queue, in grant order.
pub const TEMP_QUEUE_GRANTS: [PermissionKind; 3] =
    [PermissionKind::Consume, PermissionKind::Publish, PermissionKind::ChangePermission];

// ============================================================================
// SECTION: Provisioner
// ============================================================================

/// Creates, augments, and removes per-resource roles.
pub struct RoleProvisioner<'a, I> {
    /// Identity store receiving role writes.
    identity: &'a I,
    /// Name scheme for role and permission keys.
    names: NameScheme<'a>,
    /// Audit sink for provisioning events.
    audit: &'a dyn AuditSink,
}

impl<'a, I: IdentityStore> RoleProvisioner<'a, I> {
    /// Creates a provisioner.
    #[must_use]
    pub const fn new(identity: &'a I, names: NameScheme<'a>, audit: &'a dyn AuditSink) -> Self {
        Self {
            identity,
            names,
            audit,
        }
    }

    /// Provisions the owner role for `queue` with the principal as sole member.
    ///
    /// Returns the owner role name. When the role already exists nothing is
    /// changed and a warning event is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when a role write fails.
    pub fn provision_queue_owner(
        &self,
        ctx: &DecisionContext,
        queue: &QueueName,
    ) -> Result<RoleName, IdentityStoreError> {
        let role = self.names.queue_owner_role(queue);
        if self.identity.role_exists(&role)? {
            self.emit(&role, Some(ctx), ProvisioningOutcome::RoleExistsSkipped);
            return Ok(role);
        }
        let member = ctx.identity_name();
        self.identity.create_role(&role, &[member])?;
        self.emit(&role, Some(ctx), ProvisioningOutcome::RoleCreated);
        let queue_id = self.names.queue_permission_id(queue);
        self.grant_all(&role, &queue_id, &QUEUE_OWNER_GRANTS)?;
        self.emit(&role, Some(ctx), ProvisioningOutcome::GrantsAsserted);
        Ok(role)
    }

    /// Provisions or refreshes the topic role and adds the principal to it.
    ///
    /// Grants on the topic and on the temporary subscriber queue are always
    /// re-asserted.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when a role write fails.
    pub fn provision_topic_subscriber(
        &self,
        ctx: &DecisionContext,
        topic: &TopicName,
        temp_queue: &QueueName,
    ) -> Result<RoleName, IdentityStoreError> {
        let role = self.names.topic_role(topic);
        let member = ctx.identity_name();
        if !self.identity.role_exists(&role)? {
            self.identity.create_role(&role, std::slice::from_ref(&member))?;
            self.emit(&role, Some(ctx), ProvisioningOutcome::RoleCreated);
        }
        if !self.identity.members_of_role(&role)?.contains(&member) {
            self.identity.add_members_to_role(&role, std::slice::from_ref(&member))?;
            self.emit(&role, Some(ctx), ProvisioningOutcome::MemberAdded);
        }
        let topic_id = self.names.topic_permission_id(topic);
        self.grant_all(&role, &topic_id, &TOPIC_GRANTS)?;
        let temp_queue_id = self.names.queue_permission_id(temp_queue);
        self.grant_all(&role, &temp_queue_id, &TEMP_QUEUE_GRANTS)?;
        self.emit(&role, Some(ctx), ProvisioningOutcome::GrantsAsserted);
        Ok(role)
    }

    /// Deletes the owner role for `queue` when it exists.
    ///
    /// Returns true when a role was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the lookup or delete fails.
    pub fn deprovision_queue_owner(&self, queue: &QueueName) -> Result<bool, IdentityStoreError> {
        let role = self.names.queue_owner_role(queue);
        if !self.identity.role_exists(&role)? {
            self.emit(&role, None, ProvisioningOutcome::RoleAbsent);
            return Ok(false);
        }
        self.identity.delete_role(&role)?;
        self.emit(&role, None, ProvisioningOutcome::RoleDeleted);
        Ok(true)
    }

    /// Grants every kind in `kinds` on `permission` to `role`.
    fn grant_all(
        &self,
        role: &RoleName,
        permission: &PermissionId,
        kinds: &[PermissionKind],
    ) -> Result<(), IdentityStoreError> {
        for kind in kinds {
            self.identity.grant_permission(role, permission, *kind)?;
        }
        Ok(())
    }

    /// Records a provisioning audit event.
    fn emit(&self, role: &RoleName, ctx: Option<&DecisionContext>, outcome: ProvisioningOutcome) {
        let username = ctx.map(|ctx| ctx.username.as_str());
        self.audit.record_provisioning(&ProvisioningAuditEvent::new(role, username, outcome));
    }
}
