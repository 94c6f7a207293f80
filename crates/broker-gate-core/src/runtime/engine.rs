// crates/broker-gate-core/src/runtime/engine.rs
// ============================================================================
// Module: Broker Gate Authorization Engine
// Description: Action handlers for broker authorization checkpoints.
// Purpose: Turn broker actions into verdicts plus role and registry side effects.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`AuthorizationEngine`] is the single entry point brokers call at each
//! authorization checkpoint. It is stateless apart from its configuration and
//! injected collaborators, so concurrent decisions need no locking.
//!
//! ## Invariants
//! - Resource names are normalized before any rule is evaluated; malformed
//!   names are errors regardless of the principal.
//! - Registry and role side effects happen only on an allowed verdict.
//! - Collaborator failures surface as [`AuthzError::Backend`] and are never
//!   converted into a denial.
//!
//! Security posture: denial is the default when no rule matches.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::AdminFunction;
use crate::core::BindProperties;
use crate::core::BrokerAction;
use crate::core::Decision;
use crate::core::DecisionContext;
use crate::core::DecisionReason;
use crate::core::EngineConfig;
use crate::core::ExchangeKind;
use crate::core::NameError;
use crate::core::NameScheme;
use crate::core::PermissionKind;
use crate::core::PublishProperties;
use crate::core::QueueName;
use crate::core::QueueProperties;
use crate::core::TopicName;
use crate::core::is_own_domain;
use crate::core::names::raw_exchange_name;
use crate::core::names::raw_routing_key;
use crate::interfaces::IdentityStore;
use crate::interfaces::IdentityStoreError;
use crate::interfaces::MetadataRegistry;
use crate::interfaces::RegistryError;
use crate::runtime::audit::AuditSink;
use crate::runtime::audit::DecisionAuditEvent;
use crate::runtime::audit::DecisionAuditEventParams;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::evaluator::PermissionEvaluator;
use crate::runtime::evaluator::Rule;
use crate::runtime::provisioner::RoleProvisioner;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Collaborator failures.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Identity store failure.
    #[error(transparent)]
    Identity(#[from] IdentityStoreError),
    /// Metadata registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Engine-level errors returned by every action handler.
///
/// # Invariants
/// - An error is never a verdict; callers decide how to treat it.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A collaborator failed while evaluating or provisioning.
    #[error("error handling {action}: {source}")]
    Backend {
        /// Action being handled.
        action: BrokerAction,
        /// Underlying collaborator failure.
        #[source]
        source: BackendError,
    },
    /// A resource name violates the `clientId:rawName` encoding.
    #[error("error handling {action}: {source}")]
    MalformedName {
        /// Action being handled.
        action: BrokerAction,
        /// Underlying naming failure.
        #[source]
        source: NameError,
    },
}

impl AuthzError {
    /// Returns the action that failed.
    #[must_use]
    pub const fn action(&self) -> BrokerAction {
        match self {
            Self::Backend {
                action, ..
            }
            | Self::MalformedName {
                action, ..
            } => *action,
        }
    }

    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Backend {
                source: BackendError::Identity(_),
                ..
            } => "identity_store",
            Self::Backend {
                source: BackendError::Registry(_),
                ..
            } => "metadata_registry",
            Self::MalformedName {
                ..
            } => "malformed_resource_name",
        }
    }
}

/// Handler failure before the action label is attached.
#[derive(Debug, Error)]
enum Failure {
    /// Collaborator failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Naming failure.
    #[error(transparent)]
    Name(#[from] NameError),
}

impl From<IdentityStoreError> for Failure {
    fn from(err: IdentityStoreError) -> Self {
        Self::Backend(BackendError::Identity(err))
    }
}

impl From<RegistryError> for Failure {
    fn from(err: RegistryError) -> Self {
        Self::Backend(BackendError::Registry(err))
    }
}

impl Failure {
    /// Attaches the action label.
    fn into_authz(self, action: BrokerAction) -> AuthzError {
        match self {
            Self::Backend(source) => AuthzError::Backend {
                action,
                source,
            },
            Self::Name(source) => AuthzError::MalformedName {
                action,
                source,
            },
        }
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Authorization decision engine for broker actions.
pub struct AuthorizationEngine<I, R> {
    /// Identity store implementation.
    identity: I,
    /// Metadata registry implementation.
    registry: R,
    /// Engine configuration.
    config: EngineConfig,
    /// Audit sink for decisions and provisioning.
    audit: Arc<dyn AuditSink>,
}

impl<I, R> AuthorizationEngine<I, R>
where
    I: IdentityStore,
    R: MetadataRegistry,
{
    /// Creates an engine with a no-op audit sink.
    #[must_use]
    pub fn new(identity: I, registry: R, config: EngineConfig) -> Self {
        Self {
            identity,
            registry,
            config,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the identity store.
    #[must_use]
    pub const fn identity(&self) -> &I {
        &self.identity
    }

    /// Returns the metadata registry.
    #[must_use]
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Authorizes queue creation.
    ///
    /// Eligible principals hold the admin role or the queue-add or topic-add
    /// function. Temporary subscriber queues are recorded without an owner
    /// role; other queues must lie in the principal's own domain and get an
    /// owner role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError`] when the queue name is malformed or a
    /// collaborator fails.
    pub fn create_queue(
        &self,
        ctx: &DecisionContext,
        properties: &QueueProperties,
    ) -> Result<Decision, AuthzError> {
        let result = self.decide_create_queue(ctx, properties);
        self.finish(BrokerAction::CreateQueue, Some(ctx), &properties.name, result)
    }

    /// Authorizes queue consumption.
    ///
    /// Admin-function membership only makes a principal eligible; the
    /// verdict additionally requires admin rights in the own domain or an
    /// explicit consume grant.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError`] when the queue name is malformed or a
    /// collaborator fails.
    pub fn consume_queue(
        &self,
        ctx: &DecisionContext,
        properties: &QueueProperties,
    ) -> Result<Decision, AuthzError> {
        let result = self.decide_consume_queue(ctx, properties);
        self.finish(BrokerAction::ConsumeQueue, Some(ctx), &properties.name, result)
    }

    /// Authorizes binding a queue to an exchange.
    ///
    /// Topic-exchange binds record the subscription and may provision the
    /// topic role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError`] when the queue name is malformed or a
    /// collaborator fails.
    pub fn bind_queue(
        &self,
        ctx: &DecisionContext,
        properties: &BindProperties,
    ) -> Result<Decision, AuthzError> {
        let result = self.decide_bind_queue(ctx, properties);
        self.finish(BrokerAction::BindQueue, Some(ctx), &bind_resource(properties), result)
    }

    /// Authorizes publishing to an exchange. Never provisions.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError`] when a collaborator fails.
    pub fn publish_to_exchange(
        &self,
        ctx: &DecisionContext,
        properties: &PublishProperties,
    ) -> Result<Decision, AuthzError> {
        let resource = format!(
            "exchange={} routing_key={}",
            properties.exchange, properties.routing_key
        );
        let result = self.decide_publish(ctx, properties);
        self.finish(BrokerAction::PublishToExchange, Some(ctx), &resource, result)
    }

    /// Handles unbinding; always allowed at this layer.
    ///
    /// Unbind authorization is enforced upstream by queue ownership. Topic
    /// unbinds remove the subscription record.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError`] when the queue name is malformed or the
    /// registry fails.
    pub fn unbind_queue(&self, properties: &BindProperties) -> Result<Decision, AuthzError> {
        let result = self.decide_unbind(properties);
        self.finish(BrokerAction::UnbindQueue, None, &bind_resource(properties), result)
    }

    /// Authorizes queue deletion and tears down the owner role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError`] when the queue name is malformed or a
    /// collaborator fails.
    pub fn delete_queue(
        &self,
        ctx: &DecisionContext,
        properties: &QueueProperties,
    ) -> Result<Decision, AuthzError> {
        let result = self.decide_delete_queue(ctx, properties);
        self.finish(BrokerAction::DeleteQueue, Some(ctx), &properties.name, result)
    }

    // ------------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------------

    /// Create-queue decision.
    fn decide_create_queue(
        &self,
        ctx: &DecisionContext,
        properties: &QueueProperties,
    ) -> Result<Decision, Failure> {
        let queue = QueueName::from_internal(&properties.name)?;
        let eligible = self.evaluator().first_match(
            ctx,
            &[
                Rule::AdminRole,
                Rule::AdminFunction(AdminFunction::QueueAdd),
                Rule::AdminFunction(AdminFunction::TopicAdd),
            ],
        )?;
        let Some(reason) = eligible else {
            return Ok(Decision::denied(DecisionReason::NotEligible));
        };
        // The registry record is written for every eligible creator, even when
        // the queue turns out to live in a foreign domain.
        self.registry.create_queue_record(&queue.registry_name(), &ctx.username)?;
        if self.names().is_temp_subscriber_queue(&queue) {
            return Ok(Decision::allowed(DecisionReason::TempSubscriberQueue));
        }
        if !self.owns(ctx, queue.raw()) {
            return Ok(Decision::denied(DecisionReason::ForeignDomain));
        }
        self.provisioner().provision_queue_owner(ctx, &queue)?;
        Ok(Decision::allowed(reason))
    }

    /// Consume-queue decision.
    fn decide_consume_queue(
        &self,
        ctx: &DecisionContext,
        properties: &QueueProperties,
    ) -> Result<Decision, Failure> {
        let queue = QueueName::from_internal(&properties.name)?;
        let eligible = self.evaluator().first_match(
            ctx,
            &[
                Rule::AdminRole,
                Rule::AdminFunction(AdminFunction::QueueBrowse),
                Rule::AdminFunction(AdminFunction::DlcBrowse),
            ],
        )?;
        if eligible.is_none() {
            return Ok(Decision::denied(DecisionReason::NotEligible));
        }
        Ok(self.queue_access(ctx, &queue, PermissionKind::Consume)?)
    }

    /// Bind-queue decision.
    fn decide_bind_queue(
        &self,
        ctx: &DecisionContext,
        properties: &BindProperties,
    ) -> Result<Decision, Failure> {
        let queue = QueueName::from_internal(&properties.queue_name)?;
        match self.exchange_kind(&properties.exchange) {
            ExchangeKind::Default => {
                if self.names().is_temp_subscriber_queue(&queue) {
                    return Ok(Decision::allowed(DecisionReason::TempSubscriberQueue));
                }
                Ok(self.queue_access(ctx, &queue, PermissionKind::Consume)?)
            }
            ExchangeKind::Direct => Ok(self.queue_access(ctx, &queue, PermissionKind::Consume)?),
            ExchangeKind::Topic => {
                let topic = TopicName::from_routing_key(&properties.routing_key);
                self.bind_topic(ctx, &topic, &queue)
            }
            ExchangeKind::Unknown(_) => Ok(Decision::denied(DecisionReason::UnknownExchange)),
        }
    }

    /// Topic-exchange bind: topic creation, own-domain admin, or subscriber.
    fn bind_topic(
        &self,
        ctx: &DecisionContext,
        topic: &TopicName,
        queue: &QueueName,
    ) -> Result<Decision, Failure> {
        let names = self.names();
        let evaluator = self.evaluator();
        let role = names.topic_role(topic);
        if !self.identity.role_exists(&role)?
            && evaluator.has_admin_function(&ctx.identity_name(), AdminFunction::TopicAdd)?
        {
            self.record_subscription(ctx, topic, queue)?;
            self.provisioner().provision_topic_subscriber(ctx, topic, queue)?;
            return Ok(Decision::allowed(DecisionReason::TopicCreator));
        }
        if evaluator.check(ctx, &Rule::AdminInOwnDomain(queue.raw()))? {
            self.record_subscription(ctx, topic, queue)?;
            return Ok(Decision::allowed(DecisionReason::AdminInOwnDomain));
        }
        let topic_id = names.topic_permission_id(topic);
        let subscriber = Rule::Holds(&topic_id, PermissionKind::Subscribe);
        if evaluator.check(ctx, &subscriber)? {
            self.record_subscription(ctx, topic, queue)?;
            self.provisioner().provision_topic_subscriber(ctx, topic, queue)?;
            return Ok(Decision::allowed(subscriber.reason()));
        }
        Ok(Decision::denied(DecisionReason::NotEligible))
    }

    /// Publish decision.
    fn decide_publish(
        &self,
        ctx: &DecisionContext,
        properties: &PublishProperties,
    ) -> Result<Decision, Failure> {
        match self.exchange_kind(&properties.exchange) {
            ExchangeKind::Default | ExchangeKind::Direct => {
                let queue = QueueName::from_raw(raw_routing_key(&properties.routing_key));
                Ok(self.queue_access(ctx, &queue, PermissionKind::Publish)?)
            }
            ExchangeKind::Topic => {
                let topic = TopicName::from_routing_key(&properties.routing_key);
                let topic_id = self.names().topic_permission_id(&topic);
                Ok(self.decide(ctx, &[
                    Rule::AdminRole,
                    Rule::Holds(&topic_id, PermissionKind::Publish),
                ])?)
            }
            ExchangeKind::Unknown(_) => Ok(Decision::denied(DecisionReason::UnknownExchange)),
        }
    }

    /// Unbind handling.
    fn decide_unbind(&self, properties: &BindProperties) -> Result<Decision, Failure> {
        let queue = QueueName::from_internal(&properties.queue_name)?;
        if self.exchange_kind(&properties.exchange) == ExchangeKind::Topic {
            let topic = TopicName::from_routing_key(&properties.routing_key);
            self.registry
                .delete_subscription_record(&topic.registry_name(), &queue.registry_name())?;
        }
        Ok(Decision::allowed(DecisionReason::Unbind))
    }

    /// Delete-queue decision.
    fn decide_delete_queue(
        &self,
        ctx: &DecisionContext,
        properties: &QueueProperties,
    ) -> Result<Decision, Failure> {
        let queue = QueueName::from_internal(&properties.name)?;
        let eligible = self.evaluator().first_match(
            ctx,
            &[
                Rule::AdminRole,
                Rule::AdminFunction(AdminFunction::QueueDelete),
                Rule::AdminFunction(AdminFunction::TopicDelete),
            ],
        )?;
        let Some(reason) = eligible else {
            return Ok(Decision::denied(DecisionReason::NotEligible));
        };
        self.registry.delete_queue_record(&queue.registry_name())?;
        if self.names().is_temp_subscriber_queue(&queue) {
            return Ok(Decision::allowed(DecisionReason::TempSubscriberQueue));
        }
        self.provisioner().deprovision_queue_owner(&queue)?;
        Ok(Decision::allowed(reason))
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Own-domain admin or explicit grant of `kind` on the queue.
    fn queue_access(
        &self,
        ctx: &DecisionContext,
        queue: &QueueName,
        kind: PermissionKind,
    ) -> Result<Decision, IdentityStoreError> {
        let queue_id = self.names().queue_permission_id(queue);
        self.decide(ctx, &[Rule::AdminInOwnDomain(queue.raw()), Rule::Holds(&queue_id, kind)])
    }

    /// Allows on the first matching rule, denies otherwise.
    fn decide(
        &self,
        ctx: &DecisionContext,
        rules: &[Rule<'_>],
    ) -> Result<Decision, IdentityStoreError> {
        Ok(self
            .evaluator()
            .first_match(ctx, rules)?
            .map_or(Decision::denied(DecisionReason::NotEligible), Decision::allowed))
    }

    /// Records a topic subscription in the registry.
    fn record_subscription(
        &self,
        ctx: &DecisionContext,
        topic: &TopicName,
        queue: &QueueName,
    ) -> Result<(), RegistryError> {
        self.registry.create_subscription_record(
            &topic.registry_name(),
            &queue.registry_name(),
            &ctx.username,
        )
    }

    /// Returns true when the principal's tenant owns `resource`.
    fn owns(&self, ctx: &DecisionContext, resource: &str) -> bool {
        is_own_domain(ctx.tenant.domain(), resource, &self.config.super_tenant_domain)
    }

    /// Classifies an exchange name as presented by the broker.
    fn exchange_kind(&self, exchange: &str) -> ExchangeKind {
        self.config.exchanges.classify(raw_exchange_name(exchange))
    }

    /// Name scheme bound to the engine configuration.
    const fn names(&self) -> NameScheme<'_> {
        NameScheme::new(&self.config)
    }

    /// Permission evaluator bound to the identity store.
    const fn evaluator(&self) -> PermissionEvaluator<'_, I> {
        PermissionEvaluator::new(&self.identity, &self.config)
    }

    /// Role provisioner bound to the identity store and audit sink.
    fn provisioner(&self) -> RoleProvisioner<'_, I> {
        RoleProvisioner::new(&self.identity, self.names(), self.audit.as_ref())
    }

    /// Attaches the action to failures and records the audit event.
    fn finish(
        &self,
        action: BrokerAction,
        ctx: Option<&DecisionContext>,
        resource: &str,
        result: Result<Decision, Failure>,
    ) -> Result<Decision, AuthzError> {
        let result = result.map_err(|failure| failure.into_authz(action));
        let (verdict, reason, error_kind) = match &result {
            Ok(decision) => (Some(decision.verdict), Some(decision.reason.as_str()), None),
            Err(err) => (None, None, Some(err.kind())),
        };
        self.audit.record_decision(&DecisionAuditEvent::new(DecisionAuditEventParams {
            action,
            username: ctx.map(|ctx| ctx.username.as_str().to_string()),
            tenant_domain: ctx
                .and_then(|ctx| ctx.tenant.domain())
                .map(|domain| domain.as_str().to_string()),
            resource: resource.to_string(),
            verdict,
            reason,
            error_kind,
        }));
        result
    }
}

/// Audit resource label for bind and unbind properties.
fn bind_resource(properties: &BindProperties) -> String {
    format!(
        "exchange={} queue={} routing_key={}",
        properties.exchange, properties.queue_name, properties.routing_key
    )
}
