// crates/broker-gate-core/src/core/mod.rs
// ============================================================================
// Module: Broker Gate Core Types
// Description: Identifiers, naming rules, ownership, and decision vocabulary.
// Purpose: Provide pure, collaborator-free building blocks for the engine.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types never call collaborators. Everything here is a pure function of
//! its inputs and the [`EngineConfig`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod decision;
pub mod domain;
pub mod identifiers;
pub mod names;
pub mod policy;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use decision::BindProperties;
pub use decision::BrokerAction;
pub use decision::Decision;
pub use decision::DecisionContext;
pub use decision::DecisionReason;
pub use decision::PublishProperties;
pub use decision::QueueProperties;
pub use decision::Verdict;
pub use domain::is_own_domain;
pub use identifiers::PermissionId;
pub use identifiers::RoleName;
pub use identifiers::TenantDomain;
pub use identifiers::TenantId;
pub use identifiers::TenantScope;
pub use identifiers::Username;
pub use names::NameError;
pub use names::NameScheme;
pub use names::QueueName;
pub use names::TopicName;
pub use policy::AdminFunction;
pub use policy::AdminPermissions;
pub use policy::EngineConfig;
pub use policy::ExchangeKind;
pub use policy::ExchangeNames;
pub use policy::PermissionKind;
