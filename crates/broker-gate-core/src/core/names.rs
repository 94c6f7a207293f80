// crates/broker-gate-core/src/core/names.rs
// ============================================================================
// Module: Broker Gate Name Normalizer
// Description: Raw-name extraction and identity-store key derivation.
// Purpose: Map broker-internal resource names onto stable registry and role keys.
// Dependencies: crate::core::{identifiers, policy}, thiserror
// ============================================================================

//! ## Overview
//! Brokers encode queue names as `clientId:rawName`, optionally followed by
//! `;suffix` for durable queues, and the default exchange as `<<default>>`.
//! This module strips those encodings and derives the registry-safe names,
//! role names, and permission identifiers used by the collaborators.
//!
//! ## Invariants
//! - Registry names rewrite every `@` to `_`.
//! - Role names additionally rewrite every `/` to `-` and carry the `Q_` or
//!   `T_` prefix. These rewrites are identity-store keys and never change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::identifiers::PermissionId;
use crate::core::identifiers::RoleName;
use crate::core::policy::DEFAULT_EXCHANGE_NAME;
use crate::core::policy::DEFAULT_EXCHANGE_SENTINEL;
use crate::core::policy::EngineConfig;
use crate::core::policy::QUEUE_ROLE_PREFIX;
use crate::core::policy::TOPIC_ROLE_PREFIX;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Malformed broker-internal resource names.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Internal queue name lacks the `clientId:` qualifier.
    #[error("queue name is not client-qualified: {0}")]
    MissingClientId(String),
    /// Internal queue name has an empty raw part.
    #[error("queue name has an empty raw name: {0}")]
    EmptyRawName(String),
}

// ============================================================================
// SECTION: Raw Name Extraction
// ============================================================================

/// Extracts the raw queue name from an internal queue name.
///
/// # Errors
///
/// Returns [`NameError`] when the name is not `clientId:rawName` encoded or
/// the raw part is empty.
pub fn raw_queue_name(internal: &str) -> Result<&str, NameError> {
    let unsuffixed = internal.split_once(';').map_or(internal, |(head, _)| head);
    let (_, raw) = unsuffixed
        .split_once(':')
        .ok_or_else(|| NameError::MissingClientId(internal.to_string()))?;
    if raw.is_empty() {
        return Err(NameError::EmptyRawName(internal.to_string()));
    }
    Ok(raw)
}

/// Extracts the raw routing key from an internal routing key.
///
/// Routing keys are never durable-suffixed; keys without a client qualifier
/// are returned unchanged.
#[must_use]
pub fn raw_routing_key(internal: &str) -> &str {
    internal.split_once(':').map_or(internal, |(_, raw)| raw)
}

/// Maps the default exchange sentinel onto its canonical name.
#[must_use]
pub fn raw_exchange_name(name: &str) -> &str {
    if name == DEFAULT_EXCHANGE_SENTINEL { DEFAULT_EXCHANGE_NAME } else { name }
}

/// Rewrites a raw name into its registry-safe form (`@` becomes `_`).
#[must_use]
pub fn registry_safe(raw: &str) -> String {
    raw.replace('@', "_")
}

/// Rewrites a raw name into its role-safe form (`@` becomes `_`, `/` becomes `-`).
#[must_use]
pub fn role_safe(raw: &str) -> String {
    registry_safe(raw).replace('/', "-")
}

// ============================================================================
// SECTION: Resource Names
// ============================================================================

/// Raw queue name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueName(String);

impl QueueName {
    /// Parses an internal `clientId:rawName[;suffix]` queue name.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] when the internal name is malformed.
    pub fn from_internal(internal: &str) -> Result<Self, NameError> {
        raw_queue_name(internal).map(|raw| Self(raw.to_string()))
    }

    /// Wraps an already raw queue name (for example a direct routing key).
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw name.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Returns the registry-safe name.
    #[must_use]
    pub fn registry_name(&self) -> String {
        registry_safe(&self.0)
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw topic name (the raw routing key bound to the topic exchange).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicName(String);

impl TopicName {
    /// Parses an internal routing key.
    #[must_use]
    pub fn from_routing_key(internal: &str) -> Self {
        Self(raw_routing_key(internal).to_string())
    }

    /// Returns the raw name.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Returns the registry-safe name.
    #[must_use]
    pub fn registry_name(&self) -> String {
        registry_safe(&self.0)
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Key Derivation
// ============================================================================

/// Derives identity-store keys for resources under an engine configuration.
#[derive(Debug, Clone, Copy)]
pub struct NameScheme<'a> {
    /// Engine configuration supplying prefixes and domains.
    config: &'a EngineConfig,
}

impl<'a> NameScheme<'a> {
    /// Creates a name scheme for the configuration.
    #[must_use]
    pub const fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns true when the queue is a temporary topic subscriber queue.
    #[must_use]
    pub fn is_temp_subscriber_queue(&self, queue: &QueueName) -> bool {
        queue.raw().starts_with(&self.config.temp_queue_prefix)
    }

    /// Permission identifier for a queue.
    #[must_use]
    pub fn queue_permission_id(&self, queue: &QueueName) -> PermissionId {
        PermissionId::new(format!("{}{}", self.config.queue_permission_prefix, queue.raw()))
    }

    /// Permission identifier for a topic; `.` hierarchy separators become `/`.
    #[must_use]
    pub fn topic_permission_id(&self, topic: &TopicName) -> PermissionId {
        PermissionId::new(format!(
            "{}{}",
            self.config.topic_permission_prefix,
            topic.raw().replace('.', "/")
        ))
    }

    /// Owner role for a queue (`<domain>/Q_<role-safe name>`).
    #[must_use]
    pub fn queue_owner_role(&self, queue: &QueueName) -> RoleName {
        RoleName::qualified(
            &self.config.internal_role_domain,
            &format!("{QUEUE_ROLE_PREFIX}{}", role_safe(queue.raw())),
        )
    }

    /// Role for a topic (`<domain>/T_<role-safe name>`).
    #[must_use]
    pub fn topic_role(&self, topic: &TopicName) -> RoleName {
        RoleName::qualified(
            &self.config.internal_role_domain,
            &format!("{TOPIC_ROLE_PREFIX}{}", role_safe(topic.raw())),
        )
    }
}
