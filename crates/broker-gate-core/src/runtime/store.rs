// crates/broker-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Broker Gate In-Memory Collaborators
// Description: In-memory identity store and metadata registry.
// Purpose: Provide deterministic collaborators for tests and local demos.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of [`IdentityStore`] and
//! [`MetadataRegistry`] for tests and local demos. They are not intended for
//! production use. Clones share state, so a test can hand one clone to the
//! engine and inspect another.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::PermissionId;
use crate::core::PermissionKind;
use crate::core::RoleName;
use crate::core::Username;
use crate::interfaces::IdentityStore;
use crate::interfaces::IdentityStoreError;
use crate::interfaces::MetadataRegistry;
use crate::interfaces::RegistryError;

// ============================================================================
// SECTION: Identity Store
// ============================================================================

/// Grant key: (permission identifier, permission kind).
pub type GrantKey = (PermissionId, PermissionKind);

/// Mutable identity state.
#[derive(Debug, Default)]
struct IdentityState {
    /// Role name to member set.
    roles: BTreeMap<String, BTreeSet<Username>>,
    /// Role name to granted permissions.
    grants: BTreeMap<String, BTreeSet<GrantKey>>,
}

/// In-memory identity store for tests and examples.
///
/// A user holds a permission when any role they belong to holds it.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityStore {
    /// Identity state protected by a mutex.
    state: Arc<Mutex<IdentityState>>,
}

impl InMemoryIdentityStore {
    /// Creates an empty identity store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `username` to `role`, creating the role when missing.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the store mutex is poisoned.
    pub fn assign_role(&self, username: &str, role: &str) -> Result<(), IdentityStoreError> {
        self.lock()?.roles.entry(role.to_string()).or_default().insert(Username::new(username));
        Ok(())
    }

    /// Grants `kind` on `permission` to a role, creating the role when missing.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the store mutex is poisoned.
    pub fn grant_role(
        &self,
        role: &str,
        permission: &str,
        kind: PermissionKind,
    ) -> Result<(), IdentityStoreError> {
        let mut state = self.lock()?;
        state.roles.entry(role.to_string()).or_default();
        state
            .grants
            .entry(role.to_string())
            .or_default()
            .insert((PermissionId::new(permission), kind));
        drop(state);
        Ok(())
    }

    /// Returns the grants held by `role`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the store mutex is poisoned.
    pub fn grants_of_role(&self, role: &RoleName) -> Result<BTreeSet<GrantKey>, IdentityStoreError> {
        Ok(self.lock()?.grants.get(role.as_str()).cloned().unwrap_or_default())
    }

    /// Returns every role name in the store.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError`] when the store mutex is poisoned.
    pub fn role_names(&self) -> Result<Vec<String>, IdentityStoreError> {
        Ok(self.lock()?.roles.keys().cloned().collect())
    }

    /// Locks the identity state.
    fn lock(&self) -> Result<MutexGuard<'_, IdentityState>, IdentityStoreError> {
        self.state
            .lock()
            .map_err(|_| IdentityStoreError::Unavailable("identity store mutex poisoned".to_string()))
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn roles_of_user(&self, username: &Username) -> Result<BTreeSet<String>, IdentityStoreError> {
        let state = self.lock()?;
        Ok(state
            .roles
            .iter()
            .filter(|(_, members)| members.contains(username))
            .map(|(role, _)| role.clone())
            .collect())
    }

    fn role_exists(&self, role: &RoleName) -> Result<bool, IdentityStoreError> {
        Ok(self.lock()?.roles.contains_key(role.as_str()))
    }

    fn create_role(
        &self,
        role: &RoleName,
        members: &[Username],
    ) -> Result<(), IdentityStoreError> {
        let mut state = self.lock()?;
        if state.roles.contains_key(role.as_str()) {
            return Err(IdentityStoreError::Conflict(format!("role already exists: {role}")));
        }
        state.roles.insert(role.as_str().to_string(), members.iter().cloned().collect());
        drop(state);
        Ok(())
    }

    fn delete_role(&self, role: &RoleName) -> Result<(), IdentityStoreError> {
        let mut state = self.lock()?;
        if state.roles.remove(role.as_str()).is_none() {
            return Err(IdentityStoreError::NotFound(format!("role not found: {role}")));
        }
        state.grants.remove(role.as_str());
        drop(state);
        Ok(())
    }

    fn members_of_role(&self, role: &RoleName) -> Result<BTreeSet<Username>, IdentityStoreError> {
        self.lock()?
            .roles
            .get(role.as_str())
            .cloned()
            .ok_or_else(|| IdentityStoreError::NotFound(format!("role not found: {role}")))
    }

    fn add_members_to_role(
        &self,
        role: &RoleName,
        members: &[Username],
    ) -> Result<(), IdentityStoreError> {
        let mut state = self.lock()?;
        let current = state
            .roles
            .get_mut(role.as_str())
            .ok_or_else(|| IdentityStoreError::NotFound(format!("role not found: {role}")))?;
        current.extend(members.iter().cloned());
        drop(state);
        Ok(())
    }

    fn is_authorized(
        &self,
        username: &Username,
        permission: &PermissionId,
        kind: PermissionKind,
    ) -> Result<bool, IdentityStoreError> {
        let state = self.lock()?;
        let key = (permission.clone(), kind);
        Ok(state.roles.iter().any(|(role, members)| {
            members.contains(username)
                && state.grants.get(role).is_some_and(|grants| grants.contains(&key))
        }))
    }

    fn grant_permission(
        &self,
        role: &RoleName,
        permission: &PermissionId,
        kind: PermissionKind,
    ) -> Result<(), IdentityStoreError> {
        let mut state = self.lock()?;
        if !state.roles.contains_key(role.as_str()) {
            return Err(IdentityStoreError::NotFound(format!("role not found: {role}")));
        }
        state
            .grants
            .entry(role.as_str().to_string())
            .or_default()
            .insert((permission.clone(), kind));
        drop(state);
        Ok(())
    }
}

// ============================================================================
// SECTION: Metadata Registry
// ============================================================================

/// Mutable registry state.
#[derive(Debug, Default)]
struct RegistryState {
    /// Queue name to owner.
    queues: BTreeMap<String, Username>,
    /// (routing key, queue name) to owner.
    subscriptions: BTreeMap<(String, String), Username>,
}

/// In-memory metadata registry for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMetadataRegistry {
    /// Registry state protected by a mutex.
    state: Arc<Mutex<RegistryState>>,
}

impl InMemoryMetadataRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the owner recorded for a queue.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the registry mutex is poisoned.
    pub fn queue_owner(&self, name: &str) -> Result<Option<Username>, RegistryError> {
        Ok(self.lock()?.queues.get(name).cloned())
    }

    /// Returns the owner recorded for a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the registry mutex is poisoned.
    pub fn subscription_owner(
        &self,
        routing_key: &str,
        queue_name: &str,
    ) -> Result<Option<Username>, RegistryError> {
        let key = (routing_key.to_string(), queue_name.to_string());
        Ok(self.lock()?.subscriptions.get(&key).cloned())
    }

    /// Returns the number of queue and subscription records.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the registry mutex is poisoned.
    pub fn record_counts(&self) -> Result<(usize, usize), RegistryError> {
        let state = self.lock()?;
        Ok((state.queues.len(), state.subscriptions.len()))
    }

    /// Locks the registry state.
    fn lock(&self) -> Result<MutexGuard<'_, RegistryState>, RegistryError> {
        self.state
            .lock()
            .map_err(|_| RegistryError::Unavailable("metadata registry mutex poisoned".to_string()))
    }
}

impl MetadataRegistry for InMemoryMetadataRegistry {
    fn create_queue_record(&self, name: &str, owner: &Username) -> Result<(), RegistryError> {
        self.lock()?.queues.insert(name.to_string(), owner.clone());
        Ok(())
    }

    fn delete_queue_record(&self, name: &str) -> Result<(), RegistryError> {
        self.lock()?.queues.remove(name);
        Ok(())
    }

    fn create_subscription_record(
        &self,
        routing_key: &str,
        queue_name: &str,
        owner: &Username,
    ) -> Result<(), RegistryError> {
        self.lock()?
            .subscriptions
            .insert((routing_key.to_string(), queue_name.to_string()), owner.clone());
        Ok(())
    }

    fn delete_subscription_record(
        &self,
        routing_key: &str,
        queue_name: &str,
    ) -> Result<(), RegistryError> {
        self.lock()?.subscriptions.remove(&(routing_key.to_string(), queue_name.to_string()));
        Ok(())
    }
}
