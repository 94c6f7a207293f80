// crates/broker-gate-config/src/config.rs
// ============================================================================
// Module: Broker Gate Configuration
// Description: Configuration loading and validation for Broker Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: broker-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and defaults to the broker's stock naming
//! conventions. Invalid configuration fails closed: identity-store keys derived
//! from a bad prefix or role domain would silently miss existing grants.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use broker_gate_core::AdminPermissions;
use broker_gate_core::AuditSink;
use broker_gate_core::EngineConfig;
use broker_gate_core::ExchangeNames;
use broker_gate_core::FileAuditSink;
use broker_gate_core::NoopAuditSink;
use broker_gate_core::PermissionId;
use broker_gate_core::StderrAuditSink;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "broker-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "BROKER_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Broker Gate configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrokerGateConfig {
    /// Role, tenant, and temporary-queue policy.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Well-known exchange names.
    #[serde(default)]
    pub exchanges: ExchangesConfig,
    /// Permission identifier layout.
    #[serde(default)]
    pub permissions: PermissionsConfig,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl BrokerGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml_str(content)?;
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        self.exchanges.validate()?;
        self.permissions.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Builds the engine configuration.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            admin_role: self.policy.admin_role.clone(),
            super_tenant_domain: self.policy.super_tenant_domain.clone(),
            internal_role_domain: self.policy.internal_role_domain.clone(),
            temp_queue_prefix: self.policy.temp_queue_prefix.clone(),
            queue_permission_prefix: self.permissions.queue_prefix.clone(),
            topic_permission_prefix: self.permissions.topic_prefix.clone(),
            exchanges: ExchangeNames {
                default: self.exchanges.default.clone(),
                direct: self.exchanges.direct.clone(),
                topic: self.exchanges.topic.clone(),
            },
            admin_permissions: self.permissions.admin_permissions(),
        }
    }
}

/// Role, tenant, and temporary-queue policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Role granting global administrative override.
    pub admin_role: String,
    /// Domain of the default/super tenant.
    pub super_tenant_domain: String,
    /// Role domain provisioned roles are created in.
    pub internal_role_domain: String,
    /// Raw-name prefix of temporary topic subscriber queues.
    pub temp_queue_prefix: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            admin_role: engine.admin_role,
            super_tenant_domain: engine.super_tenant_domain,
            internal_role_domain: engine.internal_role_domain,
            temp_queue_prefix: engine.temp_queue_prefix,
        }
    }
}

impl PolicyConfig {
    /// Validates policy configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("policy.admin_role", &self.admin_role)?;
        require_non_empty("policy.super_tenant_domain", &self.super_tenant_domain)?;
        require_non_empty("policy.internal_role_domain", &self.internal_role_domain)?;
        require_non_empty("policy.temp_queue_prefix", &self.temp_queue_prefix)?;
        if self.internal_role_domain.contains('/') {
            return Err(ConfigError::Invalid(
                "policy.internal_role_domain must not contain '/'".to_string(),
            ));
        }
        if self.temp_queue_prefix.contains(['/', ':']) {
            return Err(ConfigError::Invalid(
                "policy.temp_queue_prefix must not contain '/' or ':'".to_string(),
            ));
        }
        Ok(())
    }
}

/// Well-known exchange names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangesConfig {
    /// Normalized default exchange name.
    pub default: String,
    /// Direct exchange name.
    pub direct: String,
    /// Topic exchange name.
    pub topic: String,
}

impl Default for ExchangesConfig {
    fn default() -> Self {
        let names = ExchangeNames::default();
        Self {
            default: names.default,
            direct: names.direct,
            topic: names.topic,
        }
    }
}

impl ExchangesConfig {
    /// Validates exchange names.
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("exchanges.default", &self.default)?;
        require_non_empty("exchanges.direct", &self.direct)?;
        require_non_empty("exchanges.topic", &self.topic)?;
        if self.default == self.direct || self.default == self.topic || self.direct == self.topic
        {
            return Err(ConfigError::Invalid("exchange names must be distinct".to_string()));
        }
        Ok(())
    }
}

/// Permission identifier layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Prefix of queue permission identifiers.
    pub queue_prefix: String,
    /// Prefix of topic permission identifiers.
    pub topic_prefix: String,
    /// Permission for the queue-add function.
    pub queue_add: String,
    /// Permission for the queue-browse function.
    pub queue_browse: String,
    /// Permission for the queue-delete function.
    pub queue_delete: String,
    /// Permission for the topic-add function.
    pub topic_add: String,
    /// Permission for the topic-delete function.
    pub topic_delete: String,
    /// Permission for the dead-letter browse function.
    pub dlc_browse: String,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        let admin = engine.admin_permissions;
        Self {
            queue_prefix: engine.queue_permission_prefix,
            topic_prefix: engine.topic_permission_prefix,
            queue_add: admin.queue_add.as_str().to_string(),
            queue_browse: admin.queue_browse.as_str().to_string(),
            queue_delete: admin.queue_delete.as_str().to_string(),
            topic_add: admin.topic_add.as_str().to_string(),
            topic_delete: admin.topic_delete.as_str().to_string(),
            dlc_browse: admin.dlc_browse.as_str().to_string(),
        }
    }
}

impl PermissionsConfig {
    /// Validates permission identifiers.
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("permissions.queue_prefix", &self.queue_prefix)?;
        require_non_empty("permissions.topic_prefix", &self.topic_prefix)?;
        if self.queue_prefix == self.topic_prefix {
            return Err(ConfigError::Invalid(
                "permissions.queue_prefix and permissions.topic_prefix must differ".to_string(),
            ));
        }
        for (field, value) in [
            ("permissions.queue_add", &self.queue_add),
            ("permissions.queue_browse", &self.queue_browse),
            ("permissions.queue_delete", &self.queue_delete),
            ("permissions.topic_add", &self.topic_add),
            ("permissions.topic_delete", &self.topic_delete),
            ("permissions.dlc_browse", &self.dlc_browse),
        ] {
            require_non_empty(field, value)?;
        }
        Ok(())
    }

    /// Builds the administrative function permissions.
    fn admin_permissions(&self) -> AdminPermissions {
        AdminPermissions {
            queue_add: PermissionId::new(self.queue_add.clone()),
            queue_browse: PermissionId::new(self.queue_browse.clone()),
            queue_delete: PermissionId::new(self.queue_delete.clone()),
            topic_add: PermissionId::new(self.topic_add.clone()),
            topic_delete: PermissionId::new(self.topic_delete.clone()),
            dlc_browse: PermissionId::new(self.dlc_browse.clone()),
        }
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Sink receiving audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// JSON-lines log path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires audit.path".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::Stderr | AuditSinkKind::None, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid for the file sink".to_string(),
            )),
            (AuditSinkKind::Stderr | AuditSinkKind::None, None) => Ok(()),
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns an error when the file sink cannot open its log file.
    pub fn build_sink(&self) -> io::Result<Arc<dyn AuditSink>> {
        match (self.sink, &self.path) {
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                Ok(Arc::new(FileAuditSink::new(Path::new(path.trim()))?))
            }
            (AuditSinkKind::File, None) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "file audit sink requires audit.path",
            )),
        }
    }
}

/// Audit sink kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// Append-only JSON-lines file.
    File,
    /// Discard audit events.
    None,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from an explicit path or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Rejects empty or whitespace-only values.
fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
