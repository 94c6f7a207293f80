// crates/broker-gate-core/src/runtime/audit.rs
// ============================================================================
// Module: Broker Gate Audit Logging
// Description: Structured audit events for decisions and role provisioning.
// Purpose: Emit JSON-line audit records without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events record every verdict (or error) the engine produces and every
//! provisioning step it takes. Sinks write JSON lines so deployments can route
//! them to their preferred logging pipeline. Sink failures are swallowed and
//! never change a verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::BrokerAction;
use crate::core::RoleName;
use crate::core::Verdict;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity of a provisioning event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLevel {
    /// Expected state change.
    Info,
    /// Provisioning was skipped in a way operators should notice.
    Warn,
}

/// Provisioning step outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningOutcome {
    /// Role was created with its initial member.
    RoleCreated,
    /// Owner role already existed; no permissions were changed.
    RoleExistsSkipped,
    /// Principal was added to an existing role.
    MemberAdded,
    /// Role grants were (re-)asserted.
    GrantsAsserted,
    /// Role was deleted.
    RoleDeleted,
    /// Role to delete did not exist.
    RoleAbsent,
}

impl ProvisioningOutcome {
    /// Returns the audit level for the outcome.
    #[must_use]
    pub const fn level(self) -> AuditLevel {
        match self {
            Self::RoleExistsSkipped => AuditLevel::Warn,
            Self::RoleCreated
            | Self::MemberAdded
            | Self::GrantsAsserted
            | Self::RoleDeleted
            | Self::RoleAbsent => AuditLevel::Info,
        }
    }
}

/// Decision audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Action under decision.
    pub action: BrokerAction,
    /// Principal username; absent for unbind.
    pub username: Option<String>,
    /// Resolved tenant domain when present.
    pub tenant_domain: Option<String>,
    /// Resource as presented by the broker.
    pub resource: String,
    /// Verdict when the decision completed.
    pub verdict: Option<Verdict>,
    /// Reason label when the decision completed.
    pub reason: Option<&'static str>,
    /// Error kind label when the decision failed.
    pub error_kind: Option<&'static str>,
}

/// Inputs required to construct a decision audit event.
pub struct DecisionAuditEventParams {
    /// Action under decision.
    pub action: BrokerAction,
    /// Principal username; absent for unbind.
    pub username: Option<String>,
    /// Resolved tenant domain when present.
    pub tenant_domain: Option<String>,
    /// Resource as presented by the broker.
    pub resource: String,
    /// Verdict when the decision completed.
    pub verdict: Option<Verdict>,
    /// Reason label when the decision completed.
    pub reason: Option<&'static str>,
    /// Error kind label when the decision failed.
    pub error_kind: Option<&'static str>,
}

impl DecisionAuditEvent {
    /// Creates a new decision audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: DecisionAuditEventParams) -> Self {
        Self {
            event: "authz_decision",
            timestamp_ms: now_ms(),
            action: params.action,
            username: params.username,
            tenant_domain: params.tenant_domain,
            resource: params.resource,
            verdict: params.verdict,
            reason: params.reason,
            error_kind: params.error_kind,
        }
    }
}

/// Provisioning audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisioningAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity.
    pub level: AuditLevel,
    /// Role affected.
    pub role: String,
    /// Principal on whose behalf the step ran, when any.
    pub username: Option<String>,
    /// Step outcome.
    pub outcome: ProvisioningOutcome,
}

impl ProvisioningAuditEvent {
    /// Creates a new provisioning audit event.
    #[must_use]
    pub fn new(role: &RoleName, username: Option<&str>, outcome: ProvisioningOutcome) -> Self {
        Self {
            event: "role_provisioning",
            timestamp_ms: now_ms(),
            level: outcome.level(),
            role: role.as_str().to_string(),
            username: username.map(str::to_string),
            outcome,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for engine events.
pub trait AuditSink: Send + Sync {
    /// Record a decision audit event.
    fn record_decision(&self, event: &DecisionAuditEvent);

    /// Record a provisioning audit event.
    fn record_provisioning(&self, _event: &ProvisioningAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_decision(&self, event: &DecisionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }

    fn record_provisioning(&self, event: &ProvisioningAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Writes one serialized record.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_decision(&self, event: &DecisionAuditEvent) {
        self.append(event);
    }

    fn record_provisioning(&self, event: &ProvisioningAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_decision(&self, _event: &DecisionAuditEvent) {}

    fn record_provisioning(&self, _event: &ProvisioningAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}
