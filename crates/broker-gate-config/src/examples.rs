// crates/broker-gate-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Broker Gate configuration. Every value shown is the
//! built-in default except the audit sink.

/// Returns a canonical example `broker-gate.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[policy]
admin_role = "admin"
super_tenant_domain = "carbon.super"
internal_role_domain = "Internal"
temp_queue_prefix = "tmp_"

[exchanges]
default = "default"
direct = "amq.direct"
topic = "amq.topic"

[permissions]
queue_prefix = "event/queue/"
topic_prefix = "event/topic/"
queue_add = "/permission/admin/manage/queue/addQueue"
queue_browse = "/permission/admin/manage/queue/browseQueue"
queue_delete = "/permission/admin/manage/queue/deleteQueue"
topic_add = "/permission/admin/manage/topic/addTopic"
topic_delete = "/permission/admin/manage/topic/deleteTopic"
dlc_browse = "/permission/admin/manage/dlc/browseDlc"

[audit]
sink = "file"
path = "broker-gate-audit.jsonl"
"#,
    )
}
