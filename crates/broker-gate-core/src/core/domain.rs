// crates/broker-gate-core/src/core/domain.rs
// ============================================================================
// Module: Broker Gate Domain Ownership
// Description: Tenant ownership predicate for broker resource names.
// Purpose: Keep tenants from operating on each other's queues and topics.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! Tenant resources are named `domain/name`; default-tenant resources carry no
//! `/` at all. Ownership is a pure string predicate over the raw name.

use crate::core::identifiers::TenantDomain;

/// Returns true when `resource` belongs to `tenant_domain`.
///
/// The super tenant (matched case-insensitively against `super_tenant_domain`)
/// and callers without a tenant domain own exactly the names without `/`.
#[must_use]
pub fn is_own_domain(
    tenant_domain: Option<&TenantDomain>,
    resource: &str,
    super_tenant_domain: &str,
) -> bool {
    match tenant_domain {
        Some(domain) => {
            let prefixed = resource
                .strip_prefix(domain.as_str())
                .is_some_and(|rest| rest.starts_with('/'));
            prefixed
                || (domain.as_str().eq_ignore_ascii_case(super_tenant_domain)
                    && !resource.contains('/'))
        }
        None => !resource.contains('/'),
    }
}
