// crates/broker-gate-config/src/lib.rs
// ============================================================================
// Module: Broker Gate Config Library
// Description: Canonical config model, validation, and examples.
// Purpose: Single source of truth for broker-gate.toml semantics.
// Dependencies: broker-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `broker-gate-config` defines the configuration model for Broker Gate. It
//! provides strict, fail-closed validation and maps a validated file onto the
//! core [`broker_gate_core::EngineConfig`] and an audit sink.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
