// crates/kogna-cli/src/lib.rs
// ============================================================================
// Module: Kogna CLI Library
// Description: Shared helpers for the Kogna command-line interface.
// Purpose: Provide i18n, logging setup, and backend selection to the binary.
// Dependencies: kogna-config, kogna-factory, kogna-store-*, tracing-subscriber
// ============================================================================

//! ## Overview
//! This library houses the pieces of the `kogna` binary that are worth
//! testing in isolation: the message catalog, subscriber setup, and the
//! mapping from configuration to a concrete provisioning store.
//!
//! Security posture: CLI inputs are untrusted and are validated by the
//! factory before any I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backend;
/// Internationalization helpers and message catalog.
pub mod i18n;
pub mod logging;

#[cfg(test)]
mod tests;
