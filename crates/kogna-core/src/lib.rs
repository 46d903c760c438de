// crates/kogna-core/src/lib.rs
// ============================================================================
// Module: Kogna Core Library
// Description: Public API surface for the Kogna agent factory core.
// Purpose: Expose core types, storage interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Kogna core holds the backend-agnostic model of agent provisioning:
//! identifiers, the agent record, the provisioning state machine, and the
//! transactional store contract implemented by the SQLite and Postgres
//! backends.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ProvisioningStore;
pub use interfaces::SharedProvisioningStore;
pub use interfaces::StoreError;
pub use interfaces::StoreTransaction;
pub use runtime::AgentRow;
pub use runtime::InMemoryProvisioningStore;
