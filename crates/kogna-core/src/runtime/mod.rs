// crates/kogna-core/src/runtime/mod.rs
// ============================================================================
// Module: Kogna Runtime Helpers
// Description: Row codec and in-memory store shared by backends and tests.
// Purpose: Keep backend crates free of duplicated encoding logic.
// Dependencies: crate::runtime::{row, store}
// ============================================================================

pub mod row;
pub mod store;

pub use row::AgentRow;
pub use store::InMemoryProvisioningStore;
