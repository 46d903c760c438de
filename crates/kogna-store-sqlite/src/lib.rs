// crates/kogna-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Provisioning Store
// Description: ProvisioningStore backend using a single SQLite file.
// Purpose: Provide local-development persistence for the agent factory.
// Dependencies: kogna-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`kogna_core::ProvisioningStore`]
//! holding organizations and agents in one file. It mirrors the Postgres
//! schema so the factory behaves identically on both backends.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteProvisioningStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
