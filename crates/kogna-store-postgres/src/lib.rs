// crates/kogna-store-postgres/src/lib.rs
// ============================================================================
// Module: Postgres Provisioning Store
// Description: ProvisioningStore backend using a pooled Postgres client.
// Purpose: Provide durable multi-tenant persistence for the agent factory.
// Dependencies: kogna-core, postgres, r2d2, r2d2_postgres
// ============================================================================

//! ## Overview
//! Postgres-backed [`kogna_core::ProvisioningStore`]. Organizations live in a
//! table owned by the wider application; this crate only reads it. The
//! `agents` table is created on first use when missing.

pub mod store;

pub use store::PostgresProvisioningStore;
pub use store::PostgresStoreConfig;
pub use store::PostgresStoreError;
pub use store::shared_postgres_store;
