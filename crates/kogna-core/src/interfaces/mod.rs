// crates/kogna-core/src/interfaces/mod.rs
// ============================================================================
// Module: Kogna Interfaces
// Description: Backend-agnostic storage interfaces for agent provisioning.
// Purpose: Define the transactional contract implemented by store backends.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Provisioning needs exactly one transaction per call: look up the
//! organization, insert the agent row, then commit or roll back. Backends
//! implement [`ProvisioningStore`] to open a [`StoreTransaction`] bound to a
//! single checked-out connection.
//!
//! ## Invariants
//! - A transaction dropped without `commit` or `rollback` rolls back.
//! - Rows inserted in a transaction are invisible to readers until commit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::AgentId;
use crate::core::AgentRecord;
use crate::core::Organization;
use crate::core::OrganizationId;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Provisioning store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connection, pool, or filesystem failure.
    #[error("provisioning store io error: {0}")]
    Io(String),
    /// Database engine error.
    #[error("provisioning store error: {0}")]
    Store(String),
    /// Caller supplied invalid data.
    #[error("provisioning store invalid data: {0}")]
    Invalid(String),
    /// Stored data failed to decode.
    #[error("provisioning store corruption: {0}")]
    Corrupt(String),
}

// ============================================================================
// SECTION: Provisioning Store
// ============================================================================

/// Open transaction on a single store connection.
pub trait StoreTransaction {
    /// Looks up an organization by exact id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_organization(
        &mut self,
        company_id: &OrganizationId,
    ) -> Result<Option<Organization>, StoreError>;

    /// Inserts an agent row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the insert fails, including duplicate ids.
    fn insert_agent(&mut self, record: &AgentRecord) -> Result<(), StoreError>;

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the commit fails; the transaction is then
    /// rolled back by the backend.
    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    /// Rolls back the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the rollback statement fails.
    fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Store backend able to open provisioning transactions and read agents.
pub trait ProvisioningStore {
    /// Opens a transaction on a dedicated connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when no connection is available or `BEGIN` fails.
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError>;

    /// Loads a committed agent by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails or the row cannot be decoded.
    fn load_agent(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, StoreError>;

    /// Lists committed agents for an organization, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails or a row cannot be decoded.
    fn list_agents(&self, company_id: &OrganizationId) -> Result<Vec<AgentRecord>, StoreError>;
}

/// Shared provisioning store handle.
pub type SharedProvisioningStore = Arc<dyn ProvisioningStore + Send + Sync>;

impl<T: ProvisioningStore + ?Sized> ProvisioningStore for Arc<T> {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        (**self).begin()
    }

    fn load_agent(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, StoreError> {
        (**self).load_agent(agent_id)
    }

    fn list_agents(&self, company_id: &OrganizationId) -> Result<Vec<AgentRecord>, StoreError> {
        (**self).list_agents(company_id)
    }
}
