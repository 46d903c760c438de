// crates/kogna-core/src/runtime/store.rs
// ============================================================================
// Module: Kogna In-Memory Store
// Description: Simple in-memory provisioning store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`ProvisioningStore`]
//! for tests and local demos. Inserts are staged per transaction and only
//! become visible on commit. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::AgentId;
use crate::core::AgentRecord;
use crate::core::Organization;
use crate::core::OrganizationId;
use crate::interfaces::ProvisioningStore;
use crate::interfaces::StoreError;
use crate::interfaces::StoreTransaction;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Shared state behind the in-memory store.
#[derive(Debug, Default)]
struct InMemoryState {
    /// Organizations keyed by id.
    organizations: BTreeMap<OrganizationId, Organization>,
    /// Committed agents keyed by id.
    agents: BTreeMap<AgentId, AgentRecord>,
}

/// In-memory provisioning store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvisioningStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryProvisioningStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an organization row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn upsert_organization(&self, organization: Organization) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.organizations.insert(organization.id.clone(), organization);
        Ok(())
    }

    /// Returns the number of committed agents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn agent_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.agents.len())
    }

    /// Locks the shared state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("provisioning store mutex poisoned".to_string()))
    }
}

impl ProvisioningStore for InMemoryProvisioningStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        Ok(Box::new(InMemoryTransaction {
            store: self,
            pending: Vec::new(),
        }))
    }

    fn load_agent(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, StoreError> {
        Ok(self.lock()?.agents.get(agent_id).cloned())
    }

    fn list_agents(&self, company_id: &OrganizationId) -> Result<Vec<AgentRecord>, StoreError> {
        let guard = self.lock()?;
        let mut agents: Vec<AgentRecord> =
            guard.agents.values().filter(|agent| &agent.company_id == company_id).cloned().collect();
        agents.sort_by(|left, right| {
            left.created_at.cmp(&right.created_at).then_with(|| left.id.cmp(&right.id))
        });
        Ok(agents)
    }
}

/// Transaction staging inserts until commit.
struct InMemoryTransaction<'a> {
    /// Owning store.
    store: &'a InMemoryProvisioningStore,
    /// Inserts staged in this transaction.
    pending: Vec<AgentRecord>,
}

impl StoreTransaction for InMemoryTransaction<'_> {
    fn find_organization(
        &mut self,
        company_id: &OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        Ok(self.store.lock()?.organizations.get(company_id).cloned())
    }

    fn insert_agent(&mut self, record: &AgentRecord) -> Result<(), StoreError> {
        let exists = self.store.lock()?.agents.contains_key(&record.id)
            || self.pending.iter().any(|pending| pending.id == record.id);
        if exists {
            return Err(StoreError::Store(format!("duplicate agent id {}", record.id)));
        }
        self.pending.push(record.clone());
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut guard = self.store.lock()?;
        for record in self.pending {
            guard.agents.insert(record.id.clone(), record);
        }
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
