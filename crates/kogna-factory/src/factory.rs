// crates/kogna-factory/src/factory.rs
// ============================================================================
// Module: Agent Factory
// Description: Transactional agent provisioning.
// Purpose: Register one agent per call, all-or-nothing in the store.
// Dependencies: kogna-core, tracing
// ============================================================================

//! ## Overview
//! [`AgentFactory::provision`] opens one store transaction and walks the
//! [`ProvisioningState`] machine: verify the organization, load the template,
//! compose the prompt, insert the row, commit. Any failure before commit rolls
//! the transaction back and returns the original error; a rollback failure is
//! logged, never surfaced in its place.
//!
//! The JSON artifact is written only after `COMMIT` succeeds. An artifact
//! failure therefore leaves a committed row behind; it is reported as
//! [`FactoryError::Artifact`] and repaired with [`AgentFactory::export`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use kogna_core::AgentId;
use kogna_core::AgentRecord;
use kogna_core::AgentTools;
use kogna_core::AgentType;
use kogna_core::IdentifierError;
use kogna_core::OnboardingData;
use kogna_core::OrganizationId;
use kogna_core::ProvisioningState;
use kogna_core::ProvisioningStore;
use kogna_core::RagConfig;
use kogna_core::StoreError;
use kogna_core::StoreTransaction;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::ids::AgentIdGenerator;
use crate::prompt::compose_prompt;
use crate::registry::RegistryError;
use crate::registry::RegistryWriter;
use crate::template::TemplateError;
use crate::template::TemplateLoader;
use crate::template::TemplateSource;

// ============================================================================
// SECTION: Request
// ============================================================================

/// Input for one provisioning call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    /// Organization (tenant) id, as supplied by the caller.
    pub company_id: String,
    /// Agent type; selects `<agent_type>.md` in the templates directory.
    pub agent_type: String,
    /// Onboarding answers used for placeholder substitution.
    #[serde(default)]
    pub onboarding: OnboardingData,
    /// Document names to record for retrieval. Not read or validated.
    #[serde(default)]
    pub files: Vec<String>,
    /// Extra rules appended to the prompt.
    #[serde(default)]
    pub prompt_custom: Option<String>,
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Filesystem and RAG settings for the factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorySettings {
    /// Directory holding prompt templates.
    pub templates_dir: PathBuf,
    /// Directory receiving JSON artifacts.
    pub registry_dir: PathBuf,
    /// Vector store name recorded in `rag_config`.
    pub vector_store: String,
}

impl Default for FactorySettings {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("agent-templates"),
            registry_dir: PathBuf::from("agents"),
            vector_store: "pinecone".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Agent factory errors.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Request failed validation before any I/O.
    #[error("invalid provisioning request: {0}")]
    InvalidRequest(#[from] IdentifierError),
    /// Organization row does not exist.
    #[error("organization not found: {0}")]
    OrganizationNotFound(OrganizationId),
    /// Template could not be loaded.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Store failure, tagged with the last state reached.
    #[error("store failure after {state}: {source}")]
    Store {
        /// Last state reached before the failure.
        state: ProvisioningState,
        /// Underlying store error.
        source: StoreError,
    },
    /// Row committed but the artifact could not be written.
    #[error("agent {agent_id} committed but artifact write failed: {source}")]
    Artifact {
        /// Committed agent id.
        agent_id: AgentId,
        /// Underlying registry error.
        source: RegistryError,
    },
    /// Agent record not present in the store.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),
    /// Read-only store query failed.
    #[error("store query failed: {0}")]
    Query(StoreError),
    /// Internal state machine violation.
    #[error("illegal provisioning transition {from} -> {to}")]
    Transition {
        /// State before the attempted transition.
        from: ProvisioningState,
        /// Rejected target state.
        to: ProvisioningState,
    },
}

// ============================================================================
// SECTION: Progress
// ============================================================================

/// Tracks the state reached by one provisioning call.
#[derive(Debug)]
struct Progress {
    /// Current state.
    state: ProvisioningState,
}

impl Progress {
    /// Starts at [`ProvisioningState::Start`].
    const fn new() -> Self {
        Self {
            state: ProvisioningState::Start,
        }
    }

    /// Moves to `to`, rejecting transitions the state machine forbids.
    fn advance(&mut self, to: ProvisioningState) -> Result<(), FactoryError> {
        if !self.state.can_transition_to(to) {
            return Err(FactoryError::Transition {
                from: self.state,
                to,
            });
        }
        debug!(state = %to, "provisioning state advanced");
        self.state = to;
        Ok(())
    }

    /// Records that the transaction was rolled back.
    fn roll_back(&mut self) {
        debug!(from = %self.state, "provisioning state rolled back");
        self.state = ProvisioningState::RolledBack;
    }

    /// Wraps a store error with the current state.
    const fn store_error(&self, source: StoreError) -> FactoryError {
        FactoryError::Store {
            state: self.state,
            source,
        }
    }
}

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Provisions agents against a [`ProvisioningStore`].
pub struct AgentFactory<S> {
    /// Backing store.
    store: S,
    /// Template source.
    templates: TemplateLoader,
    /// Artifact writer.
    registry: RegistryWriter,
    /// Vector store name for `rag_config`.
    vector_store: String,
    /// Id source shared across the process.
    ids: &'static AgentIdGenerator,
}

impl<S: ProvisioningStore> AgentFactory<S> {
    /// Creates a factory over `store`.
    #[must_use]
    pub fn new(store: S, settings: FactorySettings) -> Self {
        Self {
            store,
            templates: TemplateLoader::new(settings.templates_dir),
            registry: RegistryWriter::new(settings.registry_dir),
            vector_store: settings.vector_store,
            ids: AgentIdGenerator::process(),
        }
    }

    /// Returns the backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the artifact writer.
    pub const fn registry(&self) -> &RegistryWriter {
        &self.registry
    }

    /// Provisions one agent.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when validation, verification, template
    /// loading, or the store fails (the transaction is rolled back), or when
    /// the artifact write fails after commit.
    pub fn provision(&self, request: &ProvisionRequest) -> Result<AgentRecord, FactoryError> {
        let company_id = OrganizationId::parse(&request.company_id)?;
        let agent_type = AgentType::parse(&request.agent_type)?;
        let span = tracing::info_span!(
            "provision",
            company_id = %company_id,
            agent_type = %agent_type
        );
        let _entered = span.enter();

        let mut progress = Progress::new();
        let mut tx = self.store.begin().map_err(|source| progress.store_error(source))?;
        let record = match self.register(tx.as_mut(), &mut progress, &company_id, &agent_type, request)
        {
            Ok(record) => record,
            Err(err) => {
                Self::abort(tx, &mut progress, &err);
                return Err(err);
            }
        };
        if let Err(source) = tx.commit() {
            error!(
                agent_id = %record.id,
                state = %progress.state,
                error = %source,
                "commit failed, provisioning rolled back"
            );
            let err = progress.store_error(source);
            progress.roll_back();
            return Err(err);
        }
        progress.advance(ProvisioningState::Committed)?;

        let path = self.registry.write(&record).map_err(|source| {
            error!(agent_id = %record.id, error = %source, "agent committed without artifact");
            FactoryError::Artifact {
                agent_id: record.id.clone(),
                source,
            }
        })?;
        info!(agent_id = %record.id, path = %path.display(), "agent provisioned");
        Ok(record)
    }

    /// Runs every step up to and including the row insert.
    fn register(
        &self,
        tx: &mut (dyn StoreTransaction + '_),
        progress: &mut Progress,
        company_id: &OrganizationId,
        agent_type: &AgentType,
        request: &ProvisionRequest,
    ) -> Result<AgentRecord, FactoryError> {
        let organization =
            tx.find_organization(company_id).map_err(|source| progress.store_error(source))?;
        if organization.is_none() {
            return Err(FactoryError::OrganizationNotFound(company_id.clone()));
        }
        progress.advance(ProvisioningState::Verified)?;
        info!("organization verified");

        if !request.files.is_empty() {
            info!(files = request.files.len(), "documents recorded for indexing");
        }

        let template = self.templates.load(agent_type)?;
        progress.advance(ProvisioningState::TemplateLoaded)?;
        if let TemplateSource::File(path) = &template.source {
            debug!(path = %path.display(), "using template file");
        }

        let system_prompt =
            compose_prompt(&template.body, &request.onboarding, request.prompt_custom.as_deref());
        progress.advance(ProvisioningState::PromptBuilt)?;

        let (id, created_at) = self.ids.next(company_id);
        let record = AgentRecord {
            id,
            company_id: company_id.clone(),
            agent_type: agent_type.clone(),
            system_prompt,
            tools: AgentTools::standard(!request.files.is_empty()),
            rag_config: RagConfig {
                vector_store: self.vector_store.clone(),
                namespace: company_id.as_str().to_string(),
                files: request.files.clone(),
                indexed: false,
            },
            created_at,
        };
        tx.insert_agent(&record).map_err(|source| progress.store_error(source))?;
        progress.advance(ProvisioningState::Registered)?;
        info!(agent_id = %record.id, "agent registered");
        Ok(record)
    }

    /// Rolls back after a failed step, logging rollback failures.
    fn abort(tx: Box<dyn StoreTransaction + '_>, progress: &mut Progress, cause: &FactoryError) {
        if let Err(rollback_err) = tx.rollback() {
            error!(state = %progress.state, error = %rollback_err, "rollback failed");
        }
        error!(state = %progress.state, error = %cause, "provisioning rolled back");
        progress.roll_back();
    }

    /// Loads one committed agent.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::AgentNotFound`] or [`FactoryError::Query`].
    pub fn agent(&self, agent_id: &AgentId) -> Result<AgentRecord, FactoryError> {
        self.store
            .load_agent(agent_id)
            .map_err(FactoryError::Query)?
            .ok_or_else(|| FactoryError::AgentNotFound(agent_id.clone()))
    }

    /// Lists committed agents for an organization, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Query`] when the store read fails.
    pub fn agents(&self, company_id: &OrganizationId) -> Result<Vec<AgentRecord>, FactoryError> {
        self.store.list_agents(company_id).map_err(FactoryError::Query)
    }

    /// Rewrites the JSON artifact for a committed agent from the store.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError`] when the agent is missing or the write fails.
    pub fn export(&self, agent_id: &AgentId) -> Result<PathBuf, FactoryError> {
        let record = self.agent(agent_id)?;
        let path = self.registry.write(&record).map_err(|source| FactoryError::Artifact {
            agent_id: record.id.clone(),
            source,
        })?;
        info!(agent_id = %record.id, path = %path.display(), "agent artifact exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests;
