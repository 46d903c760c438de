// crates/kogna-core/src/core/agent.rs
// ============================================================================
// Module: Kogna Agent Model
// Description: Organization, onboarding, and agent record data types.
// Purpose: Define the serialized shape of provisioned agents.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! An [`AgentRecord`] is built once per provisioning call and persisted both
//! as a database row and as a JSON artifact. Field names on the wire match
//! the records consumed by the dashboard (`type`, `system_prompt`, `tools`,
//! `rag_config`, `created_at`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::AgentId;
use crate::core::identifiers::AgentType;
use crate::core::identifiers::OrganizationId;

// ============================================================================
// SECTION: Organization
// ============================================================================

/// Tenant row as seen by the factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Display name, when the store provides one.
    pub name: Option<String>,
}

// ============================================================================
// SECTION: Onboarding
// ============================================================================

/// Answers collected by the onboarding wizard.
///
/// # Invariants
/// - Blank values are treated as missing by the prompt compositor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingData {
    /// Company display name.
    #[serde(default, alias = "companyName", skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Product or service being sold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Conversation objective for the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

// ============================================================================
// SECTION: Agent Record
// ============================================================================

/// Static capability flags granted to a provisioned agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTools {
    /// Agent may read and write CRM contacts.
    pub crm_access: bool,
    /// Agent may book calendar slots.
    pub calendar_access: bool,
    /// Agent answers from uploaded documents.
    pub rag_enabled: bool,
}

impl AgentTools {
    /// Returns the standard tool set; RAG follows whether files were supplied.
    #[must_use]
    pub const fn standard(has_documents: bool) -> Self {
        Self {
            crm_access: true,
            calendar_access: true,
            rag_enabled: has_documents,
        }
    }
}

/// Retrieval configuration recorded for the agent.
///
/// # Invariants
/// - `indexed` stays `false`: documents are recorded, never embedded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Target vector store name.
    pub vector_store: String,
    /// Vector namespace (the organization id).
    pub namespace: String,
    /// Document names as supplied by the caller.
    pub files: Vec<String>,
    /// Whether the documents have been embedded.
    pub indexed: bool,
}

/// Provisioned agent record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Agent identifier.
    pub id: AgentId,
    /// Owning organization.
    pub company_id: OrganizationId,
    /// Agent type used to pick the template.
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    /// Fully composed system prompt.
    pub system_prompt: String,
    /// Capability flags.
    pub tools: AgentTools,
    /// Retrieval configuration.
    pub rag_config: RagConfig,
    /// Creation time (RFC 3339, UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
