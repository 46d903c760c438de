// crates/kogna-core/src/runtime/row.rs
// ============================================================================
// Module: Agent Row Codec
// Description: Flat column representation of agent records.
// Purpose: Share one encoding between the SQL backends.
// Dependencies: crate::core, crate::interfaces, serde_json, time
// ============================================================================

//! ## Overview
//! SQL backends store `tools` and `rag_config` as JSON text and `created_at`
//! as RFC 3339 UTC text with exactly three fractional digits, so the column
//! sorts lexicographically in creation order. [`AgentRow`] performs both
//! directions so `SQLite` and Postgres persist byte-identical column values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::core::AgentId;
use crate::core::AgentRecord;
use crate::core::AgentTools;
use crate::core::AgentType;
use crate::core::OrganizationId;
use crate::core::RagConfig;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed-width UTC timestamp layout for the `created_at` column.
const CREATED_AT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

// ============================================================================
// SECTION: Row
// ============================================================================

/// Agent record flattened into column values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRow {
    /// `agents.id`
    pub id: String,
    /// `agents.company_id`
    pub company_id: String,
    /// `agents.agent_type`
    pub agent_type: String,
    /// `agents.system_prompt`
    pub system_prompt: String,
    /// `agents.tools_json`
    pub tools_json: String,
    /// `agents.rag_config_json`
    pub rag_config_json: String,
    /// `agents.created_at`
    pub created_at: String,
}

impl AgentRow {
    /// Encodes a record into column values.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when a field cannot be encoded.
    pub fn from_record(record: &AgentRecord) -> Result<Self, StoreError> {
        let tools_json = serde_json::to_string(&record.tools)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let rag_config_json = serde_json::to_string(&record.rag_config)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let created_at = record
            .created_at
            .to_offset(UtcOffset::UTC)
            .format(CREATED_AT_FORMAT)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        Ok(Self {
            id: record.id.as_str().to_string(),
            company_id: record.company_id.as_str().to_string(),
            agent_type: record.agent_type.as_str().to_string(),
            system_prompt: record.system_prompt.clone(),
            tools_json,
            rag_config_json,
            created_at,
        })
    }

    /// Decodes column values back into a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when a JSON or timestamp column is
    /// malformed.
    pub fn into_record(self) -> Result<AgentRecord, StoreError> {
        let tools: AgentTools = serde_json::from_str(&self.tools_json).map_err(|err| {
            StoreError::Corrupt(format!("agent {} tools_json: {err}", self.id))
        })?;
        let rag_config: RagConfig = serde_json::from_str(&self.rag_config_json).map_err(|err| {
            StoreError::Corrupt(format!("agent {} rag_config_json: {err}", self.id))
        })?;
        let created_at = OffsetDateTime::parse(&self.created_at, &Rfc3339).map_err(|err| {
            StoreError::Corrupt(format!("agent {} created_at: {err}", self.id))
        })?;
        Ok(AgentRecord {
            id: AgentId::new(self.id),
            company_id: OrganizationId::new(self.company_id),
            agent_type: AgentType::new(self.agent_type),
            system_prompt: self.system_prompt,
            tools,
            rag_config,
            created_at,
        })
    }
}
