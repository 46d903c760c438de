// crates/kogna-core/src/core/identifiers.rs
// ============================================================================
// Module: Kogna Identifiers
// Description: Canonical opaque identifiers for organizations, agents, and agent types.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! This module defines the identifiers used throughout the agent factory.
//! Identifiers serialize as plain strings on the wire. Values that reach the
//! filesystem or SQL (organization ids, agent types) are validated at
//! construction boundaries through `parse`; `new` constructors are reserved
//! for values read back from trusted storage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum organization identifier length in bytes.
pub const MAX_ORGANIZATION_ID_BYTES: usize = 128;
/// Maximum agent type length in characters.
pub const MAX_AGENT_TYPE_CHARS: usize = 64;
/// Number of organization id characters carried into agent identifiers.
pub const AGENT_ID_PREFIX_CHARS: usize = 8;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Identifier validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// Identifier is empty or whitespace.
    #[error("{kind} must be non-empty")]
    Empty {
        /// Identifier kind label.
        kind: &'static str,
    },
    /// Identifier exceeds its length limit.
    #[error("{kind} exceeds {max} bytes")]
    TooLong {
        /// Identifier kind label.
        kind: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// Identifier contains a disallowed character.
    #[error("{kind} contains invalid character {found:?}")]
    InvalidCharacter {
        /// Identifier kind label.
        kind: &'static str,
        /// Offending character.
        found: char,
    },
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Organization (tenant) identifier.
///
/// # Invariants
/// - Values built through [`OrganizationId::parse`] are non-empty, at most
///   [`MAX_ORGANIZATION_ID_BYTES`] bytes, and free of control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(String);

impl OrganizationId {
    /// Creates an organization identifier without validation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses and validates an untrusted organization identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value is empty, too long, or
    /// contains control characters.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let kind = "organization id";
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty {
                kind,
            });
        }
        if trimmed.len() > MAX_ORGANIZATION_ID_BYTES {
            return Err(IdentifierError::TooLong {
                kind,
                max: MAX_ORGANIZATION_ID_BYTES,
            });
        }
        if let Some(found) = trimmed.chars().find(|ch| ch.is_control()) {
            return Err(IdentifierError::InvalidCharacter {
                kind,
                found,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the short, filesystem-safe prefix used in agent identifiers.
    ///
    /// Only ASCII alphanumerics, `-` and `_` are kept; an id with no such
    /// characters yields `org`.
    #[must_use]
    pub fn agent_prefix(&self) -> String {
        let prefix: String = self
            .0
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
            .take(AGENT_ID_PREFIX_CHARS)
            .collect();
        if prefix.is_empty() { "org".to_string() } else { prefix }
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Agent identifier.
///
/// # Invariants
/// - Opaque UTF-8 string; generated values follow `agent_<prefix>_<millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a new agent identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the canonical identifier for an organization and timestamp.
    #[must_use]
    pub fn for_organization(company_id: &OrganizationId, unix_millis: u64) -> Self {
        Self(format!("agent_{}_{unix_millis}", company_id.agent_prefix()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier is safe to use as a file stem.
    #[must_use]
    pub fn is_file_safe(&self) -> bool {
        !self.0.is_empty()
            && self.0.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Agent type name selecting a prompt template (for example `sales`).
///
/// # Invariants
/// - Values built through [`AgentType::parse`] are 1..=64 characters of
///   `a-z`, `0-9`, `-` and `_`, so they are always a safe file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentType(String);

impl AgentType {
    /// Creates an agent type without validation.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parses and validates an untrusted agent type.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the value is empty, too long, or not
    /// a lowercase file stem.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let kind = "agent type";
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty {
                kind,
            });
        }
        if trimmed.chars().count() > MAX_AGENT_TYPE_CHARS {
            return Err(IdentifierError::TooLong {
                kind,
                max: MAX_AGENT_TYPE_CHARS,
            });
        }
        if let Some(found) = trimmed
            .chars()
            .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-' || *ch == '_'))
        {
            return Err(IdentifierError::InvalidCharacter {
                kind,
                found,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the agent type as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
