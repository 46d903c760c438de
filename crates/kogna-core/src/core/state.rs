// crates/kogna-core/src/core/state.rs
// ============================================================================
// Module: Provisioning State
// Description: Linear state machine for a single provisioning call.
// Purpose: Name each step so failures report where the call stopped.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Provisioning advances strictly forward:
//! `Start → Verified → TemplateLoaded → PromptBuilt → Registered → Committed`.
//! Any non-terminal state may move to `RolledBack`. There is no intermediate
//! recovery; a rollback discards everything the call did in the database.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: State
// ============================================================================

/// Provisioning step reached by a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningState {
    /// Transaction opened, nothing verified yet.
    Start,
    /// Organization row found.
    Verified,
    /// Base template read (or fallback chosen).
    TemplateLoaded,
    /// System prompt composed.
    PromptBuilt,
    /// Agent row inserted inside the open transaction.
    Registered,
    /// Transaction committed.
    Committed,
    /// Transaction rolled back after a failure.
    RolledBack,
}

impl ProvisioningState {
    /// Returns the next state on the success path, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Verified),
            Self::Verified => Some(Self::TemplateLoaded),
            Self::TemplateLoaded => Some(Self::PromptBuilt),
            Self::PromptBuilt => Some(Self::Registered),
            Self::Registered => Some(Self::Committed),
            Self::Committed | Self::RolledBack => None,
        }
    }

    /// Returns true when no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }

    /// Returns true when `to` is a legal transition from this state.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::RolledBack || self.next() == Some(to)
    }

    /// Returns a stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Verified => "verified",
            Self::TemplateLoaded => "template_loaded",
            Self::PromptBuilt => "prompt_built",
            Self::Registered => "registered",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
