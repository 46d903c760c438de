// crates/kogna-core/src/core/mod.rs
// ============================================================================
// Module: Kogna Core Types
// Description: Identifiers, records, and provisioning state.
// Purpose: Group the backend-agnostic data model.
// Dependencies: crate::core::{agent, identifiers, state}
// ============================================================================

pub mod agent;
pub mod identifiers;
pub mod state;

pub use agent::AgentRecord;
pub use agent::AgentTools;
pub use agent::OnboardingData;
pub use agent::Organization;
pub use agent::RagConfig;
pub use identifiers::AgentId;
pub use identifiers::AgentType;
pub use identifiers::IdentifierError;
pub use identifiers::OrganizationId;
pub use state::ProvisioningState;
