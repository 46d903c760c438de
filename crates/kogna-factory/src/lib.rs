// crates/kogna-factory/src/lib.rs
// ============================================================================
// Module: Kogna Factory Library
// Description: Agent provisioning pipeline.
// Purpose: Turn onboarding answers into a committed agent record.
// Dependencies: kogna-core, serde_json, time, tracing
// ============================================================================

//! ## Overview
//! The factory verifies the tenant, loads the prompt template for the agent
//! type, composes the system prompt, registers the record inside one store
//! transaction, and writes a JSON artifact once the transaction commits.
//!
//! ```text
//! start -> verified -> template_loaded -> prompt_built -> registered -> committed
//!   \___________________ any failure ____________________/-> rolled_back
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod factory;
pub mod ids;
pub mod prompt;
pub mod registry;
pub mod template;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use factory::AgentFactory;
pub use factory::FactoryError;
pub use factory::FactorySettings;
pub use factory::ProvisionRequest;
pub use ids::AgentIdGenerator;
pub use prompt::compose_prompt;
pub use registry::RegistryError;
pub use registry::RegistryWriter;
pub use template::FALLBACK_TEMPLATE;
pub use template::LoadedTemplate;
pub use template::TemplateError;
pub use template::TemplateLoader;
pub use template::TemplateSource;
