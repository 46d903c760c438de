// crates/kogna-config/src/lib.rs
// ============================================================================
// Module: Kogna Config Library
// Description: Canonical configuration model for the Kogna agent factory.
// Purpose: Provide a single source of truth for config loading and validation.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! This crate owns the Kogna configuration model: database backend
//! selection, factory directories, logging, and the environment overlay for
//! secrets. Security posture: config inputs are untrusted and validation
//! fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::DatabaseBackend;
pub use config::DatabaseConfig;
pub use config::FactoryConfig;
pub use config::KognaConfig;
pub use config::LogFormat;
pub use config::LoggingConfig;
pub use config::SecretsConfig;
pub use env::EnvSource;
pub use env::KognaEnv;
pub use env::MapEnv;
pub use env::ProcessEnv;
pub use env::Secret;
