// crates/kogna-config/src/env.rs
// ============================================================================
// Module: Kogna Environment
// Description: Environment variable names and lookup sources.
// Purpose: Centralize env parsing so tests can inject values without mutation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Configuration reads a handful of environment variables after the TOML
//! file is parsed. Lookups go through [`EnvSource`] so tests can supply a map
//! instead of mutating the process environment. Empty values count as unset.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys consumed by Kogna.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KognaEnv {
    /// Postgres connection string (required for the Postgres backend).
    DatabaseUrl,
    /// LLM provider API key (read at startup, not used by the factory).
    ApiKey,
    /// Config file path override.
    ConfigPath,
    /// Log filter override.
    LogFilter,
}

impl KognaEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DatabaseUrl => "DATABASE_URL",
            Self::ApiKey => "OPENAI_API_KEY",
            Self::ConfigPath => "KOGNA_CONFIG",
            Self::LogFilter => "KOGNA_LOG",
        }
    }
}

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Source of environment values.
pub trait EnvSource {
    /// Returns the non-empty value for `key`, if set.
    fn get(&self, key: KognaEnv) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: KognaEnv) -> Option<String> {
        std::env::var(key.as_str()).ok().filter(|value| !value.trim().is_empty())
    }
}

/// Fixed environment map, keyed by variable name.
#[derive(Debug, Clone, Default)]
pub struct MapEnv(BTreeMap<String, String>);

impl MapEnv {
    /// Creates an empty map environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the map with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: KognaEnv, value: impl Into<String>) -> Self {
        self.0.insert(key.as_str().to_string(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn get(&self, key: KognaEnv) -> Option<String> {
        self.0.get(key.as_str()).filter(|value| !value.trim().is_empty()).cloned()
    }
}

// ============================================================================
// SECTION: Secrets
// ============================================================================

/// String value that never appears in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}
