// crates/kogna-config/src/config.rs
// ============================================================================
// Module: Kogna Configuration
// Description: Configuration loading and validation for the agent factory.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, crate::env
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits,
//! then overlaid with environment values (`DATABASE_URL`, `OPENAI_API_KEY`,
//! `KOGNA_LOG`). An explicitly requested file must exist; when the default
//! `kogna.toml` is absent the built-in defaults apply. Validation fails
//! closed: the Postgres backend without `DATABASE_URL` is a startup error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::env::EnvSource;
use crate::env::KognaEnv;
use crate::env::ProcessEnv;
use crate::env::Secret;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "kogna.toml";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum SQL identifier length (Postgres limit).
const MAX_SQL_IDENTIFIER_LENGTH: usize = 63;
/// Maximum pooled connections.
const MAX_POOL_CONNECTIONS: u32 = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Kogna configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KognaConfig {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Agent factory configuration.
    #[serde(default)]
    pub factory: FactoryConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Secrets read from the environment (never from the file).
    #[serde(skip)]
    pub secrets: SecretsConfig,
}

impl KognaConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, &ProcessEnv)
    }

    /// Loads configuration using an explicit environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env(path: Option<&Path>, env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let (resolved, required) = resolve_path(path, env)?;
        validate_path(&resolved)?;
        let mut config = if !required && !resolved.exists() {
            Self::default()
        } else {
            Self::from_file(&resolved)?
        };
        config.apply_env(env);
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text without env overlay or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a configuration file.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Overlays environment values onto the parsed configuration.
    pub fn apply_env(&mut self, env: &dyn EnvSource) {
        self.secrets.database_url = env.get(KognaEnv::DatabaseUrl).map(Secret::new);
        self.secrets.api_key = env.get(KognaEnv::ApiKey).map(Secret::new);
        if let Some(filter) = env.get(KognaEnv::LogFilter) {
            self.logging.level = filter;
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.factory.validate()?;
        self.logging.validate()?;
        if self.database.backend == DatabaseBackend::Postgres && self.secrets.database_url.is_none()
        {
            return Err(ConfigError::MissingEnv(KognaEnv::DatabaseUrl.as_str()));
        }
        Ok(())
    }
}

/// Secrets sourced from the environment.
#[derive(Debug, Clone, Default)]
pub struct SecretsConfig {
    /// Postgres connection string.
    pub database_url: Option<Secret>,
    /// LLM provider API key; carried for parity with the platform, unused.
    pub api_key: Option<Secret>,
}

/// Database backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseBackend {
    /// Pooled Postgres (production).
    #[default]
    Postgres,
    /// Single-file `SQLite` (local development).
    Sqlite,
}

impl DatabaseBackend {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: DatabaseBackend,
    /// Table holding tenant rows.
    #[serde(default = "default_organizations_table")]
    pub organizations_table: String,
    /// Maximum pooled Postgres connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Postgres connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Postgres statement timeout in milliseconds.
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
    /// `SQLite` database path.
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
    /// `SQLite` busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            organizations_table: default_organizations_table(),
            max_connections: default_max_connections(),
            connect_timeout_ms: default_connect_timeout_ms(),
            statement_timeout_ms: default_statement_timeout_ms(),
            sqlite_path: default_sqlite_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Validates database settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_sql_identifier("database.organizations_table", &self.organizations_table)?;
        if self.max_connections == 0 || self.max_connections > MAX_POOL_CONNECTIONS {
            return Err(ConfigError::Invalid(format!(
                "database.max_connections must be between 1 and {MAX_POOL_CONNECTIONS}"
            )));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "database.connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.statement_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "database.statement_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.backend == DatabaseBackend::Sqlite {
            validate_path_string("database.sqlite_path", &self.sqlite_path.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Agent factory configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactoryConfig {
    /// Directory holding `<type>.md` prompt templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    /// Directory receiving `<agent_id>.json` artifacts.
    #[serde(default = "default_registry_dir")]
    pub registry_dir: PathBuf,
    /// Vector store name recorded in `rag_config`.
    #[serde(default = "default_vector_store")]
    pub vector_store: String,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            registry_dir: default_registry_dir(),
            vector_store: default_vector_store(),
        }
    }
}

impl FactoryConfig {
    /// Validates factory settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("factory.templates_dir", &self.templates_dir.to_string_lossy())?;
        validate_path_string("factory.registry_dir", &self.registry_dir.to_string_lossy())?;
        if self.vector_store.trim().is_empty() {
            return Err(ConfigError::Invalid("factory.vector_store must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive (for example `info` or `kogna_factory=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Validates logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default organizations table name.
fn default_organizations_table() -> String {
    "organizations".to_string()
}

/// Default pool size.
const fn default_max_connections() -> u32 {
    4
}

/// Default connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    5_000
}

/// Default statement timeout.
const fn default_statement_timeout_ms() -> u64 {
    30_000
}

/// Default `SQLite` path.
fn default_sqlite_path() -> PathBuf {
    PathBuf::from("kogna.db")
}

/// Default `SQLite` busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Default templates directory.
fn default_templates_dir() -> PathBuf {
    PathBuf::from("agent-templates")
}

/// Default artifact directory.
fn default_registry_dir() -> PathBuf {
    PathBuf::from("agents")
}

/// Default vector store label.
fn default_vector_store() -> String {
    "pinecone".to_string()
}

/// Default log filter.
fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Required environment variable is unset.
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag reports whether the file must exist.
fn resolve_path(
    path: Option<&Path>,
    env: &dyn EnvSource,
) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = env.get(KognaEnv::ConfigPath) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a bare SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
fn validate_sql_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    };
    if value.len() > MAX_SQL_IDENTIFIER_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds {MAX_SQL_IDENTIFIER_LENGTH} bytes")));
    }
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !valid {
        return Err(ConfigError::Invalid(format!("{field} must be a plain SQL identifier")));
    }
    Ok(())
}
