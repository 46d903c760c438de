// crates/kogna-cli/src/backend.rs
// ============================================================================
// Module: Backend Selection
// Description: Builds the configured provisioning store and factory.
// Purpose: Map `[database]` and `[factory]` settings onto concrete types.
// Dependencies: kogna-config, kogna-core, kogna-factory, kogna-store-*
// ============================================================================

//! ## Overview
//! `database.backend` selects Postgres (pooled, `DATABASE_URL`) or `SQLite`
//! (single file). The `SQLite` handle is kept concrete so development-only
//! commands such as `org add` can seed organizations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use kogna_config::DatabaseBackend;
use kogna_config::FactoryConfig;
use kogna_config::KognaConfig;
use kogna_core::SharedProvisioningStore;
use kogna_factory::AgentFactory;
use kogna_factory::FactorySettings;
use kogna_store_postgres::PostgresStoreConfig;
use kogna_store_postgres::PostgresStoreError;
use kogna_store_postgres::shared_postgres_store;
use kogna_store_sqlite::SqliteProvisioningStore;
use kogna_store_sqlite::SqliteStoreConfig;
use kogna_store_sqlite::SqliteStoreError;
use thiserror::Error;
use tracing::info;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store construction errors.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Postgres backend selected without a connection string.
    #[error("DATABASE_URL is required for the postgres backend")]
    MissingDatabaseUrl,
    /// Postgres store failed to initialize.
    #[error(transparent)]
    Postgres(#[from] PostgresStoreError),
    /// `SQLite` store failed to initialize.
    #[error(transparent)]
    Sqlite(#[from] SqliteStoreError),
}

// ============================================================================
// SECTION: Store Handle
// ============================================================================

/// Opened provisioning store.
pub enum StoreHandle {
    /// Pooled Postgres store.
    Postgres(SharedProvisioningStore),
    /// Single-file `SQLite` store.
    Sqlite(Arc<SqliteProvisioningStore>),
}

impl StoreHandle {
    /// Returns the store as a shared trait object.
    #[must_use]
    pub fn shared(&self) -> SharedProvisioningStore {
        match self {
            Self::Postgres(store) => Arc::clone(store),
            Self::Sqlite(store) => Arc::clone(store) as SharedProvisioningStore,
        }
    }

    /// Returns the `SQLite` store when that backend is active.
    #[must_use]
    pub fn sqlite(&self) -> Option<&SqliteProvisioningStore> {
        match self {
            Self::Sqlite(store) => Some(store.as_ref()),
            Self::Postgres(_) => None,
        }
    }
}

/// Opens the store selected by `config.database.backend`.
///
/// # Errors
///
/// Returns [`BackendError`] when the backend cannot be initialized.
pub fn open_store(config: &KognaConfig) -> Result<StoreHandle, BackendError> {
    let database = &config.database;
    match database.backend {
        DatabaseBackend::Postgres => {
            let url = config.secrets.database_url.as_ref().ok_or(BackendError::MissingDatabaseUrl)?;
            let store = shared_postgres_store(&PostgresStoreConfig {
                connection: url.expose().to_string(),
                max_connections: database.max_connections,
                connect_timeout_ms: database.connect_timeout_ms,
                statement_timeout_ms: database.statement_timeout_ms,
                organizations_table: database.organizations_table.clone(),
            })?;
            info!(backend = "postgres", "provisioning store opened");
            Ok(StoreHandle::Postgres(store))
        }
        DatabaseBackend::Sqlite => {
            let store = SqliteProvisioningStore::new(&SqliteStoreConfig {
                path: database.sqlite_path.clone(),
                busy_timeout_ms: database.busy_timeout_ms,
                organizations_table: database.organizations_table.clone(),
            })?;
            info!(backend = "sqlite", path = %database.sqlite_path.display(), "provisioning store opened");
            Ok(StoreHandle::Sqlite(Arc::new(store)))
        }
    }
}

/// Converts `[factory]` settings into factory settings.
#[must_use]
pub fn factory_settings(config: &FactoryConfig) -> FactorySettings {
    FactorySettings {
        templates_dir: config.templates_dir.clone(),
        registry_dir: config.registry_dir.clone(),
        vector_store: config.vector_store.clone(),
    }
}

/// Builds a factory over the opened store.
#[must_use]
pub fn build_factory(
    handle: &StoreHandle,
    config: &KognaConfig,
) -> AgentFactory<SharedProvisioningStore> {
    AgentFactory::new(handle.shared(), factory_settings(&config.factory))
}
