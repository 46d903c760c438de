// crates/kogna-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Provisioning Store
// Description: ProvisioningStore backed by a single SQLite file.
// Purpose: Run the agent factory locally without a Postgres server.
// Dependencies: kogna-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`ProvisioningStore`] on one `SQLite` connection
//! guarded by a mutex. A provisioning transaction holds the mutex for its
//! whole lifetime and runs `BEGIN IMMEDIATE`, so it owns the write lock until
//! `COMMIT` or `ROLLBACK`. Unlike Postgres, this backend creates the
//! organizations table itself and can seed rows for development.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use kogna_core::AgentId;
use kogna_core::AgentRecord;
use kogna_core::AgentRow;
use kogna_core::Organization;
use kogna_core::OrganizationId;
use kogna_core::ProvisioningStore;
use kogna_core::StoreError;
use kogna_core::StoreTransaction;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Column list shared by agent reads.
const AGENT_COLUMNS: &str =
    "id, company_id, agent_type, system_prompt, tools_json, rag_config_json, created_at";

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the `SQLite` provisioning store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Organizations table name (plain identifier, validated by config).
    #[serde(default = "default_organizations_table")]
    pub organizations_table: String,
}

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            organizations_table: default_organizations_table(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default organizations table name.
fn default_organizations_table() -> String {
    "organizations".to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::VersionMismatch(message) => Self::Corrupt(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed provisioning store.
#[derive(Clone)]
pub struct SqliteProvisioningStore {
    /// Quoted organizations table name.
    organizations_table: String,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteProvisioningStore {
    /// Opens an `SQLite`-backed provisioning store and creates its schema.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let organizations_table = quote_identifier(&config.organizations_table)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection, &organizations_table)?;
        Ok(Self {
            organizations_table,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Inserts or renames an organization row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_organization(&self, organization: &Organization) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                &format!(
                    "INSERT INTO {} (id, name) VALUES (?1, ?2) ON CONFLICT(id) DO UPDATE SET \
                     name = excluded.name",
                    self.organizations_table
                ),
                params![organization.id.as_str(), organization.name.as_deref()],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }
}

impl ProvisioningStore for SqliteProvisioningStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        let guard = self.lock()?;
        guard
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(Box::new(SqliteTransaction {
            connection: guard,
            organizations_table: &self.organizations_table,
            open: true,
        }))
    }

    fn load_agent(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, StoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                &format!("SELECT {AGENT_COLUMNS} FROM agents WHERE id = ?1"),
                params![agent_id.as_str()],
                read_agent_row,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        row.map(AgentRow::into_record).transpose()
    }

    fn list_agents(&self, company_id: &OrganizationId) -> Result<Vec<AgentRecord>, StoreError> {
        let rows = {
            let guard = self.lock()?;
            let mut statement = guard
                .prepare(&format!(
                    "SELECT {AGENT_COLUMNS} FROM agents WHERE company_id = ?1 ORDER BY \
                     created_at, id"
                ))
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mapped = statement
                .query_map(params![company_id.as_str()], read_agent_row)
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            mapped
                .collect::<Result<Vec<AgentRow>, _>>()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        };
        rows.into_iter().map(AgentRow::into_record).collect()
    }
}

// ============================================================================
// SECTION: Transaction
// ============================================================================

/// Open `SQLite` transaction holding the connection mutex.
struct SqliteTransaction<'a> {
    /// Locked connection.
    connection: MutexGuard<'a, Connection>,
    /// Quoted organizations table name.
    organizations_table: &'a str,
    /// True until `COMMIT` or `ROLLBACK` succeeds.
    open: bool,
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn find_organization(
        &mut self,
        company_id: &OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        let row = self
            .connection
            .query_row(
                &format!("SELECT id, name FROM {} WHERE id = ?1", self.organizations_table),
                params![company_id.as_str()],
                |row| {
                    let id: String = row.get(0)?;
                    let name: Option<String> = row.get(1)?;
                    Ok((id, name))
                },
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(row.map(|(id, name)| Organization {
            id: OrganizationId::new(id),
            name,
        }))
    }

    fn insert_agent(&mut self, record: &AgentRecord) -> Result<(), StoreError> {
        let row = AgentRow::from_record(record)?;
        self.connection
            .execute(
                &format!("INSERT INTO agents ({AGENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                params![
                    row.id,
                    row.company_id,
                    row.agent_type,
                    row.system_prompt,
                    row.tools_json,
                    row.rag_config_json,
                    row.created_at
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.connection
            .execute_batch("COMMIT")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        self.open = false;
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<(), StoreError> {
        self.connection
            .execute_batch("ROLLBACK")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        self.open = false;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.connection.execute_batch("ROLLBACK");
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps an `agents` row into column values.
fn read_agent_row(row: &Row<'_>) -> rusqlite::Result<AgentRow> {
    Ok(AgentRow {
        id: row.get(0)?,
        company_id: row.get(1)?,
        agent_type: row.get(2)?,
        system_prompt: row.get(3)?,
        tools_json: row.get(4)?,
        rag_config_json: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Quotes a plain SQL identifier, rejecting anything else.
fn quote_identifier(name: &str) -> Result<String, SqliteStoreError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !valid {
        return Err(SqliteStoreError::Invalid(format!("invalid table name {name:?}")));
    }
    Ok(format!("\"{name}\""))
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = wal; PRAGMA synchronous = full;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(
    connection: &mut Connection,
    organizations_table: &str,
) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "expected schema version {SCHEMA_VERSION}, found {value}"
            )));
        }
    }
    tx.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {organizations_table} (
            id TEXT PRIMARY KEY,
            name TEXT
        );
        CREATE TABLE IF NOT EXISTS agents (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            agent_type TEXT NOT NULL,
            system_prompt TEXT NOT NULL,
            tools_json TEXT NOT NULL,
            rag_config_json TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_agents_company ON agents (company_id, created_at);"
    ))
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
