// crates/kogna-factory/src/registry.rs
// ============================================================================
// Module: Registry Writer
// Description: JSON artifacts for committed agent records.
// Purpose: Keep a file copy of every agent, regenerable from the database.
// Dependencies: kogna-core, serde_json
// ============================================================================

//! ## Overview
//! Each committed agent is written as pretty-printed JSON to
//! `<registry_dir>/<agent_id>.json`. Writes go to a sibling temp file that is
//! synced and renamed over the target, so readers never observe a partial
//! artifact. The directory is created on demand.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use kogna_core::AgentId;
use kogna_core::AgentRecord;
use thiserror::Error;

/// Maximum artifact size accepted when reading back.
const MAX_ARTIFACT_BYTES: u64 = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry artifact errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Agent id cannot be used as a file name.
    #[error("agent id {0:?} is not a safe file name")]
    UnsafeId(String),
    /// Filesystem failure.
    #[error("registry io error at {path}: {message}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// Record could not be encoded or decoded.
    #[error("registry json error at {path}: {message}")]
    Json {
        /// Artifact path.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Writes and reads agent artifacts under one directory.
#[derive(Debug, Clone)]
pub struct RegistryWriter {
    /// Artifact directory.
    dir: PathBuf,
}

impl RegistryWriter {
    /// Creates a writer rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }

    /// Returns the artifact directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the artifact path for an agent id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnsafeId`] when the id contains characters
    /// outside `[A-Za-z0-9_-]`.
    pub fn path_for(&self, agent_id: &AgentId) -> Result<PathBuf, RegistryError> {
        if !agent_id.is_file_safe() {
            return Err(RegistryError::UnsafeId(agent_id.as_str().to_string()));
        }
        Ok(self.dir.join(format!("{}.json", agent_id.as_str())))
    }

    /// Writes `record` atomically and returns the artifact path.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the id is unsafe, encoding fails, or
    /// any filesystem step fails.
    pub fn write(&self, record: &AgentRecord) -> Result<PathBuf, RegistryError> {
        let path = self.path_for(&record.id)?;
        let mut contents = serde_json::to_string_pretty(record).map_err(|err| RegistryError::Json {
            path: path.clone(),
            message: err.to_string(),
        })?;
        contents.push('\n');
        fs::create_dir_all(&self.dir).map_err(|err| io_error(&self.dir, &err))?;
        let temp_path = path.with_extension("json.tmp");
        let result = write_synced(&temp_path, contents.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &path).map_err(|err| io_error(&path, &err)));
        if let Err(err) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
        Ok(path)
    }

    /// Reads an artifact back.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the file is missing, too large, or not
    /// a valid agent record.
    pub fn read(&self, agent_id: &AgentId) -> Result<AgentRecord, RegistryError> {
        let path = self.path_for(agent_id)?;
        let metadata = fs::metadata(&path).map_err(|err| io_error(&path, &err))?;
        if metadata.len() > MAX_ARTIFACT_BYTES {
            return Err(RegistryError::Io {
                path,
                message: format!("artifact exceeds {MAX_ARTIFACT_BYTES} bytes"),
            });
        }
        let bytes = fs::read(&path).map_err(|err| io_error(&path, &err))?;
        serde_json::from_slice(&bytes).map_err(|err| RegistryError::Json {
            path,
            message: err.to_string(),
        })
    }
}

/// Writes `bytes` to `path` and flushes them to disk.
fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), RegistryError> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|err| io_error(path, &err))?;
    file.write_all(bytes).map_err(|err| io_error(path, &err))?;
    file.sync_all().map_err(|err| io_error(path, &err))
}

/// Maps an I/O error to a registry error for `path`.
fn io_error(path: &Path, err: &std::io::Error) -> RegistryError {
    RegistryError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
