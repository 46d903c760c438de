// crates/kogna-factory/src/template.rs
// ============================================================================
// Module: Template Loader
// Description: Reads per-agent-type prompt templates from disk.
// Purpose: Supply the base prompt, falling back when no template exists.
// Dependencies: kogna-core, tracing
// ============================================================================

//! ## Overview
//! Templates are Markdown files named `<agent_type>.md` inside one directory.
//! A missing file is not an error: the loader logs a warning and returns
//! [`FALLBACK_TEMPLATE`]. Any other read failure, an oversized file, or
//! non-UTF-8 content fails the load.
//!
//! Security posture: agent types are validated as file stems before a path
//! is built, and reads are capped at [`MAX_TEMPLATE_BYTES`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use kogna_core::AgentType;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prompt used when no template exists for the agent type.
pub const FALLBACK_TEMPLATE: &str = "You are a helpful AI sales assistant for {{company_name}}.";
/// Maximum template size in bytes.
pub const MAX_TEMPLATE_BYTES: u64 = 1024 * 1024;
/// Template file extension.
const TEMPLATE_EXTENSION: &str = "md";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Template loading errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template exists but could not be read.
    #[error("template {path} could not be read: {message}")]
    Io {
        /// Template path.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// Template exceeds the size limit.
    #[error("template {path} exceeds {max} bytes")]
    TooLarge {
        /// Template path.
        path: PathBuf,
        /// Size limit in bytes.
        max: u64,
    },
    /// Template is not valid UTF-8.
    #[error("template {path} is not valid utf-8")]
    NotUtf8 {
        /// Template path.
        path: PathBuf,
    },
}

// ============================================================================
// SECTION: Loaded Template
// ============================================================================

/// Where a loaded template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Read from this file.
    File(PathBuf),
    /// No file existed; the built-in fallback was used.
    Fallback,
}

/// Template body plus its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTemplate {
    /// Template origin.
    pub source: TemplateSource,
    /// Raw template text, placeholders intact.
    pub body: String,
}

impl LoadedTemplate {
    /// Returns the fallback template.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            source: TemplateSource::Fallback,
            body: FALLBACK_TEMPLATE.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Reads templates from a fixed directory.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    /// Directory holding `<agent_type>.md` files.
    dir: PathBuf,
}

impl TemplateLoader {
    /// Creates a loader rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }

    /// Returns the templates directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the template path for an agent type.
    #[must_use]
    pub fn path_for(&self, agent_type: &AgentType) -> PathBuf {
        self.dir.join(agent_type.as_str()).with_extension(TEMPLATE_EXTENSION)
    }

    /// Loads the template for `agent_type`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the file exists but cannot be read, is
    /// larger than [`MAX_TEMPLATE_BYTES`], or is not UTF-8.
    pub fn load(&self, agent_type: &AgentType) -> Result<LoadedTemplate, TemplateError> {
        let path = self.path_for(agent_type);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(
                    agent_type = %agent_type,
                    path = %path.display(),
                    "template not found, using fallback prompt"
                );
                return Ok(LoadedTemplate::fallback());
            }
            Err(err) => {
                return Err(TemplateError::Io {
                    path,
                    message: err.to_string(),
                });
            }
        };
        let mut bytes = Vec::new();
        file.take(MAX_TEMPLATE_BYTES + 1).read_to_end(&mut bytes).map_err(|err| {
            TemplateError::Io {
                path: path.clone(),
                message: err.to_string(),
            }
        })?;
        if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_TEMPLATE_BYTES {
            return Err(TemplateError::TooLarge {
                path,
                max: MAX_TEMPLATE_BYTES,
            });
        }
        let Ok(body) = String::from_utf8(bytes) else {
            return Err(TemplateError::NotUtf8 {
                path,
            });
        };
        debug!(agent_type = %agent_type, path = %path.display(), "template loaded");
        Ok(LoadedTemplate {
            source: TemplateSource::File(path),
            body,
        })
    }
}
