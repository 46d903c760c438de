// crates/kogna-cli/src/main.rs
// ============================================================================
// Module: Kogna CLI Entry Point
// Description: Command-line interface for the Kogna agent factory.
// Purpose: Provision agents and inspect the agent registry.
// Dependencies: clap, kogna-cli, kogna-config, kogna-core, kogna-factory
// ============================================================================

//! ## Overview
//! The `kogna` binary loads `kogna.toml` (or the file named by `--config` or
//! `KOGNA_CONFIG`), installs the log subscriber, opens the configured store,
//! and dispatches one subcommand. Command output goes to stdout as JSON or a
//! single line; logs and errors go to stderr.
//!
//! Security posture: CLI inputs are untrusted; identifiers are validated by
//! the factory and file inputs are read with hard size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use kogna_cli::backend::StoreHandle;
use kogna_cli::backend::build_factory;
use kogna_cli::backend::open_store;
use kogna_cli::logging::init_logging;
use kogna_cli::t;
use kogna_config::KognaConfig;
use kogna_core::AgentId;
use kogna_core::OnboardingData;
use kogna_core::Organization;
use kogna_core::OrganizationId;
use kogna_factory::ProvisionRequest;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a `--rules-file` input.
const MAX_RULES_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "kogna", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (overrides `KOGNA_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision a new agent for an organization.
    Provision(ProvisionCommand),
    /// Inspect provisioned agents.
    Agents {
        /// Selected agents subcommand.
        #[command(subcommand)]
        command: AgentsCommand,
    },
    /// Organization utilities (`SQLite` backend only).
    Org {
        /// Selected org subcommand.
        #[command(subcommand)]
        command: OrgCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `provision`.
#[derive(Args, Debug)]
struct ProvisionCommand {
    /// Organization id.
    #[arg(long = "company-id", visible_alias = "companyId", value_name = "ID")]
    company_id: String,
    /// Agent type; selects `<type>.md` in the templates directory.
    #[arg(long = "type", value_name = "TYPE")]
    agent_type: String,
    /// Company display name.
    #[arg(long, value_name = "NAME")]
    company_name: Option<String>,
    /// Product or service being sold.
    #[arg(long, value_name = "TEXT")]
    product: Option<String>,
    /// Conversation objective.
    #[arg(long, value_name = "TEXT")]
    objective: Option<String>,
    /// Onboarding answers as a JSON object; explicit flags take precedence.
    #[arg(long, value_name = "JSON")]
    onboarding: Option<String>,
    /// Document name to record for retrieval (repeatable).
    #[arg(long = "file", value_name = "NAME")]
    files: Vec<String>,
    /// Custom rules appended to the prompt.
    #[arg(long, value_name = "TEXT", conflicts_with = "rules_file")]
    rules: Option<String>,
    /// File containing custom rules.
    #[arg(long, value_name = "PATH")]
    rules_file: Option<PathBuf>,
}

/// Agents subcommands.
#[derive(Subcommand, Debug)]
enum AgentsCommand {
    /// List agents for an organization, oldest first.
    List {
        /// Organization id.
        #[arg(long = "company-id", visible_alias = "companyId", value_name = "ID")]
        company_id: String,
    },
    /// Print one agent record.
    Show {
        /// Agent id.
        #[arg(long, value_name = "ID")]
        id: String,
    },
    /// Rewrite an agent's JSON artifact from the database.
    Export {
        /// Agent id.
        #[arg(long, value_name = "ID")]
        id: String,
    },
}

/// Org subcommands.
#[derive(Subcommand, Debug)]
enum OrgCommand {
    /// Insert or update an organization row.
    Add {
        /// Organization id.
        #[arg(long, value_name = "ID")]
        id: String,
        /// Display name.
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration.
    Validate,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads configuration and dispatches the selected command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = KognaConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    init_logging(&config.logging)
        .map_err(|err| CliError::new(t!("logging.init_failed", error = err)))?;
    debug!(
        backend = config.database.backend.as_str(),
        api_key_present = config.secrets.api_key.is_some(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Provision(command) => command_provision(&config, command),
        Commands::Agents {
            command,
        } => command_agents(&config, command),
        Commands::Org {
            command,
        } => command_org(&config, command),
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(&config),
    }
}

// ============================================================================
// SECTION: Provision Command
// ============================================================================

/// Executes `provision`.
fn command_provision(config: &KognaConfig, command: ProvisionCommand) -> CliResult<ExitCode> {
    let onboarding = merge_onboarding(
        command.onboarding.as_deref(),
        command.company_name,
        command.product,
        command.objective,
    )?;
    let prompt_custom = match (command.rules, command.rules_file) {
        (Some(rules), _) => Some(rules),
        (None, Some(path)) => Some(read_rules_file(&path)?),
        (None, None) => None,
    };
    let request = ProvisionRequest {
        company_id: command.company_id,
        agent_type: command.agent_type,
        onboarding,
        files: command.files,
        prompt_custom,
    };
    let handle = open(config)?;
    let factory = build_factory(&handle, config);
    let record = factory
        .provision(&request)
        .map_err(|err| CliError::new(t!("provision.failed", error = err)))?;
    write_json(&record)?;
    Ok(ExitCode::SUCCESS)
}

/// Combines `--onboarding` JSON with the individual answer flags.
fn merge_onboarding(
    json: Option<&str>,
    company_name: Option<String>,
    product: Option<String>,
    objective: Option<String>,
) -> CliResult<OnboardingData> {
    let mut onboarding = match json {
        Some(text) => serde_json::from_str::<OnboardingData>(text)
            .map_err(|err| CliError::new(t!("provision.onboarding_invalid", error = err)))?,
        None => OnboardingData::default(),
    };
    if company_name.is_some() {
        onboarding.company_name = company_name;
    }
    if product.is_some() {
        onboarding.product = product;
    }
    if objective.is_some() {
        onboarding.objective = objective;
    }
    Ok(onboarding)
}

/// Reads a bounded UTF-8 rules file.
fn read_rules_file(path: &Path) -> CliResult<String> {
    let kind = t!("input.kind.rules");
    let bytes = read_bytes_with_limit(path, MAX_RULES_BYTES).map_err(|err| match err {
        ReadLimitError::Io(error) => CliError::new(t!(
            "input.read_failed",
            kind = kind,
            path = path.display(),
            error = error
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    String::from_utf8(bytes)
        .map_err(|_| CliError::new(t!("input.not_utf8", kind = kind, path = path.display())))
}

// ============================================================================
// SECTION: Agents Commands
// ============================================================================

/// Dispatches `agents` subcommands.
fn command_agents(config: &KognaConfig, command: AgentsCommand) -> CliResult<ExitCode> {
    let handle = open(config)?;
    let factory = build_factory(&handle, config);
    match command {
        AgentsCommand::List {
            company_id,
        } => {
            let agents = factory
                .agents(&OrganizationId::new(company_id.trim()))
                .map_err(|err| CliError::new(t!("agents.failed", error = err)))?;
            write_json(&agents)?;
        }
        AgentsCommand::Show {
            id,
        } => {
            let record = factory
                .agent(&AgentId::new(id.trim()))
                .map_err(|err| CliError::new(t!("agents.failed", error = err)))?;
            write_json(&record)?;
        }
        AgentsCommand::Export {
            id,
        } => {
            let path = factory
                .export(&AgentId::new(id.trim()))
                .map_err(|err| CliError::new(t!("agents.failed", error = err)))?;
            write_stdout_line(&t!("agents.export.ok", path = path.display()))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Org Commands
// ============================================================================

/// Dispatches `org` subcommands.
fn command_org(config: &KognaConfig, command: OrgCommand) -> CliResult<ExitCode> {
    match command {
        OrgCommand::Add {
            id,
            name,
        } => {
            let id = OrganizationId::parse(&id)
                .map_err(|err| CliError::new(t!("org.add.invalid_id", error = err)))?;
            let handle = open(config)?;
            let Some(store) = handle.sqlite() else {
                return Err(CliError::new(t!(
                    "org.add.sqlite_only",
                    backend = config.database.backend.as_str()
                )));
            };
            store
                .upsert_organization(&Organization {
                    id: id.clone(),
                    name,
                })
                .map_err(|err| CliError::new(t!("org.add.failed", error = err)))?;
            write_stdout_line(&t!("org.add.ok", id = id))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes `config validate`; loading already validated the file.
fn command_config_validate(config: &KognaConfig) -> CliResult<ExitCode> {
    write_stdout_line(&t!("config.validate.ok", backend = config.database.backend.as_str()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Store Helpers
// ============================================================================

/// Opens the configured store.
fn open(config: &KognaConfig) -> CliResult<StoreHandle> {
    open_store(config).map_err(|err| {
        CliError::new(t!(
            "store.open_failed",
            backend = config.database.backend.as_str(),
            error = err
        ))
    })
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors raised while reading bounded inputs.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout_line(&text).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a catalog output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
