// crates/kogna-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and input helpers.
// Purpose: Ensure flags parse as documented and bounded reads fail closed.
// Dependencies: kogna-cli main helpers, clap, tempfile
// ============================================================================

//! ## Overview
//! Validates the clap surface (including the `--companyId` alias), the
//! onboarding merge rules, and `read_bytes_with_limit`.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use clap::CommandFactory;
use clap::Parser;
use tempfile::TempDir;

use super::AgentsCommand;
use super::Cli;
use super::Commands;
use super::ReadLimitError;
use super::merge_onboarding;
use super::read_bytes_with_limit;
use super::read_rules_file;

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn provision_accepts_company_id_alias_and_repeated_files() {
    let cli = Cli::try_parse_from([
        "kogna",
        "provision",
        "--companyId",
        "org-1",
        "--type",
        "sales",
        "--file",
        "a.pdf",
        "--file",
        "b.pdf",
    ])
    .expect("parse");
    let Commands::Provision(command) = cli.command else {
        panic!("expected provision");
    };
    assert_eq!(command.company_id, "org-1");
    assert_eq!(command.agent_type, "sales");
    assert_eq!(command.files, vec!["a.pdf", "b.pdf"]);
}

#[test]
fn provision_rejects_both_rules_sources() {
    let result = Cli::try_parse_from([
        "kogna",
        "provision",
        "--company-id",
        "org-1",
        "--type",
        "sales",
        "--rules",
        "x",
        "--rules-file",
        "rules.md",
    ]);
    assert!(result.is_err());
}

#[test]
fn global_config_flag_follows_subcommand() {
    let cli = Cli::try_parse_from(["kogna", "agents", "show", "--id", "agent_x_1", "--config", "k.toml"])
        .expect("parse");
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("k.toml")));
    assert!(matches!(
        cli.command,
        Commands::Agents {
            command: AgentsCommand::Show { .. }
        }
    ));
}

// ============================================================================
// SECTION: Onboarding
// ============================================================================

#[test]
fn flags_override_onboarding_json() {
    let merged = merge_onboarding(
        Some(r#"{"companyName":"Json Co","product":"tea","objective":"sell"}"#),
        Some("Flag Co".to_string()),
        None,
        None,
    )
    .expect("merge");
    assert_eq!(merged.company_name.as_deref(), Some("Flag Co"));
    assert_eq!(merged.product.as_deref(), Some("tea"));
    assert_eq!(merged.objective.as_deref(), Some("sell"));
}

#[test]
fn invalid_onboarding_json_is_rejected() {
    let err = merge_onboarding(Some("[1,2]"), None, None, None).expect_err("invalid");
    assert!(err.to_string().starts_with("Invalid --onboarding JSON"));
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_allows_small_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("small.md");
    fs::write(&path, b"ok").expect("write");
    assert_eq!(read_bytes_with_limit(&path, 4).expect("read"), b"ok");
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("large.md");
    fs::write(&path, b"too large").expect("write");
    let err = read_bytes_with_limit(&path, 4).expect_err("too large");
    assert!(matches!(err, ReadLimitError::TooLarge { size: 9, limit: 4 }));
}

#[test]
fn rules_file_must_be_utf8() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("rules.md");
    fs::write(&path, [0xff, 0xfe]).expect("write");
    let err = read_rules_file(&path).expect_err("not utf8");
    assert!(err.to_string().contains("not valid UTF-8"));
}
