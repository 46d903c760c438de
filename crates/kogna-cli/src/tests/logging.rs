// crates/kogna-cli/src/tests/logging.rs
// ============================================================================
// Module: Logging Setup Tests
// Description: Unit tests for log filter parsing.
// Purpose: Ensure bad directives fail before a subscriber is installed.
// Dependencies: kogna-cli logging module
// ============================================================================

use crate::logging::LoggingError;
use crate::logging::env_filter;

#[test]
fn accepts_level_and_target_directives() {
    assert!(env_filter("info").is_ok());
    assert!(env_filter(" kogna_factory=debug,warn ").is_ok());
}

#[test]
fn rejects_malformed_directive() {
    let err = env_filter("kogna_factory=loud").expect_err("bad level");
    assert!(matches!(err, LoggingError::Filter { .. }));
}
