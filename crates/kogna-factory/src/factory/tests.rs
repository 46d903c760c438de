// crates/kogna-factory/src/factory/tests.rs
// ============================================================================
// Module: Agent Factory Unit Tests
// Description: Unit tests for provisioning progress tracking.
// Purpose: Ensure every failure path ends in the rolled-back state.
// Dependencies: kogna-core
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use kogna_core::ProvisioningState;
use kogna_core::StoreError;

use super::FactoryError;
use super::Progress;

fn registered() -> Progress {
    let mut progress = Progress::new();
    for state in [
        ProvisioningState::Verified,
        ProvisioningState::TemplateLoaded,
        ProvisioningState::PromptBuilt,
        ProvisioningState::Registered,
    ] {
        progress.advance(state).expect("legal transition");
    }
    progress
}

#[test]
fn commit_failure_keeps_reached_state_and_ends_rolled_back() {
    let mut progress = registered();
    let err = progress.store_error(StoreError::Store("commit".to_string()));
    progress.roll_back();

    assert!(matches!(
        err,
        FactoryError::Store {
            state: ProvisioningState::Registered,
            ..
        }
    ));
    assert_eq!(progress.state, ProvisioningState::RolledBack);
}

#[test]
fn rolled_back_progress_cannot_commit() {
    let mut progress = registered();
    progress.roll_back();
    let err = progress.advance(ProvisioningState::Committed).expect_err("terminal");
    assert!(matches!(
        err,
        FactoryError::Transition {
            from: ProvisioningState::RolledBack,
            to: ProvisioningState::Committed,
        }
    ));
}

#[test]
fn skipping_a_step_is_rejected() {
    let mut progress = Progress::new();
    assert!(progress.advance(ProvisioningState::PromptBuilt).is_err());
    assert_eq!(progress.state, ProvisioningState::Start);
}
