// crates/kogna-cli/src/tests/backend.rs
// ============================================================================
// Module: Backend Selection Tests
// Description: Unit tests for store selection from configuration.
// Purpose: Ensure the SQLite path works end to end and Postgres fails closed.
// Dependencies: kogna-cli backend module, kogna-config, tempfile
// ============================================================================

use kogna_config::DatabaseBackend;
use kogna_config::KognaConfig;
use kogna_core::Organization;
use kogna_core::OrganizationId;
use kogna_factory::ProvisionRequest;
use tempfile::TempDir;

use crate::backend::BackendError;
use crate::backend::build_factory;
use crate::backend::open_store;

fn sqlite_config(dir: &TempDir) -> KognaConfig {
    let mut config = KognaConfig::default();
    config.database.backend = DatabaseBackend::Sqlite;
    config.database.sqlite_path = dir.path().join("kogna.db");
    config.factory.templates_dir = dir.path().join("agent-templates");
    config.factory.registry_dir = dir.path().join("agents");
    config
}

#[test]
fn sqlite_backend_seeds_and_provisions() {
    let dir = TempDir::new().expect("tempdir");
    let config = sqlite_config(&dir);
    let handle = open_store(&config).expect("open sqlite");
    handle
        .sqlite()
        .expect("sqlite handle")
        .upsert_organization(&Organization {
            id: OrganizationId::new("org-1"),
            name: Some("Acme".to_string()),
        })
        .expect("seed");

    let factory = build_factory(&handle, &config);
    let record = factory
        .provision(&ProvisionRequest {
            company_id: "org-1".to_string(),
            agent_type: "sales".to_string(),
            ..ProvisionRequest::default()
        })
        .expect("provision");
    assert_eq!(record.system_prompt, "You are a helpful AI sales assistant for our company.");
    assert!(dir.path().join("agents").join(format!("{}.json", record.id)).exists());
}

#[test]
fn postgres_backend_without_url_fails_closed() {
    let config = KognaConfig::default();
    assert_eq!(config.database.backend, DatabaseBackend::Postgres);
    assert!(matches!(open_store(&config), Err(BackendError::MissingDatabaseUrl)));
}
