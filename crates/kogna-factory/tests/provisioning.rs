// crates/kogna-factory/tests/provisioning.rs
// ============================================================================
// Module: Provisioning Tests
// Description: End-to-end tests for AgentFactory::provision.
// Purpose: Validate all-or-nothing registration and artifact behavior.
// Dependencies: kogna-factory, kogna-core, kogna-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Exercises the provisioning pipeline against the in-memory and `SQLite`
//! stores, including injected commit failures.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use kogna_core::AgentId;
use kogna_core::AgentRecord;
use kogna_core::InMemoryProvisioningStore;
use kogna_core::OnboardingData;
use kogna_core::Organization;
use kogna_core::OrganizationId;
use kogna_core::ProvisioningState;
use kogna_core::ProvisioningStore;
use kogna_core::StoreError;
use kogna_core::StoreTransaction;
use kogna_factory::AgentFactory;
use kogna_factory::FactoryError;
use kogna_factory::FactorySettings;
use kogna_factory::ProvisionRequest;
use kogna_store_sqlite::SqliteProvisioningStore;
use kogna_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Store wrapper whose transactions fail at commit.
struct FailingCommitStore {
    inner: InMemoryProvisioningStore,
}

struct FailingCommitTransaction<'a> {
    inner: Box<dyn StoreTransaction + 'a>,
}

impl StoreTransaction for FailingCommitTransaction<'_> {
    fn find_organization(
        &mut self,
        company_id: &OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        self.inner.find_organization(company_id)
    }

    fn insert_agent(&mut self, record: &AgentRecord) -> Result<(), StoreError> {
        self.inner.insert_agent(record)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.rollback()?;
        Err(StoreError::Store("injected commit failure".to_string()))
    }

    fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.inner.rollback()
    }
}

impl ProvisioningStore for FailingCommitStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        Ok(Box::new(FailingCommitTransaction {
            inner: self.inner.begin()?,
        }))
    }

    fn load_agent(&self, agent_id: &AgentId) -> Result<Option<AgentRecord>, StoreError> {
        self.inner.load_agent(agent_id)
    }

    fn list_agents(&self, company_id: &OrganizationId) -> Result<Vec<AgentRecord>, StoreError> {
        self.inner.list_agents(company_id)
    }
}

fn settings(root: &Path) -> FactorySettings {
    FactorySettings {
        templates_dir: root.join("agent-templates"),
        registry_dir: root.join("agents"),
        vector_store: "pinecone".to_string(),
    }
}

fn seeded_memory_store() -> InMemoryProvisioningStore {
    let store = InMemoryProvisioningStore::new();
    store
        .upsert_organization(Organization {
            id: OrganizationId::new("org-acme"),
            name: Some("Acme".to_string()),
        })
        .expect("seed org");
    store
}

fn write_template(root: &Path, agent_type: &str, body: &str) {
    let dir = root.join("agent-templates");
    fs::create_dir_all(&dir).expect("template dir");
    fs::write(dir.join(format!("{agent_type}.md")), body).expect("write template");
}

fn request(files: &[&str]) -> ProvisionRequest {
    ProvisionRequest {
        company_id: "org-acme".to_string(),
        agent_type: "sales".to_string(),
        onboarding: OnboardingData {
            company_name: Some("Acme".to_string()),
            product: Some("rockets".to_string()),
            objective: Some("book demos".to_string()),
        },
        files: files.iter().map(|name| (*name).to_string()).collect(),
        prompt_custom: None,
    }
}

fn artifact_count(root: &Path) -> usize {
    fs::read_dir(root.join("agents")).map(|entries| entries.count()).unwrap_or(0)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn unknown_organization_writes_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_memory_store();
    let factory = AgentFactory::new(store.clone(), settings(dir.path()));
    let mut req = request(&[]);
    req.company_id = "org-missing".to_string();

    let err = factory.provision(&req).expect_err("missing org");
    assert!(matches!(err, FactoryError::OrganizationNotFound(ref id) if id.as_str() == "org-missing"));
    assert_eq!(store.agent_count().expect("count"), 0);
    assert_eq!(artifact_count(dir.path()), 0);
}

#[test]
fn template_placeholders_are_filled() {
    let dir = TempDir::new().expect("tempdir");
    write_template(
        dir.path(),
        "sales",
        "You sell {{product}} for {{company_name}}.\nGoal: {{objective}}.\nSign as {{company_name}}.",
    );
    let factory = AgentFactory::new(seeded_memory_store(), settings(dir.path()));

    let record = factory.provision(&request(&[])).expect("provision");
    assert_eq!(
        record.system_prompt,
        "You sell rockets for Acme.\nGoal: book demos.\nSign as Acme."
    );
    for token in ["{{company_name}}", "{{product}}", "{{objective}}"] {
        assert!(!record.system_prompt.contains(token));
    }
}

#[test]
fn missing_template_uses_fallback_sentence() {
    let dir = TempDir::new().expect("tempdir");
    let factory = AgentFactory::new(seeded_memory_store(), settings(dir.path()));
    let record = factory.provision(&request(&[])).expect("provision");
    assert_eq!(record.system_prompt, "You are a helpful AI sales assistant for Acme.");
}

#[test]
fn custom_rules_are_appended() {
    let dir = TempDir::new().expect("tempdir");
    let factory = AgentFactory::new(seeded_memory_store(), settings(dir.path()));
    let mut req = request(&[]);
    req.prompt_custom = Some("Reply in Spanish.".to_string());
    let record = factory.provision(&req).expect("provision");
    assert!(record.system_prompt.ends_with("\n\n## Custom Rules\nReply in Spanish."));
}

#[test]
fn rag_enabled_follows_files() {
    let dir = TempDir::new().expect("tempdir");
    let factory = AgentFactory::new(seeded_memory_store(), settings(dir.path()));

    let with_files = factory.provision(&request(&["catalog.pdf", "faq.md"])).expect("provision");
    assert!(with_files.tools.rag_enabled);
    assert!(with_files.tools.crm_access);
    assert!(with_files.tools.calendar_access);
    assert_eq!(with_files.rag_config.files, vec!["catalog.pdf", "faq.md"]);
    assert_eq!(with_files.rag_config.namespace, "org-acme");
    assert_eq!(with_files.rag_config.vector_store, "pinecone");
    assert!(!with_files.rag_config.indexed);

    let without_files = factory.provision(&request(&[])).expect("provision");
    assert!(!without_files.tools.rag_enabled);
}

#[test]
fn sequential_calls_get_distinct_ids_and_artifacts() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_memory_store();
    let factory = AgentFactory::new(store.clone(), settings(dir.path()));

    let first = factory.provision(&request(&[])).expect("first");
    let second = factory.provision(&request(&[])).expect("second");
    assert_ne!(first.id, second.id);
    assert!(first.id.as_str().starts_with("agent_org-acme_"));
    assert_eq!(store.agent_count().expect("count"), 2);
    assert_eq!(artifact_count(dir.path()), 2);

    let listed = factory.agents(&OrganizationId::new("org-acme")).expect("list");
    assert_eq!(listed, vec![first, second]);
}

#[test]
fn artifact_matches_committed_record() {
    let dir = TempDir::new().expect("tempdir");
    let factory = AgentFactory::new(seeded_memory_store(), settings(dir.path()));
    let record = factory.provision(&request(&["deck.pdf"])).expect("provision");

    let path = dir.path().join("agents").join(format!("{}.json", record.id));
    let json: serde_json::Value =
        serde_json::from_slice(&fs::read(&path).expect("artifact")).expect("json");
    assert_eq!(json["id"], record.id.as_str());
    assert_eq!(json["company_id"], "org-acme");
    assert_eq!(json["type"], "sales");
    assert_eq!(json["tools"]["rag_enabled"], true);
    assert_eq!(factory.registry().read(&record.id).expect("read back"), record);
    assert_eq!(factory.agent(&record.id).expect("show"), record);
}

#[test]
fn commit_failure_leaves_no_row_and_no_artifact() {
    let dir = TempDir::new().expect("tempdir");
    let inner = seeded_memory_store();
    let store = FailingCommitStore {
        inner: inner.clone(),
    };
    let factory = AgentFactory::new(store, settings(dir.path()));

    let err = factory.provision(&request(&["deck.pdf"])).expect_err("commit fails");
    assert!(matches!(
        err,
        FactoryError::Store {
            state: ProvisioningState::Registered,
            ..
        }
    ));
    assert_eq!(inner.agent_count().expect("count"), 0);
    assert_eq!(artifact_count(dir.path()), 0);
}

#[test]
fn invalid_agent_type_is_rejected_before_io() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_memory_store();
    let factory = AgentFactory::new(store.clone(), settings(dir.path()));
    for bad in ["../secrets", "Sales", "", "a b"] {
        let mut req = request(&[]);
        req.agent_type = bad.to_string();
        let err = factory.provision(&req).expect_err("invalid type");
        assert!(matches!(err, FactoryError::InvalidRequest(_)), "{bad}: {err}");
    }
    assert_eq!(store.agent_count().expect("count"), 0);
}

#[test]
fn unreadable_template_rolls_back() {
    let dir = TempDir::new().expect("tempdir");
    let template_path = dir.path().join("agent-templates").join("sales.md");
    fs::create_dir_all(&template_path).expect("directory in place of template");
    let store = seeded_memory_store();
    let factory = AgentFactory::new(store.clone(), settings(dir.path()));

    let err = factory.provision(&request(&[])).expect_err("template read fails");
    assert!(matches!(err, FactoryError::Template(_)));
    assert_eq!(store.agent_count().expect("count"), 0);
}

#[test]
fn artifact_failure_after_commit_reports_agent_and_export_repairs() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("agents"), b"not a directory").expect("block registry dir");
    let store = seeded_memory_store();
    let factory = AgentFactory::new(store.clone(), settings(dir.path()));

    let err = factory.provision(&request(&[])).expect_err("artifact fails");
    let FactoryError::Artifact {
        agent_id,
        ..
    } = err
    else {
        panic!("expected artifact error");
    };
    assert_eq!(store.agent_count().expect("count"), 1);

    fs::remove_file(dir.path().join("agents")).expect("unblock");
    let path = factory.export(&agent_id).expect("export");
    assert!(path.ends_with(format!("{agent_id}.json")));
    assert_eq!(factory.registry().read(&agent_id).expect("read").id, agent_id);
}

#[test]
fn export_of_unknown_agent_fails() {
    let dir = TempDir::new().expect("tempdir");
    let factory = AgentFactory::new(seeded_memory_store(), settings(dir.path()));
    let err = factory.export(&AgentId::new("agent_missing_1")).expect_err("missing");
    assert!(matches!(err, FactoryError::AgentNotFound(_)));
}

#[test]
fn sqlite_backend_provisions_and_recreates_deleted_artifact() {
    let dir = TempDir::new().expect("tempdir");
    let store =
        SqliteProvisioningStore::new(&SqliteStoreConfig::new(dir.path().join("kogna.db")))
            .expect("sqlite store");
    store
        .upsert_organization(&Organization {
            id: OrganizationId::new("org-acme"),
            name: Some("Acme".to_string()),
        })
        .expect("seed");
    let factory = AgentFactory::new(store, settings(dir.path()));

    let record = factory.provision(&request(&["deck.pdf"])).expect("provision");
    let path = dir.path().join("agents").join(format!("{}.json", record.id));
    fs::remove_file(&path).expect("delete artifact");
    assert_eq!(factory.export(&record.id).expect("export"), path);
    assert_eq!(factory.registry().read(&record.id).expect("read"), record);
    assert_eq!(factory.agent(&record.id).expect("show"), record);
}

#[test]
fn factories_sharing_a_store_never_reuse_ids() {
    let dir = TempDir::new().expect("tempdir");
    let store = seeded_memory_store();
    let first = AgentFactory::new(store.clone(), settings(dir.path()));
    let second = AgentFactory::new(store.clone(), settings(dir.path()));

    let mut ids = Vec::new();
    for _ in 0..200 {
        ids.push(first.provision(&request(&[])).expect("first factory").id);
        ids.push(second.provision(&request(&[])).expect("second factory").id);
    }
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(store.agent_count().expect("count"), 400);
    assert_eq!(artifact_count(dir.path()), 400);
}
