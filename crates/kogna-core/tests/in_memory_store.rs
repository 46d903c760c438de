// crates/kogna-core/tests/in_memory_store.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Validate transactional semantics of the in-memory store.
// Purpose: Ensure staged inserts only become visible on commit.
// Dependencies: kogna-core, serde_json, time
// ============================================================================

//! ## Overview
//! Conformance tests for [`InMemoryProvisioningStore`] plus the shared row
//! codec used by the SQL backends.

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

use kogna_core::AgentId;
use kogna_core::AgentRecord;
use kogna_core::AgentRow;
use kogna_core::AgentTools;
use kogna_core::AgentType;
use kogna_core::InMemoryProvisioningStore;
use kogna_core::Organization;
use kogna_core::OrganizationId;
use kogna_core::ProvisioningStore;
use kogna_core::RagConfig;
use kogna_core::StoreError;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn record(id: &str, company: &str, millis: i64) -> AgentRecord {
    AgentRecord {
        id: AgentId::new(id),
        company_id: OrganizationId::new(company),
        agent_type: AgentType::new("sales"),
        system_prompt: "You sell things.".to_string(),
        tools: AgentTools::standard(true),
        rag_config: RagConfig {
            vector_store: "pinecone".to_string(),
            namespace: company.to_string(),
            files: vec!["catalog.pdf".to_string()],
            indexed: false,
        },
        created_at: OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .expect("timestamp"),
    }
}

fn seeded_store() -> InMemoryProvisioningStore {
    let store = InMemoryProvisioningStore::new();
    store
        .upsert_organization(Organization {
            id: OrganizationId::new("org-1"),
            name: Some("Acme".to_string()),
        })
        .expect("seed org");
    store
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn find_organization_returns_seeded_row() {
    let store = seeded_store();
    let mut tx = store.begin().expect("begin");
    let found = tx.find_organization(&OrganizationId::new("org-1")).expect("lookup");
    assert_eq!(found.and_then(|org| org.name), Some("Acme".to_string()));
    assert!(tx.find_organization(&OrganizationId::new("missing")).expect("lookup").is_none());
    tx.rollback().expect("rollback");
}

#[test]
fn inserts_are_invisible_until_commit() {
    let store = seeded_store();
    let mut tx = store.begin().expect("begin");
    tx.insert_agent(&record("agent_a_1", "org-1", 1)).expect("insert");
    assert!(store.load_agent(&AgentId::new("agent_a_1")).expect("load").is_none());
    tx.commit().expect("commit");
    assert!(store.load_agent(&AgentId::new("agent_a_1")).expect("load").is_some());
}

#[test]
fn rollback_and_drop_discard_inserts() {
    let store = seeded_store();
    let mut tx = store.begin().expect("begin");
    tx.insert_agent(&record("agent_a_1", "org-1", 1)).expect("insert");
    tx.rollback().expect("rollback");
    {
        let mut tx = store.begin().expect("begin");
        tx.insert_agent(&record("agent_a_2", "org-1", 2)).expect("insert");
    }
    assert_eq!(store.agent_count().expect("count"), 0);
}

#[test]
fn duplicate_ids_are_rejected() {
    let store = seeded_store();
    let mut tx = store.begin().expect("begin");
    tx.insert_agent(&record("agent_a_1", "org-1", 1)).expect("insert");
    let err = tx.insert_agent(&record("agent_a_1", "org-1", 1)).expect_err("duplicate");
    assert!(matches!(err, StoreError::Store(_)));
}

#[test]
fn list_agents_filters_by_company_and_orders_by_creation() {
    let store = seeded_store();
    let mut tx = store.begin().expect("begin");
    tx.insert_agent(&record("agent_b", "org-1", 20)).expect("insert");
    tx.insert_agent(&record("agent_a", "org-1", 10)).expect("insert");
    tx.insert_agent(&record("agent_c", "org-2", 5)).expect("insert");
    tx.commit().expect("commit");
    let listed = store.list_agents(&OrganizationId::new("org-1")).expect("list");
    let ids: Vec<&str> = listed.iter().map(|agent| agent.id.as_str()).collect();
    assert_eq!(ids, vec!["agent_a", "agent_b"]);
}

#[test]
fn agent_row_codec_preserves_record_and_detects_corruption() {
    let original = record("agent_a_1", "org-1", 1_700_000_000_123);
    let row = AgentRow::from_record(&original).expect("encode");
    assert_eq!(row.created_at, "2023-11-14T22:13:20.123Z");
    assert_eq!(row.clone().into_record().expect("decode"), original);

    let mut broken = row;
    broken.tools_json = "{not json".to_string();
    assert!(matches!(broken.into_record(), Err(StoreError::Corrupt(_))));
}

#[test]
fn record_serializes_type_field_name() {
    let value = serde_json::to_value(record("agent_a_1", "org-1", 0)).expect("serialize");
    assert_eq!(value["type"], "sales");
    assert_eq!(value["tools"]["rag_enabled"], true);
    assert_eq!(value["created_at"], "1970-01-01T00:00:00Z");
}
