// crates/kogna-factory/src/ids.rs
// ============================================================================
// Module: Agent Id Generator
// Description: Timestamp-based agent identifiers.
// Purpose: Issue `agent_<org-prefix>_<millis>` ids that never repeat in-process.
// Dependencies: kogna-core, time
// ============================================================================

//! ## Overview
//! Ids embed the creation time in unix milliseconds. The generator remembers
//! the last millisecond it issued and bumps forward when the clock has not
//! advanced. Factories share [`AgentIdGenerator::process`], so ids never
//! repeat within one process however many factories it builds. Separate
//! processes may still collide; the store's primary key rejects duplicates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use kogna_core::AgentId;
use kogna_core::OrganizationId;
use time::OffsetDateTime;

/// Nanoseconds per millisecond.
const NANOS_PER_MILLI: i128 = 1_000_000;

/// Generator shared by every factory in the process.
static PROCESS_GENERATOR: AgentIdGenerator = AgentIdGenerator::new();

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Issues strictly increasing agent timestamps and ids.
#[derive(Debug, Default)]
pub struct AgentIdGenerator {
    /// Last issued unix millisecond.
    last_millis: AtomicU64,
}

impl AgentIdGenerator {
    /// Creates a generator with no history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_millis: AtomicU64::new(0),
        }
    }

    /// Returns the process-wide generator.
    #[must_use]
    pub fn process() -> &'static Self {
        &PROCESS_GENERATOR
    }

    /// Issues an id and creation time using the system clock.
    #[must_use]
    pub fn next(&self, company_id: &OrganizationId) -> (AgentId, OffsetDateTime) {
        self.issue_at(company_id, OffsetDateTime::now_utc())
    }

    /// Issues an id and creation time for a caller-supplied clock reading.
    ///
    /// The returned time is `now` truncated to milliseconds, or one
    /// millisecond past the previous issue when `now` is not later.
    #[must_use]
    pub fn issue_at(
        &self,
        company_id: &OrganizationId,
        now: OffsetDateTime,
    ) -> (AgentId, OffsetDateTime) {
        let now_millis = u64::try_from(now.unix_timestamp_nanos() / NANOS_PER_MILLI).unwrap_or(0);
        let mut last = self.last_millis.load(Ordering::Acquire);
        let issued = loop {
            let candidate = now_millis.max(last.saturating_add(1));
            match self.last_millis.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break candidate,
                Err(actual) => last = actual,
            }
        };
        let created_at =
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(issued) * NANOS_PER_MILLI)
                .unwrap_or(now);
        (AgentId::for_organization(company_id, issued), created_at)
    }
}
