// crates/kogna-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for the message catalog.
// Purpose: Ensure catalog keys are unique and placeholders substitute.
// Dependencies: kogna-cli i18n module
// ============================================================================

use std::collections::BTreeSet;

use crate::i18n::CATALOG_ITEMS;
use crate::i18n::MessageArg;
use crate::i18n::catalog;
use crate::i18n::translate;

#[test]
fn catalog_keys_are_unique() {
    let keys: BTreeSet<&str> = CATALOG_ITEMS.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys.len(), CATALOG_ITEMS.len());
    assert_eq!(catalog().len(), CATALOG_ITEMS.len());
}

#[test]
fn translate_substitutes_placeholders() {
    let output = translate(
        "store.open_failed",
        vec![MessageArg::new("backend", "sqlite"), MessageArg::new("error", "locked")],
    );
    assert_eq!(output, "Failed to open sqlite store: locked");
}

#[test]
fn missing_key_falls_back_to_key() {
    assert_eq!(translate("no.such.key", Vec::new()), "no.such.key");
}

#[test]
fn macro_formats_display_values() {
    let output = crate::t!("org.add.ok", id = "org-7");
    assert_eq!(output, "Organization org-7 saved.");
}
