// crates/kogna-factory/src/prompt.rs
// ============================================================================
// Module: Prompt Compositor
// Description: Fills template placeholders from onboarding answers.
// Purpose: Produce the agent system prompt.
// Dependencies: kogna-core
// ============================================================================

//! ## Overview
//! Composition is a single left-to-right pass over the template replacing
//! every `{{company_name}}`, `{{product}}` and `{{objective}}` token. Values
//! are inserted literally and never rescanned, so a value containing a token
//! is not expanded again. Unknown `{{...}}` sequences are left untouched.

use kogna_core::OnboardingData;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Company name used when onboarding omits it.
pub const DEFAULT_COMPANY_NAME: &str = "our company";
/// Product description used when onboarding omits it.
pub const DEFAULT_PRODUCT: &str = "our products and services";
/// Objective used when onboarding omits it.
pub const DEFAULT_OBJECTIVE: &str = "help customers and close sales";
/// Heading placed before caller-supplied rules.
pub const CUSTOM_RULES_HEADING: &str = "\n\n## Custom Rules\n";

/// Company name placeholder.
pub const COMPANY_NAME_TOKEN: &str = "{{company_name}}";
/// Product placeholder.
pub const PRODUCT_TOKEN: &str = "{{product}}";
/// Objective placeholder.
pub const OBJECTIVE_TOKEN: &str = "{{objective}}";

// ============================================================================
// SECTION: Composition
// ============================================================================

/// Builds the system prompt from a template and onboarding answers.
///
/// Blank answers fall back to the defaults above. `custom_rules` is appended
/// under [`CUSTOM_RULES_HEADING`] when it contains non-whitespace text.
#[must_use]
pub fn compose_prompt(
    template: &str,
    onboarding: &OnboardingData,
    custom_rules: Option<&str>,
) -> String {
    let replacements = [
        (COMPANY_NAME_TOKEN, answer_or(onboarding.company_name.as_deref(), DEFAULT_COMPANY_NAME)),
        (PRODUCT_TOKEN, answer_or(onboarding.product.as_deref(), DEFAULT_PRODUCT)),
        (OBJECTIVE_TOKEN, answer_or(onboarding.objective.as_deref(), DEFAULT_OBJECTIVE)),
    ];
    let mut prompt = substitute(template, &replacements);
    if let Some(rules) = custom_rules.filter(|rules| !rules.trim().is_empty()) {
        prompt.push_str(CUSTOM_RULES_HEADING);
        prompt.push_str(rules);
    }
    prompt
}

/// Returns the answer unless it is missing or blank.
fn answer_or<'a>(answer: Option<&'a str>, default: &'a str) -> &'a str {
    match answer {
        Some(value) if !value.trim().is_empty() => value,
        _ => default,
    }
}

/// Replaces every token occurrence in one pass.
fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match replacements.iter().find(|(token, _)| candidate.starts_with(token)) {
            Some((token, value)) => {
                output.push_str(value);
                rest = &candidate[token.len()..];
            }
            None => {
                output.push_str("{{");
                rest = &candidate[2..];
            }
        }
    }
    output.push_str(rest);
    output
}
