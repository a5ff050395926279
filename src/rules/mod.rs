// SPDX-License-Identifier: PMPL-1.0-or-later
//! Accessibility rules evaluated per element.
//!
//! Each rule module covers one group of WCAG criteria. Rules are
//! independent and stateless: for every element all rules run, in the
//! fixed order contrast, readability, structural, interactive, and their
//! issues are concatenated. A rule that fails on an element is skipped for
//! that element only.

pub mod contrast;
pub mod interactive;
pub mod readability;
pub mod structural;

use crate::config::RulesConfig;
use crate::error::Result;
use crate::host::Element;
use crate::issue::Issue;
use crate::walker::Visited;
use tracing::warn;

/// Font size assumed when the host reports none
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Trait implemented by all rules
pub trait Rule: Send + Sync {
    /// Human-readable name of this rule
    fn name(&self) -> &str;

    /// Short description of what this rule checks
    fn description(&self) -> &str;

    /// Check one element in its traversal context
    fn check(&self, visited: &Visited<'_>, config: &RulesConfig) -> Result<Vec<Issue>>;
}

/// All rules, in evaluation order
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(contrast::ContrastRule),
        Box::new(readability::ReadabilityRule),
        Box::new(structural::StructuralRule),
        Box::new(interactive::InteractiveRule),
    ]
}

/// Run every rule on one element
pub fn evaluate_element(visited: &Visited<'_>, config: &RulesConfig) -> Vec<Issue> {
    evaluate_with(&all_rules(), visited, config)
}

/// Run every rule on a flattened sequence, preserving discovery order
pub fn evaluate(elements: &[Visited<'_>], config: &RulesConfig) -> Vec<Issue> {
    let rules = all_rules();
    elements
        .iter()
        .flat_map(|visited| evaluate_with(&rules, visited, config))
        .collect()
}

fn evaluate_with(rules: &[Box<dyn Rule>], visited: &Visited<'_>, config: &RulesConfig) -> Vec<Issue> {
    let mut issues = Vec::new();
    for rule in rules {
        match rule.check(visited, config) {
            Ok(found) => issues.extend(found),
            Err(e) => warn!(
                "{} skipped {} element: {}",
                rule.name(),
                visited.element.kind,
                e
            ),
        }
    }
    issues
}

/// Font size with the host default applied. Zero and non-finite sizes
/// count as unset; negative sizes are kept so they fail the minimums.
pub(crate) fn font_size(element: &Element) -> f64 {
    match element.font_size {
        Some(size) if size.is_finite() && size != 0.0 => size,
        _ => DEFAULT_FONT_SIZE,
    }
}

pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
