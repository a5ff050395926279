// SPDX-License-Identifier: PMPL-1.0-or-later
//! Structural rule - WCAG 1.1.1 Non-text Content / 1.3.1 Info and Relationships

use crate::config::RulesConfig;
use crate::error::Result;
use crate::host::ElementKind;
use crate::issue::{Category, Issue, Severity};
use crate::rules::Rule;
use crate::walker::Visited;

/// Groups with more children than this are hard to navigate by screen reader
const MAX_GROUP_CHILDREN: usize = 10;

/// Group complexity and alt-text rule
pub struct StructuralRule;

impl Rule for StructuralRule {
    fn name(&self) -> &str {
        "Structure and Alt Text"
    }

    fn description(&self) -> &str {
        "Checks group complexity and alternative text on shapes and images (1.1.1/1.3.1)"
    }

    fn check(&self, visited: &Visited<'_>, _config: &RulesConfig) -> Result<Vec<Issue>> {
        let element = visited.element;
        let mut issues = Vec::new();

        match element.kind {
            ElementKind::Group if element.children.len() > MAX_GROUP_CHILDREN => {
                issues.push(
                    Issue::new(Severity::Info, Category::Structural, "Complex Group Structure")
                        .with_description(format!("Group contains {} elements.", element.children.len()))
                        .with_suggestion(
                            "Consider simplifying complex groups for better screen reader navigation.",
                        )
                        .with_wcag("1.3.1")
                        .on_element(element.kind),
                );
            }
            ElementKind::Shape | ElementKind::Image => {
                let has_alt = element
                    .alt_text
                    .as_deref()
                    .is_some_and(|alt| !alt.trim().is_empty());
                if !has_alt {
                    issues.push(
                        Issue::new(Severity::Error, Category::AltText, "Missing Alt Text")
                            .with_description(format!("{} element lacks alternative text.", element.kind))
                            .with_suggestion(
                                "Add descriptive alt text for screen readers and assistive technologies.",
                            )
                            .with_wcag("1.1.1")
                            .on_element(element.kind),
                    );
                }
            }
            _ => {}
        }

        Ok(issues)
    }
}
