// SPDX-License-Identifier: PMPL-1.0-or-later
//! Interactive element rule - WCAG 2.4.4 Link Purpose / 2.5.5 Target Size
//!
//! An element counts as interactive when the host flags it, or when its
//! text mentions "click" or "button". Long text blocks are reported here
//! too since they share the same text inspection.

use crate::config::RulesConfig;
use crate::error::Result;
use crate::host::ElementKind;
use crate::issue::{Category, Issue, Severity};
use crate::rules::{font_size, word_count, Rule};
use crate::walker::Visited;

/// Link phrases that say nothing about their destination
const GENERIC_LINK_TEXT: &[&str] = &["click here", "read more"];

const MIN_DESCRIPTIVE_CHARS: usize = 4;
const MIN_INTERACTIVE_FONT_SIZE: f64 = 16.0;
const LONG_BLOCK_CHARS: usize = 100;
const LONG_BLOCK_WORDS: usize = 25;

/// Interactive affordance and text-block rule
pub struct InteractiveRule;

impl Rule for InteractiveRule {
    fn name(&self) -> &str {
        "Interactive Elements"
    }

    fn description(&self) -> &str {
        "Checks interactive elements for descriptive text and touch-friendly size (2.4.4/2.5.5)"
    }

    fn check(&self, visited: &Visited<'_>, _config: &RulesConfig) -> Result<Vec<Issue>> {
        let element = visited.element;
        let text = element.text_content();
        let lower = text.to_lowercase();
        let chars = text.chars().count();
        let mut issues = Vec::new();

        if is_interactive(element.is_interactive, &lower) {
            if chars < MIN_DESCRIPTIVE_CHARS {
                issues.push(
                    Issue::new(Severity::Error, Category::InteractiveElements, "Interactive Element Too Small")
                        .with_description("Interactive elements should have descriptive text for screen readers.")
                        .with_suggestion(
                            "Add clear, descriptive text that explains the action (e.g., \"Submit form\" instead of \"Submit\").",
                        )
                        .with_wcag("2.4.4")
                        .on_element(element.kind),
                );
            }

            if GENERIC_LINK_TEXT.contains(&lower.as_str()) {
                issues.push(
                    Issue::new(Severity::Warning, Category::InteractiveElements, "Generic Link Text")
                        .with_description(
                            "Generic phrases like \"click here\" don't provide context for screen readers.",
                        )
                        .with_suggestion("Use descriptive text that explains where the link goes or what it does.")
                        .with_wcag("2.4.4")
                        .on_element(element.kind),
                );
            }

            let size = font_size(element);
            if size < MIN_INTERACTIVE_FONT_SIZE {
                issues.push(
                    Issue::new(Severity::Warning, Category::InteractiveElements, "Small Interactive Element")
                        .with_description(format!(
                            "Interactive element has {}px text, which may be hard to tap on mobile.",
                            size
                        ))
                        .with_suggestion(
                            "Use at least 16px font size for interactive elements to meet mobile accessibility guidelines.",
                        )
                        .with_wcag("2.5.5")
                        .on_element(element.kind)
                        .with_font_size(size),
                );
            }
        }

        if element.kind == ElementKind::Text && chars > LONG_BLOCK_CHARS {
            let words = word_count(text);
            if words > LONG_BLOCK_WORDS {
                issues.push(
                    Issue::new(Severity::Info, Category::TextReadability, "Long Text Block")
                        .with_description(format!("Text contains {} words in a single block.", words))
                        .with_suggestion(
                            "Consider breaking long text into shorter paragraphs or using headers to improve readability.",
                        )
                        .with_wcag("1.4.8")
                        .on_element(element.kind),
                );
            }
        }

        Ok(issues)
    }
}

/// Host flag, or text that reads like a control (`lower` is lowercased)
pub fn is_interactive(flagged: bool, lower: &str) -> bool {
    flagged || lower.contains("click") || lower.contains("button")
}
