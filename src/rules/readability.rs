// SPDX-License-Identifier: PMPL-1.0-or-later
//! Text readability rule - WCAG 1.4.4 Resize Text / 1.4.8 Visual Presentation / 1.4.12 Text Spacing
//!
//! Flags undersized text, overly long lines, all-caps runs and tight
//! line spacing on text elements.

use crate::config::RulesConfig;
use crate::error::Result;
use crate::host::ElementKind;
use crate::issue::{Category, Issue, Severity};
use crate::rules::{font_size, word_count, Rule};
use crate::walker::Visited;

/// Width a text box is assumed to have when estimating line length (px)
const ASSUMED_LINE_WIDTH: f64 = 300.0;
/// Average glyph width as a fraction of the font size
const AVG_CHAR_WIDTH_FACTOR: f64 = 0.6;
const AVG_WORD_LENGTH: f64 = 5.0;
const MAX_WORDS_PER_LINE: f64 = 12.0;
/// All-caps runs up to this many words (acronyms, labels) are fine
const MAX_ALL_CAPS_WORDS: usize = 3;

/// Readability rule for text elements
pub struct ReadabilityRule;

impl Rule for ReadabilityRule {
    fn name(&self) -> &str {
        "Text Readability"
    }

    fn description(&self) -> &str {
        "Checks font size, line length, letter case and line spacing (1.4.4/1.4.8/1.4.12)"
    }

    fn check(&self, visited: &Visited<'_>, config: &RulesConfig) -> Result<Vec<Issue>> {
        let element = visited.element;
        if element.kind != ElementKind::Text {
            return Ok(Vec::new());
        }

        let size = font_size(element);
        let text = element.text_content();
        let mut issues = Vec::new();

        if size < config.min_font_size {
            issues.push(
                Issue::new(Severity::Error, Category::FontSize, "Text Too Small")
                    .with_description(format!("Font size is {}px, which may be difficult to read.", size))
                    .with_suggestion(format!(
                        "Use at least {}px font size for better readability.",
                        config.min_font_size
                    ))
                    .with_wcag("1.4.4")
                    .on_element(element.kind)
                    .with_font_size(size),
            );
        }

        if !text.is_empty() {
            if estimate_words_per_line(size) > MAX_WORDS_PER_LINE {
                issues.push(
                    Issue::new(Severity::Warning, Category::TextReadability, "Long Text Lines")
                        .with_description("Lines may be too long for comfortable reading.")
                        .with_suggestion(
                            "Consider breaking long text into shorter lines (50-75 characters per line).",
                        )
                        .with_wcag("1.4.8")
                        .on_element(element.kind)
                        .with_font_size(size),
                );
            }

            if is_all_caps(text) {
                issues.push(
                    Issue::new(Severity::Warning, Category::TextReadability, "All Caps Text")
                        .with_description("All-caps text can be harder to read.")
                        .with_suggestion("Consider using normal case with bold formatting for emphasis.")
                        .with_wcag("1.4.8")
                        .on_element(element.kind)
                        .with_font_size(size),
                );
            }
        }

        if let Some(line_height) = element.line_height {
            if line_height.is_finite() && line_height < config.min_line_height {
                issues.push(
                    Issue::new(Severity::Warning, Category::TextReadability, "Tight Line Spacing")
                        .with_description(format!(
                            "Line height is {}, below the recommended minimum of {}.",
                            line_height, config.min_line_height
                        ))
                        .with_suggestion("Increase line spacing so lines of text are easy to track.")
                        .with_wcag("1.4.12")
                        .on_element(element.kind)
                        .with_font_size(size),
                );
            }
        }

        Ok(issues)
    }
}

/// Words per line for a fixed-width text box at `font_size`
pub fn estimate_words_per_line(font_size: f64) -> f64 {
    let chars_per_line = ASSUMED_LINE_WIDTH / (font_size * AVG_CHAR_WIDTH_FACTOR);
    chars_per_line / AVG_WORD_LENGTH
}

/// Text equal to its own uppercase form with more than three words.
///
/// Strings without cased characters (digits, symbols) also match.
pub fn is_all_caps(text: &str) -> bool {
    text == text.to_uppercase() && word_count(text) > MAX_ALL_CAPS_WORDS
}
