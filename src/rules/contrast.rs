// SPDX-License-Identifier: PMPL-1.0-or-later
//! Color contrast rule - WCAG 1.4.3 Contrast (Minimum) / 1.4.6 Contrast (Enhanced)
//!
//! Compares a text element's solid fill against its background:
//! - AA: 4.5:1 for normal text, 3:1 for large text
//! - AAA: 7:1 (reported as a warning when only AA is met)
//!
//! Large text is 18px and up, or 14px and up at weight 700 or more.

use crate::color::{contrast_ratio, Color};
use crate::config::RulesConfig;
use crate::error::{Error, Result};
use crate::host::{ElementKind, Fill};
use crate::issue::{Category, Issue, Severity};
use crate::rules::{font_size, Rule};
use crate::walker::Visited;

/// AA minimum for normal-size text
pub const AA_NORMAL: f64 = 4.5;
/// AA minimum for large text
pub const AA_LARGE: f64 = 3.0;
/// AAA minimum for normal-size text
pub const AAA_NORMAL: f64 = 7.0;

/// Weight assumed when the host reports none
const DEFAULT_FONT_WEIGHT: f64 = 400.0;

/// Contrast rule for text elements
pub struct ContrastRule;

impl Rule for ContrastRule {
    fn name(&self) -> &str {
        "Color Contrast"
    }

    fn description(&self) -> &str {
        "Checks text/background contrast ratios meet WCAG requirements (1.4.3/1.4.6)"
    }

    fn check(&self, visited: &Visited<'_>, config: &RulesConfig) -> Result<Vec<Issue>> {
        let element = visited.element;
        if element.kind != ElementKind::Text {
            return Ok(Vec::new());
        }
        let Some(foreground) = element.fill.as_ref().and_then(Fill::solid_color) else {
            return Ok(Vec::new());
        };

        let background = background_color(visited);
        let ratio = contrast_ratio(foreground, background);
        if !ratio.is_finite() {
            return Err(Error::InvalidElement(format!("contrast ratio {} is not finite", ratio)));
        }

        let size = font_size(element);
        let weight = element.font_weight.unwrap_or(DEFAULT_FONT_WEIGHT);
        let min_contrast = if is_large_text(size, weight) {
            AA_LARGE
        } else {
            config.contrast_threshold.unwrap_or(AA_NORMAL)
        };
        let colors = format!("{} on {}", foreground.to_hex(), background.to_hex());

        let issue = if ratio < min_contrast {
            Issue::new(Severity::Error, Category::Contrast, "Low Color Contrast")
                .with_description(format!(
                    "Text has {:.2}:1 contrast ratio, but needs {}:1 for WCAG AA compliance.",
                    ratio, min_contrast
                ))
                .with_suggestion(format!(
                    "Increase contrast by darkening text or lightening background. Current: {}",
                    colors
                ))
                .with_wcag("1.4.3")
        } else if ratio < AAA_NORMAL {
            Issue::new(Severity::Warning, Category::Contrast, "Consider Higher Contrast")
                .with_description(format!(
                    "Text meets AA standards ({:.2}:1) but falls short of AAA standards (7:1).",
                    ratio
                ))
                .with_suggestion("For better accessibility, consider increasing contrast for AAA compliance.")
                .with_wcag("1.4.6")
        } else {
            return Ok(Vec::new());
        };

        Ok(vec![issue
            .on_element(element.kind)
            .with_colors(colors)
            .with_font_size(size)])
    }
}

/// WCAG large-text exemption
pub fn is_large_text(font_size: f64, font_weight: f64) -> bool {
    font_size >= 18.0 || (font_size >= 14.0 && font_weight >= 700.0)
}

/// Background behind an element: the host's parent back-reference, else
/// the containing element, when that fill is solid. White otherwise.
pub fn background_color(visited: &Visited<'_>) -> Color {
    visited
        .element
        .parent_fill
        .as_ref()
        .or_else(|| visited.parent.and_then(|p| p.fill.as_ref()))
        .and_then(Fill::solid_color)
        .unwrap_or(Color::WHITE)
}
