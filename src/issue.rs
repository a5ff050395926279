// SPDX-License-Identifier: PMPL-1.0-or-later
//! Issue types produced by the rule evaluator.
//!
//! An [`Issue`] is created once and never mutated; advice is attached by
//! building an enriched copy with [`Issue::with_advice`].

use crate::host::ElementKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails WCAG AA or blocks a class of users
    Error,
    /// Should be addressed
    Warning,
    /// Informational
    Info,
}

impl Severity {
    /// Points this severity costs the compliance score
    pub fn penalty(&self) -> u32 {
        match self {
            Severity::Error => 15,
            Severity::Warning => 5,
            Severity::Info => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// What an issue is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Contrast,
    FontSize,
    AltText,
    TextReadability,
    InteractiveElements,
    Structural,
    /// Document-level failure, not tied to an element
    Error,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Contrast,
        Category::FontSize,
        Category::AltText,
        Category::TextReadability,
        Category::InteractiveElements,
        Category::Structural,
        Category::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Contrast => "contrast",
            Category::FontSize => "font-size",
            Category::AltText => "alt-text",
            Category::TextReadability => "text-readability",
            Category::InteractiveElements => "interactive-elements",
            Category::Structural => "structural",
            Category::Error => "error",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected accessibility problem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Unique identifier
    pub id: Uuid,
    /// error | warning | info
    pub severity: Severity,
    pub category: Category,
    pub title: String,
    pub description: String,
    pub suggestion: String,
    /// WCAG success criterion (e.g. "1.4.3")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag_criterion: Option<String>,
    /// Kind of the element the issue was found on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_kind: Option<ElementKind>,
    /// Human-readable color pair, e.g. "#c8c8c8 on #ffffff"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Remediation advice attached after the scan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_advice: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Issue {
    /// Create a new issue
    pub fn new(severity: Severity, category: Category, title: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            category,
            title: title.to_string(),
            description: String::new(),
            suggestion: String::new(),
            wcag_criterion: None,
            element_kind: None,
            colors: None,
            font_size: None,
            ai_advice: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    /// Set the WCAG criterion reference
    pub fn with_wcag(mut self, criterion: &str) -> Self {
        self.wcag_criterion = Some(criterion.to_string());
        self
    }

    /// Record the kind of element the issue was found on
    pub fn on_element(mut self, kind: ElementKind) -> Self {
        self.element_kind = Some(kind);
        self
    }

    pub fn with_colors(mut self, colors: impl Into<String>) -> Self {
        self.colors = Some(colors.into());
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Copy of this issue carrying remediation advice
    pub fn with_advice(&self, advice: impl Into<String>) -> Self {
        Self {
            ai_advice: Some(advice.into()),
            ..self.clone()
        }
    }

    /// Normalized cache key over the fields that shape advice.
    ///
    /// Absent fields are skipped so issues differing only in unknown
    /// context share a key.
    pub fn fingerprint(&self) -> String {
        let kind = self.element_kind.map(|k| k.as_str().to_string());
        let font_size = self.font_size.map(|s| s.to_string());
        [
            Some(self.category.as_str().to_string()),
            Some(self.title.clone()),
            kind,
            self.colors.clone(),
            font_size,
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("|")
        .to_lowercase()
    }
}
