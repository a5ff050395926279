// SPDX-License-Identifier: PMPL-1.0-or-later
//! Scan results, scoring and report generation.
//!
//! Supports multiple output formats:
//! - Text: human-readable issues grouped by severity
//! - JSON: structured report for programmatic consumption
//! - HTML: standalone document for sharing

mod html;

use crate::issue::{Category, Issue, Severity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Compliance score of an issue list.
///
/// 100 minus 15 per error, 5 per warning and 2 per info, clamped to
/// `0..=100`. A scan that saw no elements scores 100.
pub fn score(issues: &[Issue], total_elements: usize) -> u32 {
    if total_elements == 0 {
        return 100;
    }
    let penalty: u32 = issues.iter().map(|issue| issue.severity.penalty()).sum();
    100u32.saturating_sub(penalty)
}

/// Compliance band derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComplianceLevel {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "Needs Work")]
    NeedsWork,
}

impl ComplianceLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= 90 {
            ComplianceLevel::Aaa
        } else if score >= 70 {
            ComplianceLevel::Aa
        } else {
            ComplianceLevel::NeedsWork
        }
    }
}

impl std::fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceLevel::Aaa => write!(f, "AAA"),
            ComplianceLevel::Aa => write!(f, "AA"),
            ComplianceLevel::NeedsWork => write!(f, "Needs Work"),
        }
    }
}

/// Outcome of one scan
#[derive(Debug, Clone)]
pub struct Report {
    pub issues: Vec<Issue>,
    pub total_elements: usize,
    pub score: u32,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Build a report, scoring `issues`
    pub fn new(issues: Vec<Issue>, total_elements: usize) -> Self {
        let score = score(&issues, total_elements);
        Self {
            issues,
            total_elements,
            score,
            generated_at: Utc::now(),
        }
    }

    pub fn compliance_level(&self) -> ComplianceLevel {
        ComplianceLevel::from_score(self.score)
    }

    pub fn by_severity(&self, severity: Severity) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }

    /// Issue count per category, omitting categories with no issues
    pub fn category_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for category in Category::ALL {
            let n = self.issues.iter().filter(|i| i.category == category).count();
            if n > 0 {
                counts.insert(category.as_str(), n);
            }
        }
        counts
    }

    /// Same scan with advice attached to each issue, in order
    pub fn with_advice(&self, advice: &[String]) -> Self {
        let issues = self
            .issues
            .iter()
            .zip(advice)
            .map(|(issue, text)| issue.with_advice(text.as_str()))
            .chain(self.issues.iter().skip(advice.len()).cloned())
            .collect();
        Self {
            issues,
            ..self.clone()
        }
    }
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// Standalone HTML document
    Html,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Generate a report in the requested format
pub fn generate_report(report: &Report, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(report),
        OutputFormat::Json => generate_json_report(report),
        OutputFormat::Html => html::generate_html_report(report),
    }
}

fn generate_text_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("=== Canvasbot Accessibility Report ===\n\n");
    output.push_str(&format!(
        "Score: {}/100 ({})\nElements analyzed: {}\n\n",
        report.score,
        report.compliance_level(),
        report.total_elements
    ));

    if report.issues.is_empty() {
        output.push_str("No accessibility issues found. All checks passed.\n");
        return output;
    }

    let errors = report.by_severity(Severity::Error).len();
    let warnings = report.by_severity(Severity::Warning).len();
    output.push_str(&format!(
        "Found {} issue(s): {} error(s), {} warning(s), {} info\n\n",
        report.issues.len(),
        errors,
        warnings,
        report.issues.len() - errors - warnings
    ));

    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        let issues = report.by_severity(severity);
        if issues.is_empty() {
            continue;
        }

        output.push_str(&format!("--- {} ({}) ---\n", severity, issues.len()));

        for issue in issues {
            output.push_str(&format!("[{}] {}\n", issue.category, issue.title));
            if !issue.description.is_empty() {
                output.push_str(&format!("  {}\n", issue.description));
            }
            if let Some(ref criterion) = issue.wcag_criterion {
                output.push_str(&format!("  WCAG: {}\n", criterion));
            }
            if !issue.suggestion.is_empty() {
                output.push_str(&format!("  Fix: {}\n", issue.suggestion));
            }
            if let Some(ref advice) = issue.ai_advice {
                output.push_str(&format!("  Advice: {}\n", advice));
            }
            output.push('\n');
        }
    }

    output
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    timestamp: DateTime<Utc>,
    compliance_score: u32,
    compliance_level: ComplianceLevel,
    total_elements: usize,
    total_violations: usize,
    violations: &'a [Issue],
    summary: BTreeMap<&'static str, usize>,
}

fn generate_json_report(report: &Report) -> String {
    let json = JsonReport {
        timestamp: report.generated_at,
        compliance_score: report.score,
        compliance_level: report.compliance_level(),
        total_elements: report.total_elements,
        total_violations: report.issues.len(),
        violations: &report.issues,
        summary: report.category_counts(),
    };

    serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize report: {}\"}}", e)
    })
}
