// SPDX-License-Identifier: PMPL-1.0-or-later
//! Prompt construction and structured-response parsing
//!
//! The batch prompt asks for one block per issue:
//!
//! ```text
//! [ISSUE 1]
//! RECOMMENDATION: ...
//! IMPLEMENTATION: ...
//! WHY IT MATTERS: ...
//! WCAG: ...
//! ```
//!
//! Only the first line after each label is used.

use regex::Regex;
use std::sync::LazyLock;

use super::{fallback_advice, AdviceContext};
use crate::error::{Error, Result};
use crate::issue::Issue;

static ISSUE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ISSUE \d+\]").expect("valid regex"));

const RECOMMENDATION: &str = "RECOMMENDATION:";
const IMPLEMENTATION: &str = "IMPLEMENTATION:";
const WHY_IT_MATTERS: &str = "WHY IT MATTERS:";
const WCAG: &str = "WCAG:";

const PERSONA: &str =
    "You are an expert accessibility consultant specializing in WCAG 2.1 guidelines.";

/// Prompt covering every issue in one request
pub fn batch_prompt(issues: &[Issue], context: &AdviceContext) -> String {
    let mut issue_list = String::new();
    for (index, issue) in issues.iter().enumerate() {
        issue_list.push_str(&format!(
            "\n{}. ISSUE: {}\n   Type: {}\n   Description: {}\n   Current suggestion: {}\n   Context: {}",
            index + 1,
            issue.title,
            issue.category,
            issue.description,
            or_placeholder(&issue.suggestion, "None provided"),
            issue
                .element_kind
                .map(|kind| kind.to_string())
                .unwrap_or_else(|| "Unknown element".to_string()),
        ));
        if index + 1 < issues.len() {
            issue_list.push('\n');
        }
    }

    format!(
        "{PERSONA}\n\n\
         I have {count} accessibility issues from a design that need expert advice. \
         Please provide specific, actionable recommendations for each issue.\n\n\
         ACCESSIBILITY ISSUES:\n{issue_list}\n\n\
         DESIGN CONTEXT:\n\
         - Design tool: {tool}\n\
         - Target audience: {audience}\n\
         - Compliance goal: {goal}\n\n\
         Please respond with EXACTLY this format for each issue:\n\n\
         [ISSUE 1]\n\
         {RECOMMENDATION} [2-3 sentence actionable advice]\n\
         {IMPLEMENTATION} [Specific steps to fix]\n\
         {WHY_IT_MATTERS} [Impact on users with disabilities]\n\
         {WCAG} [Relevant success criteria if applicable]\n\n\
         [ISSUE 2]\n\
         [Continue for all issues...]\n\n\
         Keep each recommendation concise but specific. \
         Focus on practical solutions designers can implement in {tool}.",
        count = issues.len(),
        tool = context.design_tool,
        audience = context.audience,
        goal = context.compliance_goal,
    )
}

/// Free-form prompt for a single issue
pub fn issue_prompt(issue: &Issue, context: &AdviceContext) -> String {
    let font_size = issue.font_size.map(|size| format!("{}px", size));

    format!(
        "{PERSONA}\n\n\
         ACCESSIBILITY ISSUE:\n\
         - Type: {category}\n\
         - Title: {title}\n\
         - Description: {description}\n\
         - Current suggestion: {suggestion}\n\n\
         DESIGN CONTEXT:\n\
         - Design tool: {tool}\n\
         - Element type: {kind}\n\
         - Current colors: {colors}\n\
         - Font size: {font_size}\n\n\
         Please provide:\n\
         1. A clear, actionable recommendation (2-3 sentences)\n\
         2. Specific implementation steps\n\
         3. Why this matters for users with disabilities\n\
         4. WCAG success criteria reference if applicable\n\n\
         Keep the response concise, practical, and focused on the specific issue. \
         Avoid generic advice.",
        category = issue.category,
        title = issue.title,
        description = issue.description,
        suggestion = or_placeholder(&issue.suggestion, "None provided"),
        tool = context.design_tool,
        kind = issue
            .element_kind
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        colors = issue.colors.as_deref().unwrap_or("Not specified"),
        font_size = font_size.as_deref().unwrap_or("Not specified"),
    )
}

/// Parse a batch response into exactly one advice string per issue.
///
/// Blocks beyond the issue count are ignored; missing or empty blocks get
/// the category fallback. A response without any `[ISSUE n]` marker is an
/// error so the caller can fall back for the whole batch.
pub fn parse_batch_response(response: &str, issues: &[Issue]) -> Result<Vec<String>> {
    if !ISSUE_MARKER.is_match(response) {
        return Err(Error::MalformedResponse(
            "response contains no [ISSUE n] markers".to_string(),
        ));
    }

    let mut advice: Vec<String> = ISSUE_MARKER
        .split(response)
        .skip(1)
        .zip(issues)
        .map(|(block, issue)| {
            let combined = combine_block(block.trim());
            if combined.is_empty() {
                fallback_advice(issue.category).to_string()
            } else {
                combined
            }
        })
        .collect();

    advice.extend(
        issues[advice.len()..]
            .iter()
            .map(|issue| fallback_advice(issue.category).to_string()),
    );

    Ok(advice)
}

fn combine_block(block: &str) -> String {
    let mut advice = extract_section(block, RECOMMENDATION).to_string();

    let implementation = extract_section(block, IMPLEMENTATION);
    if !implementation.is_empty() {
        advice.push_str(&format!(" Implementation: {}", implementation));
    }
    let why = extract_section(block, WHY_IT_MATTERS);
    if !why.is_empty() {
        advice.push_str(&format!(" This matters because: {}", why));
    }
    let wcag = extract_section(block, WCAG);
    if !wcag.is_empty() {
        advice.push_str(&format!(" ({})", wcag));
    }

    advice
}

/// Text after `label` up to the end of its line, trimmed. Empty when the
/// label is absent.
pub fn extract_section<'a>(block: &'a str, label: &str) -> &'a str {
    let Some(start) = block.find(label) else {
        return "";
    };
    let rest = &block[start + label.len()..];
    let end = rest.find('\n').unwrap_or(rest.len());
    rest[..end].trim()
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}
