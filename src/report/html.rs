// SPDX-License-Identifier: PMPL-1.0-or-later
//! Standalone HTML report

use super::Report;
use crate::issue::Severity;

const STYLE: &str = "\
        body { font-family: Arial, sans-serif; margin: 40px; }
        .header { background: #667eea; color: white; padding: 20px; border-radius: 8px; }
        .score { font-size: 24px; font-weight: bold; color: #4CAF50; }
        .issue { border-left: 4px solid #ff6b6b; padding: 15px; margin: 10px 0; background: #f9f9f9; }
        .warning { border-left-color: #ffa726; }
        .info { border-left-color: #42a5f5; }
        .advice { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 12px; border-radius: 8px; margin-top: 12px; }
        .advice h4 { margin: 0 0 8px 0; font-size: 14px; }
        .advice p { margin: 0; font-size: 13px; line-height: 1.5; }
        footer { margin-top: 40px; text-align: center; color: #666; }
";

pub(super) fn generate_html_report(report: &Report) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"utf-8\">\n    \
         <title>Accessibility Report</title>\n    <style>\n{STYLE}    </style>\n</head>\n<body>\n"
    ));
    html.push_str(&format!(
        "    <div class=\"header\">\n        <h1>Accessibility Report</h1>\n        \
         <p>Generated on {}</p>\n    </div>\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "    <div class=\"summary\">\n        \
         <h2>Overall Score: <span class=\"score\">{}/100</span></h2>\n        \
         <p><strong>Elements Analyzed:</strong> {}</p>\n        \
         <p><strong>Issues Found:</strong> {}</p>\n        \
         <p><strong>WCAG Compliance Level:</strong> {}</p>\n    </div>\n\n",
        report.score,
        report.total_elements,
        report.issues.len(),
        report.compliance_level()
    ));

    html.push_str("    <h2>Issues Detected</h2>\n");
    if report.issues.is_empty() {
        html.push_str("    <p>No accessibility issues found!</p>\n");
    }

    for issue in &report.issues {
        let class = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        html.push_str(&format!(
            "    <div class=\"issue {}\">\n        <h3>{}</h3>\n        \
             <p><strong>Description:</strong> {}</p>\n        \
             <p><strong>Suggestion:</strong> {}</p>\n",
            class,
            escape(&issue.title),
            escape(&issue.description),
            escape(&issue.suggestion)
        ));
        if let Some(ref advice) = issue.ai_advice {
            html.push_str(&format!(
                "        <div class=\"advice\">\n            <h4>AI Recommendation</h4>\n            \
                 <p>{}</p>\n        </div>\n",
                escape(advice)
            ));
        }
        html.push_str("    </div>\n");
    }

    html.push_str(
        "\n    <footer>Generated by canvasbot accessibility checker</footer>\n</body>\n</html>\n",
    );
    html
}

/// Escape text for HTML element content and attribute values
pub(super) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
