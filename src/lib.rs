// SPDX-License-Identifier: PMPL-1.0-or-later
//! Canvasbot - WCAG accessibility checker for design documents
//!
//! Walks the element tree of a design document (pages, artboards, groups),
//! checks every element against a set of WCAG 2.1 rules, scores the result
//! and can enrich each issue with remediation advice from a
//! chat-completions endpoint.
//!
//! ## Rules
//!
//! - **Contrast** (1.4.3/1.4.6): text/background contrast ratio
//! - **Readability** (1.4.4/1.4.8/1.4.12): font size, line length, all caps, line spacing
//! - **Structural** (1.1.1/1.3.1): alt text, group complexity
//! - **Interactive** (2.4.4/2.5.5): link text, touch target size, long text blocks
//!
//! ## Pipeline
//!
//! host document → [`walker`] → [`rules`] → [`report::Report`] →
//! optional [`advisor`] → [`report::generate_report`]

pub mod advisor;
pub mod color;
pub mod config;
pub mod error;
pub mod host;
pub mod issue;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod walker;

pub use config::Config;
pub use error::{Error, Result};
