// SPDX-License-Identifier: PMPL-1.0-or-later
//! Host document access.
//!
//! The editor SDK hands out element properties asynchronously and any read
//! may fail. [`HostNode`] models each property as an explicit async read;
//! [`materialize`] turns a host node into an owned [`Element`] snapshot so
//! the rules can stay synchronous. A failed read is logged and replaced by
//! its default, it never aborts the scan.

pub mod json;

use crate::color::Color;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

pub use json::JsonDocument;

/// Maximum nesting accepted from a host document
pub const MAX_DEPTH: usize = 64;

/// Element type as reported by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Shape,
    Group,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Shape => "shape",
            ElementKind::Group => "group",
            ElementKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element fill. Only solid fills have a determinable color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Fill {
    Solid { color: Color },
    /// Gradients, patterns, image fills
    #[serde(other)]
    Unsupported,
}

impl Fill {
    pub fn solid(color: Color) -> Self {
        Fill::Solid { color }
    }

    /// The fill color, if the fill is solid
    pub fn solid_color(&self) -> Option<Color> {
        match self {
            Fill::Solid { color } => Some(*color),
            Fill::Unsupported => None,
        }
    }
}

/// Synchronous snapshot of a host element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<f64>,
    pub line_height: Option<f64>,
    pub fill: Option<Fill>,
    pub alt_text: Option<String>,
    pub is_interactive: bool,
    /// Fill of the host's parent back-reference, when the host supplies one
    pub parent_fill: Option<Fill>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            text: None,
            font_size: None,
            font_weight: None,
            line_height: None,
            fill: None,
            alt_text: None,
            is_interactive: false,
            parent_fill: None,
            children: Vec::new(),
        }
    }

    /// Text element with a font size
    pub fn text(content: &str, font_size: f64) -> Self {
        Self {
            text: Some(content.to_string()),
            font_size: Some(font_size),
            ..Self::new(ElementKind::Text)
        }
    }

    pub fn with_font_weight(mut self, weight: f64) -> Self {
        self.font_weight = Some(weight);
        self
    }

    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = Some(line_height);
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_parent_fill(mut self, fill: Fill) -> Self {
        self.parent_fill = Some(fill);
        self
    }

    pub fn with_alt_text(mut self, alt: &str) -> Self {
        self.alt_text = Some(alt.to_string());
        self
    }

    pub fn interactive(mut self) -> Self {
        self.is_interactive = true;
        self
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    /// Text content, empty when absent
    pub fn text_content(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// One element of a host document, read property by property
#[async_trait]
pub trait HostNode: Send + Sync {
    async fn kind(&self) -> Result<ElementKind>;

    async fn text(&self) -> Result<Option<String>>;

    async fn font_size(&self) -> Result<Option<f64>>;

    async fn font_weight(&self) -> Result<Option<f64>>;

    async fn line_height(&self) -> Result<Option<f64>>;

    async fn fill(&self) -> Result<Option<Fill>>;

    async fn alt_text(&self) -> Result<Option<String>>;

    async fn is_interactive(&self) -> Result<Option<bool>>;

    /// Fill of the parent back-reference, if the host exposes one
    async fn parent_fill(&self) -> Result<Option<Fill>>;

    /// `None` for leaves
    async fn children(&self) -> Result<Option<Vec<&dyn HostNode>>>;
}

/// A page, or an artboard of a page, holding top-level elements
pub struct Container<'a> {
    pub label: String,
    pub children: Vec<&'a dyn HostNode>,
}

/// The two document layouts hosts hand out, resolved once per scan
pub enum DocumentShape<'a> {
    /// `pages[].children`
    Flat(Vec<Container<'a>>),
    /// `pages[].artboards[].children`
    Nested(Vec<Vec<Container<'a>>>),
}

impl<'a> DocumentShape<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentShape::Flat(_) => "flat",
            DocumentShape::Nested(_) => "nested",
        }
    }

    /// All containers in document order
    pub fn containers(self) -> Vec<Container<'a>> {
        match self {
            DocumentShape::Flat(pages) => pages,
            DocumentShape::Nested(pages) => pages.into_iter().flatten().collect(),
        }
    }
}

/// A whole host document
#[async_trait]
pub trait HostDocument: Send + Sync {
    /// Resolve the document layout. Fails when no document is available.
    async fn shape(&self) -> Result<DocumentShape<'_>>;
}

/// Snapshot a host node and its subtree
pub async fn materialize(node: &dyn HostNode) -> Result<Element> {
    materialize_at(node, 0).await
}

fn materialize_at<'a>(
    node: &'a dyn HostNode,
    depth: usize,
) -> Pin<Box<dyn Future<Output = Result<Element>> + Send + 'a>> {
    Box::pin(async move {
        if depth > MAX_DEPTH {
            return Err(Error::Traversal { max_depth: MAX_DEPTH });
        }

        let kind = read(node.kind().await, "type").unwrap_or(ElementKind::Unknown);
        let mut element = Element::new(kind);
        element.text = read(node.text().await, "text").flatten();
        element.font_size = read(node.font_size().await, "fontSize").flatten();
        element.font_weight = read(node.font_weight().await, "fontWeight").flatten();
        element.line_height = read(node.line_height().await, "lineHeight").flatten();
        element.fill = read(node.fill().await, "fill").flatten();
        element.alt_text = read(node.alt_text().await, "altText").flatten();
        element.is_interactive = read(node.is_interactive().await, "isInteractive")
            .flatten()
            .unwrap_or(false);
        element.parent_fill = read(node.parent_fill().await, "parent.fill").flatten();

        if let Some(children) = read(node.children().await, "children").flatten() {
            for child in children {
                element.children.push(materialize_at(child, depth + 1).await?);
            }
        }

        debug!("Materialized {} element at depth {}", kind, depth);
        Ok(element)
    })
}

fn read<T>(result: Result<T>, property: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Host read of '{}' failed, using default: {}", property, e);
            None
        }
    }
}
