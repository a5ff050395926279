// SPDX-License-Identifier: PMPL-1.0-or-later
//! JSON-backed host document.
//!
//! Mirrors the editor SDK field names so exported documents and the demo
//! mock load unchanged. Both `pages[].children` and
//! `pages[].artboards[].children` layouts are accepted.

use super::{Container, DocumentShape, ElementKind, Fill, HostDocument, HostNode};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Sample document used by `canvasbot demo`
const SAMPLE_DOCUMENT: &str = include_str!("../../demos/sample-document.json");

/// A design document loaded from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonDocument {
    /// `None` when the source carried no document at all
    #[serde(default)]
    pub pages: Option<Vec<JsonPage>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonPage {
    #[serde(default)]
    pub children: Option<Vec<JsonNode>>,
    #[serde(default)]
    pub artboards: Option<Vec<JsonArtboard>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonArtboard {
    #[serde(default)]
    pub children: Option<Vec<JsonNode>>,
}

/// The parent back-reference as a host serializes it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonParent {
    #[serde(default)]
    pub fill: Option<Fill>,
}

/// Hosts report weights as numbers or CSS keywords
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    Numeric(f64),
    Named(String),
}

impl FontWeight {
    pub fn value(&self) -> Option<f64> {
        match self {
            FontWeight::Numeric(w) => Some(*w),
            FontWeight::Named(name) => match name.trim().to_lowercase().as_str() {
                "normal" | "regular" => Some(400.0),
                "bold" => Some(700.0),
                "lighter" => Some(300.0),
                "bolder" => Some(800.0),
                other => other.parse().ok(),
            },
        }
    }
}

/// One element of a JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonNode {
    #[serde(rename = "type", default)]
    pub kind: ElementKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_weight: Option<FontWeight>,
    #[serde(default)]
    pub line_height: Option<f64>,
    #[serde(default)]
    pub fill: Option<Fill>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_interactive: Option<bool>,
    #[serde(default)]
    pub parent: Option<JsonParent>,
    #[serde(default)]
    pub children: Option<Vec<JsonNode>>,
}

#[async_trait]
impl HostNode for JsonNode {
    async fn kind(&self) -> Result<ElementKind> {
        Ok(self.kind)
    }

    async fn text(&self) -> Result<Option<String>> {
        Ok(self.text.clone())
    }

    async fn font_size(&self) -> Result<Option<f64>> {
        Ok(self.font_size)
    }

    async fn font_weight(&self) -> Result<Option<f64>> {
        match &self.font_weight {
            None => Ok(None),
            Some(weight) => weight
                .value()
                .map(Some)
                .ok_or_else(|| Error::HostAccess(format!("unrecognized font weight {:?}", weight))),
        }
    }

    async fn line_height(&self) -> Result<Option<f64>> {
        Ok(self.line_height)
    }

    async fn fill(&self) -> Result<Option<Fill>> {
        Ok(self.fill.clone())
    }

    async fn alt_text(&self) -> Result<Option<String>> {
        Ok(self.alt_text.clone())
    }

    async fn is_interactive(&self) -> Result<Option<bool>> {
        Ok(self.is_interactive)
    }

    async fn parent_fill(&self) -> Result<Option<Fill>> {
        Ok(self.parent.as_ref().and_then(|p| p.fill.clone()))
    }

    async fn children(&self) -> Result<Option<Vec<&dyn HostNode>>> {
        Ok(self.children.as_ref().map(|nodes| as_host_nodes(nodes)))
    }
}

fn as_host_nodes(nodes: &[JsonNode]) -> Vec<&dyn HostNode> {
    nodes.iter().map(|n| n as &dyn HostNode).collect()
}

fn container<'a>(label: String, children: &'a Option<Vec<JsonNode>>) -> Container<'a> {
    Container {
        label,
        children: children.as_deref().map(as_host_nodes).unwrap_or_default(),
    }
}

impl JsonDocument {
    /// Load a document from a JSON file
    pub async fn from_path(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        content.parse()
    }

    /// The bundled sample document
    pub fn sample() -> Self {
        serde_json::from_str(SAMPLE_DOCUMENT).unwrap_or_default()
    }

    /// Whether any page carries artboards
    pub fn is_nested(&self) -> bool {
        self.pages
            .iter()
            .flatten()
            .any(|page| page.artboards.is_some())
    }
}

impl FromStr for JsonDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[async_trait]
impl HostDocument for JsonDocument {
    async fn shape(&self) -> Result<DocumentShape<'_>> {
        let pages = self
            .pages
            .as_ref()
            .ok_or_else(|| Error::NoDocument("document has no pages".to_string()))?;

        if self.is_nested() {
            let nested = pages
                .iter()
                .enumerate()
                .map(|(p, page)| match &page.artboards {
                    Some(artboards) => artboards
                        .iter()
                        .enumerate()
                        .map(|(a, board)| container(format!("page {} artboard {}", p + 1, a + 1), &board.children))
                        .collect(),
                    // A page without artboards still contributes its own children
                    None => vec![container(format!("page {}", p + 1), &page.children)],
                })
                .collect();
            Ok(DocumentShape::Nested(nested))
        } else {
            let flat = pages
                .iter()
                .enumerate()
                .map(|(p, page)| container(format!("page {}", p + 1), &page.children))
                .collect();
            Ok(DocumentShape::Flat(flat))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::materialize;

    const FLAT: &str = r#"{
        "pages": [{
            "children": [
                {"type": "text", "text": "Hello", "fontSize": 16, "fontWeight": "bold"},
                {"type": "group", "children": [{"type": "image", "altText": ""}]}
            ]
        }]
    }"#;

    const NESTED: &str = r#"{
        "pages": [{
            "artboards": [
                {"children": [{"type": "text", "text": "Hello", "fontSize": 16}]},
                {"children": null}
            ]
        }]
    }"#;

    #[tokio::test]
    async fn test_flat_shape() {
        let doc: JsonDocument = FLAT.parse().unwrap();
        let shape = doc.shape().await.unwrap();
        assert_eq!(shape.name(), "flat");
        let containers = shape.containers();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].children.len(), 2);
    }

    #[tokio::test]
    async fn test_nested_shape() {
        let doc: JsonDocument = NESTED.parse().unwrap();
        assert!(doc.is_nested());
        let shape = doc.shape().await.unwrap();
        assert_eq!(shape.name(), "nested");
        let containers = shape.containers();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0].children.len(), 1);
        assert!(containers[1].children.is_empty());
    }

    #[tokio::test]
    async fn test_missing_pages_is_no_document() {
        let doc: JsonDocument = "{}".parse().unwrap();
        assert!(matches!(doc.shape().await, Err(Error::NoDocument(_))));
    }

    #[tokio::test]
    async fn test_materialize_json_node() {
        let doc: JsonDocument = FLAT.parse().unwrap();
        let containers = doc.shape().await.unwrap().containers();
        let text = materialize(containers[0].children[0]).await.unwrap();
        assert_eq!(text.kind, ElementKind::Text);
        assert_eq!(text.font_weight, Some(700.0));

        let group = materialize(containers[0].children[1]).await.unwrap();
        assert_eq!(group.children.len(), 1);
        assert_eq!(group.children[0].alt_text.as_deref(), Some(""));
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(FontWeight::Named("normal".into()).value(), Some(400.0));
        assert_eq!(FontWeight::Named("600".into()).value(), Some(600.0));
        assert_eq!(FontWeight::Named("heavy-ish".into()).value(), None);
        assert_eq!(FontWeight::Numeric(700.0).value(), Some(700.0));
    }

    #[test]
    fn test_sample_document_loads() {
        let doc = JsonDocument::sample();
        assert!(doc.is_nested());
        assert_eq!(doc.pages.as_ref().map(|p| p.len()), Some(1));
    }
}
