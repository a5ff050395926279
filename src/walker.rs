// SPDX-License-Identifier: PMPL-1.0-or-later
//! Element tree walker.
//!
//! Flattens a snapshot tree into depth-first pre-order: each element is
//! emitted before its children. The containing element travels along so
//! the contrast rule can resolve an inherited background.

use crate::error::{Error, Result};
use crate::host::{Element, MAX_DEPTH};

/// An element reached during traversal
#[derive(Debug, Clone, Copy)]
pub struct Visited<'a> {
    pub element: &'a Element,
    /// Containing element, `None` for container-level roots
    pub parent: Option<&'a Element>,
    /// 0 for roots
    pub depth: usize,
}

/// Flatten `root` and its descendants, root first
pub fn flatten(root: &Element) -> Result<Vec<Visited<'_>>> {
    let mut out = Vec::new();
    visit(root, None, 0, &mut out)?;
    Ok(out)
}

/// Flatten a container's top-level elements. The container itself is not
/// an element and is not emitted.
pub fn flatten_children(children: &[Element]) -> Result<Vec<Visited<'_>>> {
    let mut out = Vec::new();
    for child in children {
        visit(child, None, 0, &mut out)?;
    }
    Ok(out)
}

fn visit<'a>(
    element: &'a Element,
    parent: Option<&'a Element>,
    depth: usize,
    out: &mut Vec<Visited<'a>>,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::Traversal { max_depth: MAX_DEPTH });
    }
    out.push(Visited { element, parent, depth });
    for child in &element.children {
        visit(child, Some(element), depth + 1, out)?;
    }
    Ok(())
}
