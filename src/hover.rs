// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hover breadcrumbs for container and key names

use serde::{Deserialize, Serialize};

use crate::schema::{Schema, SchemaNode, StackMode, resolve_stack};
use crate::syntax::{Bias, Node, NodeKind, SyntaxTree};

/// Titles of the schema entries along a hovered path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverInfo {
    /// Start of the hovered path
    pub from: usize,
    /// End of the hovered segment
    pub to: usize,
    /// Entry titles, outermost first
    pub titles: Vec<String>,
}

/// Resolves hover information against one schema
#[derive(Debug, Clone, Copy)]
pub struct HoverResolver<'a> {
    schema: &'a Schema,
}

impl<'a> HoverResolver<'a> {
    /// Create a resolver over `schema`
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Hover at a pointer offset
    ///
    /// The node starting at `offset` wins; an identifier ending there is used
    /// when nothing starts at the offset.
    pub fn hover_at(&self, tree: &SyntaxTree, offset: usize) -> Option<HoverInfo> {
        let node = tree.resolve_inner(offset, Bias::After);
        let node = if is_identifier(node) {
            node
        } else {
            tree.resolve_inner(offset, Bias::Before)
        };
        self.hover(node, offset)
    }

    /// Hover over `node` with the pointer at `offset`
    ///
    /// The path is cut after the segment under the pointer, so hovering
    /// `server` in `server.main` shows only the `server` breadcrumb. Paths
    /// that stop resolving part way keep the titles found so far.
    pub fn hover(&self, node: Node<'_>, offset: usize) -> Option<HoverInfo> {
        let text = node.text();
        let cursor = offset.checked_sub(node.from())?;
        let tail = text.get(cursor..)?;
        let end = tail.find('.').map_or(text.len(), |dot| cursor + dot);
        let path = &text[..end];

        let titles: Vec<String> = match node.kind() {
            NodeKind::ContainerIdentifier => titles(&self.schema.containers, path),
            NodeKind::ValueIdentifier => titles(&self.schema.keys, path),
            _ => return None,
        };

        if titles.is_empty() {
            log::trace!("no hover for '{path}'");
            return None;
        }

        Some(HoverInfo {
            from: node.from(),
            to: node.from() + end,
            titles,
        })
    }
}

fn is_identifier(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        NodeKind::ContainerIdentifier | NodeKind::ValueIdentifier
    )
}

fn titles<N: SchemaNode>(roots: &[N], path: &str) -> Vec<String> {
    resolve_stack(roots, path, StackMode::Partial)
        .into_iter()
        .map(|entry| entry.title().to_string())
        .collect()
}
