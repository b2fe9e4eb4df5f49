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

//! Classified syntax nodes
//!
//! The analyzer does not parse. It reads a tree of classified nodes built by
//! an external parser through [`TreeBuilder`], or by the reference
//! [`scanner`]. Nodes are stored in an arena in document order; [`Node`] is a
//! cheap handle that navigates parents and siblings within one level.

pub mod scanner;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use scanner::scan;

/// Kind tag of a classified node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root node spanning the whole text
    Document,
    /// `[`
    ContainerStart,
    /// Dotted container name
    ContainerIdentifier,
    /// `]`
    ContainerEnd,
    /// Dotted key name on the left of an assignment
    ValueIdentifier,
    /// `=`
    Assign,
    /// String literal
    String,
    /// Numeric literal
    Number,
    /// `true` or `false`
    Boolean,
    /// Line break
    NewLine,
    /// Comment up to the end of the line
    Comment,
    /// Text the parser could not classify
    Error,
}

impl NodeKind {
    /// Literal kinds accepted on the right of `=`
    pub const LITERALS: [NodeKind; 3] = [NodeKind::String, NodeKind::Number, NodeKind::Boolean];

    /// Tag name used by the grammar
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::ContainerStart => "ContainerStart",
            NodeKind::ContainerIdentifier => "ContainerIdentifier",
            NodeKind::ContainerEnd => "ContainerEnd",
            NodeKind::ValueIdentifier => "ValueIdentifier",
            NodeKind::Assign => "Assign",
            NodeKind::String => "String",
            NodeKind::Number => "Number",
            NodeKind::Boolean => "Boolean",
            NodeKind::NewLine => "NewLine",
            NodeKind::Comment => "Comment",
            NodeKind::Error => "Error",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag that does not name a known node kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for NodeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "Document" => NodeKind::Document,
            "ContainerStart" => NodeKind::ContainerStart,
            "ContainerIdentifier" => NodeKind::ContainerIdentifier,
            "ContainerEnd" => NodeKind::ContainerEnd,
            "ValueIdentifier" => NodeKind::ValueIdentifier,
            "Assign" => NodeKind::Assign,
            "String" => NodeKind::String,
            "Number" => NodeKind::Number,
            "Boolean" => NodeKind::Boolean,
            "NewLine" => NodeKind::NewLine,
            "Comment" => NodeKind::Comment,
            "Error" | "⚠" => NodeKind::Error,
            other => return Err(UnknownKind(other.to_string())),
        };
        Ok(kind)
    }
}

/// Byte range in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset, inclusive
    pub from: usize,
    /// End offset, exclusive
    pub to: usize,
}

impl Span {
    /// Create a span
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Zero-width span at `offset`
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }
}

/// Index of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
}

/// Which neighbour wins when an offset sits on a node boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Prefer the node ending at the offset (typing position)
    Before,
    /// Prefer the node starting at the offset (pointer position)
    After,
}

/// Classified syntax tree over a document
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    text: String,
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    /// Start building a tree over `text`
    pub fn builder(text: impl Into<String>) -> TreeBuilder {
        TreeBuilder::new(text.into())
    }

    /// Document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the document is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Root node
    pub fn root(&self) -> Node<'_> {
        self.node(NodeId(0))
    }

    /// Handle for a node id
    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    /// All nodes in document order, root first
    pub fn iter(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        (0..self.nodes.len()).map(|index| self.node(NodeId(index)))
    }

    /// Innermost node around `offset`
    ///
    /// With [`Bias::Before`] a node ending exactly at `offset` qualifies, with
    /// [`Bias::After`] a node starting there does. Falls back to the root.
    pub fn resolve_inner(&self, offset: usize, bias: Bias) -> Node<'_> {
        let mut current = self.root();
        'descend: loop {
            for child in current.children() {
                let span = child.span();
                let covers = match bias {
                    Bias::Before => span.from < offset && offset <= span.to,
                    Bias::After => span.from <= offset && offset < span.to,
                };
                if covers {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }
}

/// Handle to a node of a [`SyntaxTree`]
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    /// Node id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node kind
    pub fn kind(&self) -> NodeKind {
        self.tree.data(self.id).kind
    }

    /// Byte range
    pub fn span(&self) -> Span {
        self.tree.data(self.id).span
    }

    /// Start offset
    pub fn from(&self) -> usize {
        self.span().from
    }

    /// End offset
    pub fn to(&self) -> usize {
        self.span().to
    }

    /// Source text covered by the node
    pub fn text(&self) -> &'t str {
        let span = self.span();
        self.tree.text.get(span.from..span.to).unwrap_or_default()
    }

    /// Parent node
    pub fn parent(&self) -> Option<Node<'t>> {
        self.link(|data| data.parent)
    }

    /// Previous node on the same level
    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        self.link(|data| data.prev_sibling)
    }

    /// Next node on the same level
    pub fn next_sibling(&self) -> Option<Node<'t>> {
        self.link(|data| data.next_sibling)
    }

    /// First child
    pub fn first_child(&self) -> Option<Node<'t>> {
        self.link(|data| data.first_child)
    }

    /// Direct children in order
    pub fn children(self) -> impl Iterator<Item = Node<'t>> {
        std::iter::successors(self.first_child(), |node| node.next_sibling())
    }

    fn link(&self, select: impl Fn(&NodeData) -> Option<NodeId>) -> Option<Node<'t>> {
        select(self.tree.data(self.id)).map(|id| self.tree.node(id))
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        write!(f, "{}@{}..{} {:?}", self.kind(), span.from, span.to, self.text())
    }
}

/// Incremental construction of a [`SyntaxTree`] in document order
#[derive(Debug)]
pub struct TreeBuilder {
    text: String,
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn new(text: String) -> Self {
        let root = NodeData {
            kind: NodeKind::Document,
            span: Span::new(0, text.len()),
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
        };
        Self {
            text,
            nodes: vec![root],
            open: vec![NodeId(0)],
        }
    }

    /// Add a leaf node to the innermost open node
    pub fn leaf(&mut self, kind: NodeKind, from: usize, to: usize) -> &mut Self {
        self.attach(kind, Span::new(from, to));
        self
    }

    /// Open a node that receives the following nodes as children
    pub fn open(&mut self, kind: NodeKind, from: usize) -> &mut Self {
        let id = self.attach(kind, Span::point(from));
        self.open.push(id);
        self
    }

    /// Close the innermost open node at `to`
    pub fn close(&mut self, to: usize) -> &mut Self {
        // The root is closed by `finish`.
        if self.open.len() > 1 {
            if let Some(id) = self.open.pop() {
                self.nodes[id.0].span.to = to;
            }
        }
        self
    }

    /// Finish the tree, closing any nodes left open at the end of the text
    pub fn finish(mut self) -> SyntaxTree {
        let end = self.text.len();
        while self.open.len() > 1 {
            self.close(end);
        }
        SyntaxTree {
            text: self.text,
            nodes: self.nodes,
        }
    }

    fn attach(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = *self.open.last().unwrap_or(&NodeId(0));
        let prev = self.nodes[parent.0].last_child;

        self.nodes.push(NodeData {
            kind,
            span,
            parent: Some(parent),
            prev_sibling: prev,
            next_sibling: None,
            first_child: None,
            last_child: None,
        });

        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = Some(id);
        } else {
            self.nodes[parent.0].first_child = Some(id);
        }
        self.nodes[parent.0].last_child = Some(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assignment_tree() -> SyntaxTree {
        let mut builder = SyntaxTree::builder("port=80\n");
        builder
            .leaf(NodeKind::ValueIdentifier, 0, 4)
            .leaf(NodeKind::Assign, 4, 5)
            .leaf(NodeKind::Number, 5, 7)
            .leaf(NodeKind::NewLine, 7, 8);
        builder.finish()
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!("ContainerIdentifier".parse::<NodeKind>(), Ok(NodeKind::ContainerIdentifier));
        assert_eq!(NodeKind::Assign.to_string(), "Assign");
        assert!("Bogus".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_sibling_navigation() {
        let tree = assignment_tree();
        let number = tree.iter().find(|node| node.kind() == NodeKind::Number).unwrap();
        assert_eq!(number.text(), "80");

        let assign = number.prev_sibling().unwrap();
        assert_eq!(assign.kind(), NodeKind::Assign);
        assert_eq!(assign.prev_sibling().unwrap().text(), "port");
        assert_eq!(number.next_sibling().unwrap().kind(), NodeKind::NewLine);
        assert_eq!(number.parent().unwrap().kind(), NodeKind::Document);
        assert_eq!(tree.root().children().count(), 4);
    }

    #[test]
    fn test_iteration_order() {
        let tree = assignment_tree();
        let kinds: Vec<NodeKind> = tree.iter().map(|node| node.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Document,
                NodeKind::ValueIdentifier,
                NodeKind::Assign,
                NodeKind::Number,
                NodeKind::NewLine,
            ]
        );
    }

    #[test]
    fn test_resolve_inner_bias() {
        let tree = assignment_tree();
        assert_eq!(tree.resolve_inner(4, Bias::Before).kind(), NodeKind::ValueIdentifier);
        assert_eq!(tree.resolve_inner(4, Bias::After).kind(), NodeKind::Assign);
        assert_eq!(tree.resolve_inner(5, Bias::Before).kind(), NodeKind::Assign);
        assert_eq!(tree.resolve_inner(0, Bias::Before).kind(), NodeKind::Document);
    }

    #[test]
    fn test_nested_nodes() {
        let mut builder = SyntaxTree::builder("[a]");
        builder
            .open(NodeKind::Error, 0)
            .leaf(NodeKind::ContainerStart, 0, 1)
            .leaf(NodeKind::ContainerIdentifier, 1, 2)
            .close(2)
            .leaf(NodeKind::ContainerEnd, 2, 3);
        let tree = builder.finish();

        let wrapper = tree.root().first_child().unwrap();
        assert_eq!(wrapper.span(), Span::new(0, 2));
        assert_eq!(wrapper.children().count(), 2);
        assert_eq!(wrapper.next_sibling().unwrap().kind(), NodeKind::ContainerEnd);
        assert_eq!(tree.resolve_inner(2, Bias::Before).kind(), NodeKind::ContainerIdentifier);
    }
}
