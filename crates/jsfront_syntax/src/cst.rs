//! Concrete syntax tree nodes.
//!
//! A node records the index range of the significant tokens it spans.
//! `start` is always set; `stop` is `None` for a node that matched no tokens
//! (an elided expression, an empty argument list after recovery). A node's
//! own bounds do not always cover its last child: statement-level
//! expressions stop before their terminating `;` and recovery may attach
//! children past `stop`. [`CstNode::real_stop`] accounts for both.

use crate::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstNode {
    /// Token kind for token-rooted nodes, or a rule tag.
    pub kind: SyntaxKind,
    /// Index of the first token covered by this node.
    pub start: usize,
    /// Index of the last token covered by this node, inclusive.
    pub stop: Option<usize>,
    /// Token text, for leaves.
    pub text: Option<String>,
    pub children: Vec<CstNode>,
}

impl CstNode {
    /// An interior node.
    pub fn new(kind: SyntaxKind, start: usize, stop: Option<usize>) -> Self {
        Self {
            kind,
            start,
            stop,
            text: None,
            children: Vec::new(),
        }
    }

    /// A node that matched no tokens, positioned before token `start`.
    pub fn empty(kind: SyntaxKind, start: usize) -> Self {
        Self::new(kind, start, None)
    }

    /// A leaf wrapping the single token at `index`.
    pub fn leaf(kind: SyntaxKind, index: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            start: index,
            stop: Some(index),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<CstNode>) -> Self {
        self.children = children;
        self
    }

    pub fn push(&mut self, child: CstNode) {
        self.children.push(child);
    }

    #[inline]
    pub fn child(&self, i: usize) -> Option<&CstNode> {
        self.children.get(i)
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Whether this node matched no tokens and has no children.
    pub fn is_empty(&self) -> bool {
        self.stop.is_none() && self.children.is_empty()
    }

    /// Token text of a leaf, or the empty string.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// The index of the last token actually covered by this node or any
    /// descendant. `None` when nothing below matched a token.
    pub fn real_stop(&self) -> Option<usize> {
        let last_child = self.children.last().and_then(CstNode::real_stop);
        match (self.stop, last_child) {
            (Some(stop), Some(child)) => Some(stop.max(child)),
            (Some(stop), None) => Some(stop),
            (None, child) => child,
        }
    }

    /// The index of the first token after this node. An empty node sits at its `start`.
    pub fn after(&self) -> usize {
        self.real_stop().map_or(self.start, |stop| stop + 1)
    }
}
