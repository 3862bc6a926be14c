//! jsfront_locator: Find the AST node under a source range.
//!
//! A query is a closed byte interval `[left, right]`. A zero-width query
//! (`left == right`) is a cursor position: if it falls on or at the edge of
//! a literal, `this` or an identifier, that node is the answer. Otherwise
//! the answer is the node whose range is exactly the query, or failing
//! that, the most specific node covering it.

use jsfront_ast::{walk, AstNode, Walk};
use jsfront_core::text::TextPos;

/// Find the node matching `[left, right]` below `root`. The root itself is
/// never returned; `None` when no descendant covers the query.
pub fn find_node<'a>(root: &'a dyn AstNode, left: TextPos, right: TextPos) -> Option<&'a dyn AstNode> {
    debug_assert!(left <= right);
    let cursor = left == right;
    let mut at_root = true;
    let mut found = None;
    let mut best = None;

    walk(root, &mut |node: &'a dyn AstNode| {
        if std::mem::take(&mut at_root) {
            return Walk::Continue;
        }
        let range = node.range();
        if !range.touches(left, right) {
            return Walk::Prune;
        }
        let exact = if cursor {
            node.kind().is_atomic_leaf() && range.contains_inclusive(left)
        } else {
            range.start == left && range.end == right
        };
        if exact {
            found = Some(node);
            return Walk::Stop;
        }
        // Pre-order: a later container is nested in an earlier one.
        if range.start <= left && right <= range.end {
            best = Some(node);
        }
        Walk::Continue
    });

    found.or(best)
}
