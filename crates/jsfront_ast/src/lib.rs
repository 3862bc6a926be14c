//! jsfront_ast: Abstract syntax tree for JavaScript.
//!
//! Every node carries a half-open byte range into the source. Keyword and
//! label decorations are nodes of their own; punctuation is recorded as
//! offsets on the node that owns it. Children never refer to their parents.

pub mod kind;
pub mod node;
pub mod visitor;

pub use kind::NodeKind;
pub use node::*;
pub use visitor::{children, walk, AstNode, Walk};
