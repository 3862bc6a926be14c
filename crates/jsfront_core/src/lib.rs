//! jsfront_core: Shared text positions and line tracking.

pub mod text;

pub use text::{LineAndColumn, LineMap, TextPos, TextRange, TextSpan};
