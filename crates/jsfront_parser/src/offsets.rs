//! Token index to source offset mapping.

use jsfront_core::text::TextPos;
use jsfront_syntax::Token;

/// `offset(i)` is where token `i` begins; `offset(len)` is the source length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetMap {
    offsets: Vec<TextPos>,
}

impl OffsetMap {
    /// Accumulate token lengths. An empty token list maps to `[0]`.
    pub fn build(tokens: &[Token]) -> Self {
        let mut offsets = Vec::with_capacity(tokens.len() + 1);
        let mut pos: TextPos = 0;
        offsets.push(pos);
        for token in tokens {
            pos += token.len() as TextPos;
            offsets.push(pos);
        }
        Self { offsets }
    }

    /// Start offset of token `index`. Indices past the end map to the
    /// source length.
    #[inline]
    pub fn offset(&self, index: usize) -> TextPos {
        let last = self.offsets.len() - 1;
        self.offsets[index.min(last)]
    }

    /// Total length of the tokenized source.
    #[inline]
    pub fn source_len(&self) -> TextPos {
        self.offsets[self.offsets.len() - 1]
    }

    /// Number of tokens mapped.
    #[inline]
    pub fn token_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn as_slice(&self) -> &[TextPos] {
        &self.offsets
    }
}
