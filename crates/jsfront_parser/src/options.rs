//! Parser configuration.

/// Options for [`parse_with_options`](crate::parse_with_options).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest AST nesting the transformer accepts before giving up.
    pub max_nesting_depth: u32,
    /// Recognize E4X literals.
    pub xml_literals: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 512,
            xml_literals: true,
        }
    }
}

impl ParseOptions {
    pub fn with_max_nesting_depth(mut self, max_nesting_depth: u32) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    pub fn with_xml_literals(mut self, xml_literals: bool) -> Self {
        self.xml_literals = xml_literals;
        self
    }
}
