//! Structural model of a parsed stylesheet.

use std::fmt;

use super::parser;
use crate::error::Result;

/// A 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub(crate) fn from_source(location: cssparser::SourceLocation) -> Self {
        // cssparser lines are 0-based, columns 1-based
        Self {
            line: location.line + 1,
            column: location.column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single `property: value` pair, kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub location: Location,
}

/// A selector list paired with its declarations, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
    pub location: Location,
}

impl StyleRule {
    /// Whether any selector equals `selector` once both sides are trimmed.
    pub fn has_selector(&self, selector: &str) -> bool {
        let wanted = selector.trim();
        self.selectors.iter().any(|s| s.trim() == wanted)
    }

    /// First declaration of `property`, scanning in source order.
    pub fn declaration(&self, property: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.property == property)
    }
}

/// A `@media` block and the style rules it scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalBlock {
    pub condition: String,
    pub rules: Vec<StyleRule>,
    pub location: Location,
}

/// One top-level item of a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleNode {
    Rule(StyleRule),
    Conditional(ConditionalBlock),
}

/// A parsed stylesheet: its top-level nodes in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<RuleNode>,
}

impl Stylesheet {
    /// Parse a stylesheet from source text.
    pub fn parse(css: &str) -> Result<Self> {
        let nodes = parser::parse(css)?;
        Ok(Self { nodes })
    }

    /// Check if the stylesheet has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of style rules, counting those inside conditional blocks.
    pub fn rule_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| match node {
                RuleNode::Rule(_) => 1,
                RuleNode::Conditional(block) => block.rules.len(),
            })
            .sum()
    }
}
