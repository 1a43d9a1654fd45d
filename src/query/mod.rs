//! Declaration queries against a parsed stylesheet.
//!
//! A query names a selector, a property, the literal values it accepts and
//! the context the rule must live in (default rules or inside a conditional
//! block). Resolution runs over a flattened view of the rule tree:
//!
//! 1. keep rules whose selector list contains the selector (trimmed, literal)
//!    and whose condition presence matches the context;
//! 2. take the first such rule, in source order, that declares the property;
//! 3. within it, take the first declaration of the property;
//! 4. compare the declared value literally against the accepted set.
//!
//! Steps 2 and 3 are first-match-wins. Later rules and later duplicate
//! declarations are never consulted, even where the CSS cascade would let
//! them win.

mod source;

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::css::{Declaration, Location, RuleNode, StyleRule, Stylesheet};
use crate::error::{Error, Result};

pub use source::StylesheetSource;

/// Where a matching rule must be declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    /// Top-level rules only.
    #[default]
    Default,
    /// Rules inside a conditional (`@media`) block only.
    Conditional,
}

impl Context {
    /// Map the "require a condition" flag onto a context.
    pub fn from_required(require_condition: bool) -> Self {
        if require_condition {
            Context::Conditional
        } else {
            Context::Default
        }
    }

    pub fn requires_condition(self) -> bool {
        self == Context::Conditional
    }

    /// Whether a rule with this (optional) condition belongs to the context.
    pub fn admits(self, condition: Option<&str>) -> bool {
        condition.is_some() == self.requires_condition()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Default => f.write_str("in default rules"),
            Context::Conditional => f.write_str("inside a conditional block"),
        }
    }
}

/// A style rule tagged with the condition that governs it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRule<'a> {
    pub selectors: &'a [String],
    pub declarations: &'a [Declaration],
    pub condition: Option<&'a str>,
    pub location: Location,
}

impl<'a> ResolvedRule<'a> {
    fn new(rule: &'a StyleRule, condition: Option<&'a str>) -> Self {
        Self {
            selectors: &rule.selectors,
            declarations: &rule.declarations,
            condition,
            location: rule.location,
        }
    }

    pub fn has_selector(&self, selector: &str) -> bool {
        let wanted = selector.trim();
        self.selectors.iter().any(|s| s.trim() == wanted)
    }

    /// First declaration of `property` in this rule.
    pub fn declaration(&self, property: &str) -> Option<&'a Declaration> {
        self.declarations.iter().find(|d| d.property == property)
    }
}

/// Flatten the rule tree into resolved rules, in source order.
pub fn flatten(nodes: &[RuleNode]) -> Vec<ResolvedRule<'_>> {
    let mut resolved = Vec::new();
    for node in nodes {
        match node {
            RuleNode::Rule(rule) => resolved.push(ResolvedRule::new(rule, None)),
            RuleNode::Conditional(block) => resolved.extend(
                block
                    .rules
                    .iter()
                    .map(|rule| ResolvedRule::new(rule, Some(block.condition.as_str()))),
            ),
        }
    }
    resolved
}

/// A declaration assertion: selector, property, accepted values and context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationQuery {
    pub selector: String,
    pub property: String,
    pub accepted: Vec<String>,
    #[serde(default)]
    pub context: Context,
}

impl DeclarationQuery {
    pub fn new(selector: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            property: property.into(),
            accepted: Vec::new(),
            context: Context::Default,
        }
    }

    /// Add one accepted literal value.
    pub fn accept(mut self, value: impl Into<String>) -> Self {
        self.accepted.push(value.into());
        self
    }

    /// Add several accepted literal values.
    pub fn accepting<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn in_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Require the rule to live inside a conditional block.
    pub fn conditional(self) -> Self {
        self.in_context(Context::Conditional)
    }
}

/// The rule and declaration a lookup settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found<'a> {
    pub rule: ResolvedRule<'a>,
    pub declaration: &'a Declaration,
}

/// Locate the declaration of `property` for `selector` in `context`.
///
/// Fails with [`Error::SelectorNotFound`] when no rule in the context lists
/// the selector, and with [`Error::PropertyMissing`] when none of those rules
/// declares the property.
pub fn find_declaration<'a>(
    stylesheet: &'a Stylesheet,
    selector: &str,
    property: &str,
    context: Context,
) -> Result<Found<'a>> {
    let candidates: Vec<ResolvedRule<'a>> = flatten(&stylesheet.nodes)
        .into_iter()
        .filter(|rule| rule.has_selector(selector) && context.admits(rule.condition))
        .collect();

    if candidates.is_empty() {
        return Err(Error::SelectorNotFound {
            selector: selector.to_string(),
            context,
        });
    }
    debug!(
        "{} candidate rule(s) for '{selector}' {context}",
        candidates.len()
    );

    candidates
        .into_iter()
        .find_map(|rule| {
            rule.declaration(property)
                .map(|declaration| Found { rule, declaration })
        })
        .ok_or_else(|| Error::PropertyMissing {
            selector: selector.to_string(),
            property: property.to_string(),
            context,
        })
}

/// Check that the stylesheet declares the query's property with an accepted value.
///
/// Returns the declaration that satisfied the query.
pub fn assert_declaration<'a>(
    stylesheet: &'a Stylesheet,
    query: &DeclarationQuery,
) -> Result<&'a Declaration> {
    let found = find_declaration(stylesheet, &query.selector, &query.property, query.context)?;
    let actual = &found.declaration.value;

    if query.accepted.iter().any(|value| value == actual) {
        debug!(
            "'{}' {}: {} = {actual} (declared at {})",
            query.selector, query.context, query.property, found.declaration.location
        );
        Ok(found.declaration)
    } else {
        Err(Error::ValueMismatch {
            selector: query.selector.clone(),
            property: query.property.clone(),
            actual: actual.clone(),
            expected: query.accepted.clone(),
            context: query.context,
        })
    }
}

/// Parse `css` and run [`assert_declaration`] against it.
pub fn assert_declaration_in_source(css: &str, query: &DeclarationQuery) -> Result<Declaration> {
    let stylesheet = Stylesheet::parse(css)?;
    assert_declaration(&stylesheet, query).cloned()
}

#[cfg(test)]
mod tests;
